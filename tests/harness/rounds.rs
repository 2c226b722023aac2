use piedra_papel_tijera::{
    game::{
        Move,
        Outcome,
    },
    stats::{
        GameStatistics,
        HISTORY_DEPTH,
        RoundRecord,
    },
    storage::{
        InMemoryStore,
        KeyValueStore,
        STATS_KEY,
    },
    test_helpers::*,
};
use proptest::prelude::*;

fn any_move() -> impl Strategy<Value = Move> {
    prop_oneof![Just(Move::Rock), Just(Move::Paper), Just(Move::Scissors)]
}

#[test]
fn record_round__rock_against_forced_scissors() {
    let ctx = TestContext::new();
    // given
    let mut tracker = ctx.tracker([Move::Scissors]);

    // when
    tracker.record_round(Move::Rock);

    // then
    let expected = GameStatistics {
        rounds_played: 1,
        user_wins: 1,
        computer_wins: 0,
        draws: 0,
        history: vec![RoundRecord {
            user_choice: Move::Rock,
            computer_choice: Move::Scissors,
            outcome: Outcome::Win,
        }],
    };
    assert_eq!(&expected, tracker.stats());
    assert_eq!(Some(expected), ctx.storage().load_statistics());
}

#[test]
fn record_round__resumes_from_stored_statistics() {
    let ctx = TestContext::new();
    // given
    let mut first = ctx.tracker([Move::Paper, Move::Paper]);
    first.record_round(Move::Scissors);
    first.record_round(Move::Rock);

    // when
    let mut second = ctx.tracker([Move::Rock]);
    second.record_round(Move::Rock);

    // then
    let stats = second.stats();
    assert_eq!(3, stats.rounds_played);
    assert_eq!(1, stats.user_wins);
    assert_eq!(1, stats.computer_wins);
    assert_eq!(1, stats.draws);
    assert_eq!(Outcome::Draw, stats.history[0].outcome);
    assert_eq!(Outcome::Win, stats.history[2].outcome);
}

#[test]
fn bootstrap__malformed_storage_starts_from_zero() {
    let ctx = TestContext::with_store(InMemoryStore::with_item(STATS_KEY, "{\"rondas\":"));
    // given
    let mut tracker = ctx.tracker([Move::Rock]);
    assert_eq!(&GameStatistics::default(), tracker.stats());

    // when
    tracker.record_round(Move::Paper);

    // then
    let raw = ctx.store().get_item(STATS_KEY).unwrap().unwrap();
    let reloaded: GameStatistics = serde_json::from_str(&raw).unwrap();
    assert_eq!(1, reloaded.rounds_played);
}

#[test]
fn reset_statistics__after_play_persists_zero_state() {
    let ctx = TestContext::new();
    // given
    let mut tracker = ctx.tracker([Move::Rock, Move::Paper, Move::Scissors]);
    for m in [Move::Rock, Move::Rock, Move::Rock] {
        tracker.record_round(m);
    }

    // when
    tracker.reset_statistics().unwrap();

    // then
    let raw = ctx.store().get_item(STATS_KEY).unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let expected = serde_json::json!({
        "rondas": 0, "usuario": 0, "computadora": 0, "empates": 0, "historial": [],
    });
    assert_eq!(expected, stored);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn record_round__counters_and_history_stay_consistent(
        rounds in prop::collection::vec((any_move(), any_move()), 0..30)
    ) {
        let ctx = TestContext::new();
        let mut tracker = ctx.tracker(rounds.iter().map(|(_, computer)| *computer));

        for (idx, (user, _)) in rounds.iter().enumerate() {
            let event = tracker.record_round(*user);
            let stats = tracker.stats();
            prop_assert_eq!(
                stats.user_wins + stats.computer_wins + stats.draws,
                stats.rounds_played
            );
            prop_assert_eq!(idx as u32 + 1, stats.rounds_played);
            prop_assert!(stats.history.len() <= HISTORY_DEPTH);
            prop_assert_eq!(Some(&event.record), stats.history.first());
        }

        let expected_history: Vec<Move> = rounds
            .iter()
            .rev()
            .take(HISTORY_DEPTH)
            .map(|(user, _)| *user)
            .collect();
        let actual_history: Vec<Move> =
            tracker.stats().history.iter().map(|r| r.user_choice).collect();
        prop_assert_eq!(expected_history, actual_history);
        prop_assert_eq!(Some(tracker.stats().clone()).filter(|_| !rounds.is_empty()),
            ctx.storage().load_statistics());
    }
}
