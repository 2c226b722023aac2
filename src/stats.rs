use crate::{
    game::{
        Move,
        Opponent,
        Outcome,
        RoundEngine,
    },
    storage::{
        GameStorage,
        KeyValueStore,
    },
};
use color_eyre::eyre::Result;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    error,
};

pub const HISTORY_DEPTH: usize = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    #[serde(rename = "usuario")]
    pub user_choice: Move,
    #[serde(rename = "computadora")]
    pub computer_choice: Move,
    #[serde(rename = "resultado")]
    pub outcome: Outcome,
}

/// Cumulative counters plus the most recent rounds, newest first.
///
/// `user_wins + computer_wins + draws == rounds_played` and
/// `history.len() <= HISTORY_DEPTH` hold after every mutation made through
/// [`GameStatistics::record`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameStatistics {
    #[serde(rename = "rondas")]
    pub rounds_played: u32,
    #[serde(rename = "usuario")]
    pub user_wins: u32,
    #[serde(rename = "computadora")]
    pub computer_wins: u32,
    #[serde(rename = "empates")]
    pub draws: u32,
    #[serde(rename = "historial")]
    pub history: Vec<RoundRecord>,
}

impl GameStatistics {
    pub fn record(&mut self, record: RoundRecord) {
        match record.outcome {
            Outcome::Win => self.user_wins = self.user_wins.saturating_add(1),
            Outcome::Loss => self.computer_wins = self.computer_wins.saturating_add(1),
            Outcome::Draw => self.draws = self.draws.saturating_add(1),
        }
        self.rounds_played = self.rounds_played.saturating_add(1);
        // push first, then drop at most one from the tail
        self.history.insert(0, record);
        if self.history.len() > HISTORY_DEPTH {
            self.history.pop();
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.user_wins as f64 / self.rounds_played as f64
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundOutcomeEvent {
    pub record: RoundRecord,
    pub message: String,
    pub save_error: Option<String>,
}

pub fn result_message(record: &RoundRecord) -> String {
    let RoundRecord {
        user_choice,
        computer_choice,
        outcome,
    } = record;
    match outcome {
        Outcome::Win => {
            format!("You win! {user_choice} beats {computer_choice}")
        }
        Outcome::Loss => {
            format!("You lose! {computer_choice} beats {user_choice}")
        }
        Outcome::Draw => format!("Draw! Both played {user_choice}"),
    }
}

/// Owns the session's statistics and writes them back after every change.
#[derive(Debug)]
pub struct StatisticsTracker<O, S> {
    stats: GameStatistics,
    engine: RoundEngine<O>,
    storage: GameStorage<S>,
}

impl<O: Opponent, S: KeyValueStore> StatisticsTracker<O, S> {
    pub fn new(stats: GameStatistics, engine: RoundEngine<O>, storage: GameStorage<S>) -> Self {
        Self {
            stats,
            engine,
            storage,
        }
    }

    /// Start from whatever is stored, or from zero.
    pub fn load(engine: RoundEngine<O>, storage: GameStorage<S>) -> Self {
        let stats = storage.load_statistics().unwrap_or_default();
        Self::new(stats, engine, storage)
    }

    pub fn stats(&self) -> &GameStatistics {
        &self.stats
    }

    pub fn record_round(&mut self, user_move: Move) -> RoundOutcomeEvent {
        let resolution = self.engine.decide_outcome(user_move);
        let record = RoundRecord {
            user_choice: user_move,
            computer_choice: resolution.computer_move,
            outcome: resolution.outcome,
        };
        self.stats.record(record);
        debug!(
            user = %record.user_choice,
            computer = %record.computer_choice,
            outcome = record.outcome.label(),
            rounds = self.stats.rounds_played,
            "round recorded"
        );
        let save_error = self.persist().err().map(|e| format!("{e:#}"));
        RoundOutcomeEvent {
            message: result_message(&record),
            record,
            save_error,
        }
    }

    /// Zero the statistics. An `Err` only reports the failed save; the
    /// in-memory state is reset regardless.
    pub fn reset_statistics(&mut self) -> Result<()> {
        self.stats = GameStatistics::default();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.storage.save_statistics(&self.stats).inspect_err(|err| {
            error!(error = %err, "failed to persist statistics");
        })
    }
}
