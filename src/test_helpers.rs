use crate::{
    game::{
        Move,
        Opponent,
        RoundEngine,
    },
    stats::StatisticsTracker,
    storage::{
        GameStorage,
        InMemoryStore,
    },
    theme::{
        ThemeController,
        ThemePreference,
    },
};
use std::collections::VecDeque;

/// Plays a fixed script of moves, then repeats the last one.
#[derive(Clone, Debug)]
pub struct ScriptedOpponent {
    moves: VecDeque<Move>,
    last: Move,
}

impl ScriptedOpponent {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            last: Move::Rock,
        }
    }
}

impl Opponent for ScriptedOpponent {
    fn next_move(&mut self) -> Move {
        if let Some(m) = self.moves.pop_front() {
            self.last = m;
        }
        self.last
    }
}

/// A session wired to one shared in-memory store.
pub struct TestContext {
    store: InMemoryStore,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn storage(&self) -> GameStorage<InMemoryStore> {
        GameStorage::new(self.store.clone())
    }

    pub fn tracker(
        &self,
        computer_moves: impl IntoIterator<Item = Move>,
    ) -> StatisticsTracker<ScriptedOpponent, InMemoryStore> {
        StatisticsTracker::load(
            RoundEngine::new(ScriptedOpponent::new(computer_moves)),
            self.storage(),
        )
    }

    pub fn theme(&self, ambient: Option<ThemePreference>) -> ThemeController<InMemoryStore> {
        ThemeController::resolve(self.storage(), || ambient)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
