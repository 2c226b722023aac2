use crate::ui;
use color_eyre::eyre::Result;
use piedra_papel_tijera::{
    game::{
        FixedOpponent,
        Move,
        Opponent,
        RandomOpponent,
        RoundEngine,
    },
    stats::{
        GameStatistics,
        StatisticsTracker,
    },
    storage::{
        AnyStore,
        FileStore,
        GameStorage,
        InMemoryStore,
        KeyValueStore,
    },
    theme::{
        ThemeController,
        ThemePreference,
        detect_ambient_theme,
    },
};
use std::path::PathBuf;
use tracing::{
    error,
    info,
    warn,
};

const MAX_ERRORS: usize = 50;
pub const WELCOME_MESSAGE: &str = "Choose your move";
pub const RESET_MESSAGE: &str = "Statistics have been reset";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StorageConfig {
    Directory(PathBuf),
    Ephemeral,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpponentMode {
    Random,
    Fixed(Move),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub opponent: OpponentMode,
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub stats: GameStatistics,
    pub theme: ThemePreference,
    pub message: String,
    pub status: String,
    pub errors: Vec<String>,
}

/// The running session: statistics, theme and what the UI should say about them.
pub struct AppController<O, S> {
    tracker: StatisticsTracker<O, S>,
    theme: ThemeController<S>,
    message: String,
    status: String,
    errors: Vec<String>,
}

impl<O: Opponent, S: KeyValueStore + Clone> AppController<O, S> {
    pub fn bootstrap(
        store: S,
        opponent: O,
        ambient: impl FnOnce() -> Option<ThemePreference>,
    ) -> Self {
        let tracker = StatisticsTracker::load(
            RoundEngine::new(opponent),
            GameStorage::new(store.clone()),
        );
        let theme = ThemeController::resolve(GameStorage::new(store), ambient);
        info!(
            rounds = tracker.stats().rounds_played,
            theme = %theme.current(),
            "session bootstrapped"
        );
        Self {
            tracker,
            theme,
            message: WELCOME_MESSAGE.to_owned(),
            status: String::from("Ready"),
            errors: Vec::new(),
        }
    }

    pub fn play(&mut self, user_move: Move) {
        let event = self.tracker.record_round(user_move);
        self.message = event.message;
        match event.save_error {
            None => self.set_status(format!(
                "Round {} saved",
                self.tracker.stats().rounds_played
            )),
            Some(err) => {
                self.set_status("Round played but not saved");
                self.push_errors(vec![err]);
            }
        }
    }

    pub fn reset(&mut self) {
        self.message = RESET_MESSAGE.to_owned();
        match self.tracker.reset_statistics() {
            Ok(()) => self.set_status("Statistics reset"),
            Err(err) => {
                self.set_status("Statistics reset but not saved");
                self.push_errors(vec![format!("{err:#}")]);
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        match self.theme.toggle() {
            Ok(theme) => self.set_status(format!("Theme set to {theme}")),
            Err(err) => {
                self.set_status(format!("Theme set to {} (not saved)", self.theme.current()));
                self.push_errors(vec![format!("{err:#}")]);
            }
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            stats: self.tracker.stats().clone(),
            theme: self.theme.current(),
            message: self.message.clone(),
            status: self.status.clone(),
            errors: self.errors.clone(),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn push_errors(&mut self, mut items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        for item in &items {
            error!("{}", item);
        }
        self.errors.append(&mut items);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }
}

/// Open the configured store. A directory that cannot be used degrades to an
/// in-memory store and the reason is returned for display.
pub fn open_store(config: &StorageConfig) -> (AnyStore, Option<String>) {
    match config {
        StorageConfig::Ephemeral => (AnyStore::Memory(InMemoryStore::new()), None),
        StorageConfig::Directory(dir) => match FileStore::new(dir) {
            Ok(store) => {
                info!(path = %store.path().display(), "using file storage");
                (AnyStore::File(store), None)
            }
            Err(err) => {
                warn!(?err, "storage unavailable; progress will not be saved");
                (
                    AnyStore::Memory(InMemoryStore::new()),
                    Some(format!("Storage unavailable, progress will not be saved: {err:#}")),
                )
            }
        },
    }
}

fn opponent_for(mode: OpponentMode) -> Box<dyn Opponent> {
    match mode {
        OpponentMode::Random => Box::new(RandomOpponent::from_thread_rng()),
        OpponentMode::Fixed(m) => Box::new(FixedOpponent(m)),
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let (store, storage_error) = open_store(&config.storage);
    let mut controller =
        AppController::bootstrap(store, opponent_for(config.opponent), detect_ambient_theme);
    if let Some(err) = storage_error {
        controller.push_errors(vec![err]);
    }
    let mut ui_state = ui::UiState::default();

    tracing::info!("Starting UI");
    if let Err(err) = ui::terminal_enter(&mut ui_state) {
        let _ = ui::terminal_exit();
        return Err(err);
    }
    tracing::info!("UI ready");
    let res = run_loop(&mut controller, &mut ui_state).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop<O: Opponent, S: KeyValueStore + Clone>(
    controller: &mut AppController<O, S>,
    ui_state: &mut ui::UiState,
) -> Result<()> {
    tracing::info!("Running app loop");
    ui::draw(ui_state, &controller.snapshot())?;
    loop {
        match ui::next_event(ui_state).await? {
            ui::UserEvent::Quit => break,
            ui::UserEvent::Play(m) => controller.play(m),
            ui::UserEvent::Reset => controller.reset(),
            ui::UserEvent::ToggleTheme => controller.toggle_theme(),
            ui::UserEvent::Redraw => {}
        }
        ui::draw(ui_state, &controller.snapshot())?;
    }
    tracing::info!("Leaving app loop");
    Ok(())
}
