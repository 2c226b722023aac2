use crate::storage::{
    GameStorage,
    KeyValueStore,
};
use color_eyre::eyre::{
    Report,
    Result,
    eyre,
};
use ratatui::style::Color;
use std::{
    fmt,
    str::FromStr,
};
use tracing::{
    error,
    info,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn token(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn other(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemePreference::Light => Palette {
                background: Color::Rgb(250, 250, 250),
                foreground: Color::Rgb(33, 37, 41),
            },
            ThemePreference::Dark => Palette {
                background: Color::Rgb(18, 18, 18),
                foreground: Color::Rgb(230, 230, 230),
            },
        }
    }

    /// Label for the toggle control; it names the state a toggle would switch to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ThemePreference::Light => "switch to dark",
            ThemePreference::Dark => "switch to light",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for ThemePreference {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(eyre!("Unknown theme '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
}

/// Ambient preference from the terminal's `COLORFGBG` variable, if it names a
/// background colour.
pub fn detect_ambient_theme() -> Option<ThemePreference> {
    let raw = std::env::var("COLORFGBG").ok()?;
    theme_from_colorfgbg(&raw)
}

fn theme_from_colorfgbg(raw: &str) -> Option<ThemePreference> {
    // "fg;bg" or "fg;default;bg"; the background is always last
    let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(ThemePreference::Dark),
        7 | 9..=15 => Some(ThemePreference::Light),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ThemeController<S> {
    current: ThemePreference,
    storage: GameStorage<S>,
}

impl<S: KeyValueStore> ThemeController<S> {
    /// Stored preference first, then the ambient signal, then light.
    pub fn resolve(
        storage: GameStorage<S>,
        ambient: impl FnOnce() -> Option<ThemePreference>,
    ) -> Self {
        let current = match storage.load_theme() {
            Some(stored) => stored,
            None => ambient().unwrap_or_default(),
        };
        info!(theme = %current, "theme resolved");
        Self { current, storage }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn palette(&self) -> Palette {
        self.current.palette()
    }

    pub fn toggle_label(&self) -> &'static str {
        self.current.toggle_label()
    }

    /// Flip the theme and store it as an explicit preference. An `Err` only
    /// reports the failed save; the flip is kept.
    pub fn toggle(&mut self) -> Result<ThemePreference> {
        self.current = self.current.other();
        self.storage
            .save_theme(self.current)
            .inspect_err(|err| error!(error = %err, "failed to persist theme"))?;
        Ok(self.current)
    }
}
