use crate::{
    stats::GameStatistics,
    theme::ThemePreference,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};
use tracing::warn;

pub const STATS_KEY: &str = "juegoPiedraPapelTijeraStat";
pub const THEME_KEY: &str = "juegoPiedraPapelTijeraTheme";
const STORAGE_FILE: &str = "storage.json";

/// String-keyed get/set persistence, the substrate the game state is written to.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// write or overwrite the value stored under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value store backed by a single JSON object on disk.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let path = ensure_store(dir.as_ref())?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = read_entries(&self.path)?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let data = fs::read(&self.path).wrap_err("Failed to read storage file")?;
        // a corrupt file is replaced rather than blocking every later save
        let mut entries = parse_entries(&data).unwrap_or_else(|err| {
            warn!(?err, path = %self.path.display(), "overwriting corrupt storage file");
            BTreeMap::new()
        });
        entries.insert(key.to_owned(), value.to_owned());
        write_entries(&self.path, &entries)
    }
}

fn ensure_store(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).wrap_err_with(|| {
            format!("Failed to create storage directory {}", dir.display())
        })?;
    }
    let file_path = dir.join(STORAGE_FILE);
    if !file_path.exists() {
        fs::write(&file_path, b"{}").wrap_err_with(|| {
            format!("Failed to initialize storage file at {}", file_path.display())
        })?;
    }
    Ok(file_path)
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let data = fs::read(path).wrap_err("Failed to read storage file")?;
    parse_entries(&data)
}

fn parse_entries(data: &[u8]) -> Result<BTreeMap<String, String>> {
    if data.is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_slice(data).wrap_err("Failed to parse storage file JSON")
}

/// Write to a sibling temp file, then rename it over the store.
fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(entries).wrap_err("Failed to serialize storage entries")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).wrap_err("Failed to write storage file")?;
    fs::rename(&tmp, path).wrap_err("Failed to replace storage file")?;
    Ok(())
}

/// Process-local store; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.entries.lock() {
            guard.insert(key.to_owned(), value.to_owned());
        }
        store
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| eyre!("In-memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| eyre!("In-memory store lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Either backend, chosen at startup.
#[derive(Clone, Debug)]
pub enum AnyStore {
    File(FileStore),
    Memory(InMemoryStore),
}

impl KeyValueStore for AnyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self {
            AnyStore::File(store) => store.get_item(key),
            AnyStore::Memory(store) => store.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        match self {
            AnyStore::File(store) => store.set_item(key, value),
            AnyStore::Memory(store) => store.set_item(key, value),
        }
    }
}

/// Typed access to the two persisted slots: statistics and theme.
#[derive(Clone, Debug)]
pub struct GameStorage<S> {
    store: S,
}

impl<S: KeyValueStore> GameStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored statistics, or `None` when nothing usable is stored.
    pub fn load_statistics(&self) -> Option<GameStatistics> {
        let raw = match self.store.get_item(STATS_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(?err, "failed to read stored statistics");
                return None;
            }
        };
        match serde_json::from_str::<GameStatistics>(&raw) {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(%err, "discarding malformed stored statistics");
                None
            }
        }
    }

    pub fn save_statistics(&self, stats: &GameStatistics) -> Result<()> {
        let json =
            serde_json::to_string(stats).wrap_err("Failed to serialize statistics")?;
        self.store
            .set_item(STATS_KEY, &json)
            .wrap_err("Failed to save statistics")
    }

    pub fn load_theme(&self) -> Option<ThemePreference> {
        let raw = match self.store.get_item(THEME_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(?err, "failed to read stored theme");
                return None;
            }
        };
        match raw.parse::<ThemePreference>() {
            Ok(theme) => Some(theme),
            Err(err) => {
                warn!(%err, "ignoring unrecognized stored theme");
                None
            }
        }
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<()> {
        self.store
            .set_item(THEME_KEY, theme.token())
            .wrap_err("Failed to save theme preference")
    }
}
