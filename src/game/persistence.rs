use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::StoreError;
use super::settings::Settings;
use crate::model::{AggregateStatistics, Difficulty, Theme};

const STATISTICS_KEY: &str = "gameStatistics";
const SOUND_ENABLED_KEY: &str = "soundEnabled";
const THEME_KEY: &str = "theme";

fn best_time_key(difficulty: Difficulty) -> String {
    format!("bestTime_{}", difficulty.key())
}

/// Durable string-to-string storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<K: Into<String>, V: Into<String>>(
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one pretty-printed JSON object, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "store.json";

    /// Opens `<dir>/store.json`, creating the directory. An unreadable or
    /// malformed file starts empty and is replaced on the next write.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(target: "persistence", "Ignoring malformed store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(target: "persistence", "Opened {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Typed access to the store. Read failures and corrupt values fall back to
/// defaults; write failures are logged. Nothing here returns an error.
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PersistenceGateway")
    }
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(target: "persistence", "Reading {key} failed, using default: {err}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            warn!(target: "persistence", "Writing {key} failed: {err}");
        }
    }

    pub fn best_time(&self, difficulty: Difficulty) -> Option<Duration> {
        let key = best_time_key(difficulty);
        let raw = self.read(&key)?;
        match raw.trim().parse::<u64>() {
            Ok(millis) => Some(Duration::from_millis(millis)),
            Err(_) => {
                warn!(target: "persistence", "Ignoring corrupt {key}: {raw:?}");
                None
            }
        }
    }

    /// Stores `elapsed` if no record exists or it beats the record strictly.
    pub fn set_best_time_if_better(&mut self, difficulty: Difficulty, elapsed: Duration) -> bool {
        let is_better = self
            .best_time(difficulty)
            .map_or(true, |current| elapsed < current);
        if is_better {
            let millis = elapsed.as_millis().min(u64::MAX as u128) as u64;
            self.write(&best_time_key(difficulty), &millis.to_string());
        }
        is_better
    }

    pub fn statistics(&self) -> AggregateStatistics {
        let Some(raw) = self.read(STATISTICS_KEY) else {
            return AggregateStatistics::default();
        };
        match serde_json::from_str::<AggregateStatistics>(&raw) {
            Ok(stats) if stats.is_consistent() => stats,
            Ok(stats) => {
                warn!(target: "persistence", "Ignoring inconsistent statistics: {stats:?}");
                AggregateStatistics::default()
            }
            Err(err) => {
                warn!(target: "persistence", "Ignoring malformed statistics: {err}");
                AggregateStatistics::default()
            }
        }
    }

    pub fn record_game_outcome(&mut self, won: bool) -> AggregateStatistics {
        let stats = self.statistics().with_outcome(won);
        match serde_json::to_string(&stats) {
            Ok(json) => self.write(STATISTICS_KEY, &json),
            Err(err) => warn!(target: "persistence", "Serializing statistics failed: {err}"),
        }
        stats
    }

    pub fn sound_enabled(&self) -> bool {
        match self.read(SOUND_ENABLED_KEY).as_deref() {
            None => true,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                warn!(target: "persistence", "Ignoring corrupt {SOUND_ENABLED_KEY}: {other:?}");
                true
            }
        }
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.write(SOUND_ENABLED_KEY, if enabled { "true" } else { "false" });
    }

    pub fn theme(&self) -> Theme {
        let Some(raw) = self.read(THEME_KEY) else {
            return Theme::default();
        };
        raw.parse().unwrap_or_else(|err| {
            warn!(target: "persistence", "Ignoring corrupt {THEME_KEY}: {err}");
            Theme::default()
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.write(THEME_KEY, theme.as_str());
    }

    pub fn load_settings(&self) -> Settings {
        Settings {
            sound_enabled: self.sound_enabled(),
            theme: self.theme(),
        }
    }
}
