use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::deck_generator::DEFAULT_PALETTE;
use crate::model::{Symbol, Theme};

/// Player preferences persisted through the gateway.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    #[serde(default)]
    pub theme: Theme,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sound_enabled: true,
            theme: Theme::default(),
        }
    }
}

impl Settings {
    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// `MEMORY_MATCH_DATA_DIR`, else `$XDG_DATA_HOME/memory-match`, else
    /// `$HOME/.local/share/memory-match`, else a directory under the system temp dir.
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("MEMORY_MATCH_DATA_DIR") {
            return PathBuf::from(dir);
        }
        if let Some(dir) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(dir).join("memory-match");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("memory-match");
        }
        std::env::temp_dir().join("memory-match")
    }
}

/// Delays that let the presentation show cards before the engine moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Second card face-up to pair evaluation.
    pub resolve_delay: Duration,
    /// Mismatch shown to cards turned back down.
    pub conceal_delay: Duration,
    /// Last match to victory.
    pub victory_delay: Duration,
    /// Fixed deck seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Card faces, used in order; must cover the largest difficulty.
    pub palette: Vec<Symbol>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolve_delay: Duration::from_millis(800),
            conceal_delay: Duration::from_millis(600),
            victory_delay: Duration::from_millis(500),
            seed: None,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            seed: Settings::seed_from_env(),
            ..Self::default()
        }
    }
}
