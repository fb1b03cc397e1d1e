use thiserror::Error;

use crate::model::Symbol;

/// Invalid compile-time configuration. Raised at startup, never during play.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("symbol palette has {available} symbols but a difficulty needs {required} pairs")]
    PaletteTooSmall { available: usize, required: usize },

    #[error("symbol palette contains {0:?} more than once")]
    DuplicateSymbol(Symbol),
}

/// Failure inside a key-value store. Never crosses the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
