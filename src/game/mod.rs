pub mod deck_generator;
pub mod error;
pub mod game_engine;
pub mod persistence;
pub mod scheduler;
pub mod scoring;
pub mod settings;
pub mod timer;

pub use deck_generator::{DeckGenerator, DEFAULT_PALETTE};
pub use error::{ConfigurationError, StoreError};
pub use game_engine::GameEngine;
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceGateway};
pub use scheduler::{ManualScheduler, Scheduler};
pub use scoring::stars_for;
pub use settings::{EngineConfig, Settings};
pub use timer::{Clock, ManualClock, SystemClock, Timer};
