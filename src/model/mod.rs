mod card;
mod deck;
mod difficulty;
mod game_engine_command;
mod game_engine_event;
mod game_phase;
mod game_session;
mod game_stats;
mod scheduled_task;
mod scoreboard_projection;
mod sound_cue;
mod star_rating;
mod theme;
mod timer_state;

pub use card::{Card, CardId, Symbol};
pub use deck::Deck;
pub use difficulty::{Difficulty, StarThresholds};
pub use game_engine_command::GameEngineCommand;
pub use game_engine_event::GameEngineEvent;
pub use game_phase::GamePhase;
pub use game_session::GameSession;
pub use game_stats::{AggregateStatistics, VictorySummary};
pub use scheduled_task::{DeferredStep, ScheduledTask};
pub use scoreboard_projection::ScoreboardProjection;
pub use sound_cue::{SoundCue, Tone};
pub use star_rating::StarRating;
pub use theme::Theme;
pub use timer_state::TimerState;
