use super::{
    AggregateStatistics, CardId, Deck, Difficulty, SoundCue, StarRating, TimerState,
    VictorySummary,
};
use crate::game::settings::Settings;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEngineEvent {
    NewGameStarted { difficulty: Difficulty, deck: Deck },
    CardFlipped(CardId),
    CardUnflipped(CardId),
    CardsMatched(CardId, CardId),
    CardsMismatched(CardId, CardId),
    /// The transient mismatch highlight on these cards can be cleared.
    MismatchCleared(CardId, CardId),
    MovesChanged(u32),
    StarsChanged(StarRating),
    /// `None` while no game is timing.
    TimerStateChanged(Option<TimerState>),
    BestTimeChanged(Option<Duration>),
    StatisticsChanged(AggregateStatistics),
    SettingsChanged(Settings),
    SoundRequested(SoundCue),
    Victory(VictorySummary),
}
