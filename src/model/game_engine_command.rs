use super::{CardId, Difficulty, ScheduledTask, Theme};

#[derive(Debug, Clone)]
pub enum GameEngineCommand {
    NewGame(Difficulty),
    SelectCard(CardId),
    SetSoundEnabled(bool),
    ToggleSound,
    SetTheme(Theme),
    ToggleTheme,
    /// Re-emit settings, statistics and best time so a fresh view can draw itself.
    InitDisplay,
    /// A previously scheduled task whose delay has elapsed.
    RunScheduled(ScheduledTask),
}
