use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No game has been started yet.
    #[default]
    Idle,
    /// Accepting card selections.
    Active,
    /// A flipped pair (or the final victory step) is pending; input is locked.
    Resolving,
    /// Terminal until the next new game.
    Won,
}

impl GamePhase {
    pub fn accepts_input(&self) -> bool {
        matches!(self, GamePhase::Active)
    }
}
