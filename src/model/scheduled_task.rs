use std::time::Duration;
use uuid::Uuid;

use super::CardId;

/// Work the engine defers until the presentation has had time to show the cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredStep {
    /// Compare the two face-up cards.
    EvaluatePair,
    /// Turn a mismatched pair face-down again.
    ConcealMismatch(CardId, CardId),
    /// Finish the game after the last match.
    CompleteVictory,
}

/// A fire-once task tagged with the session that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub session: Uuid,
    pub step: DeferredStep,
    pub delay: Duration,
}
