use std::time::{Duration, SystemTime};
use uuid::Uuid;

use super::{CardId, Deck, Difficulty, GamePhase, TimerState};
use crate::game::timer::Timer;

/// Everything belonging to one game. Replaced wholesale when a new game starts.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) id: Uuid,
    pub(crate) difficulty: Difficulty,
    pub(crate) deck: Deck,
    pub(crate) flipped: Vec<CardId>,
    pub(crate) matched_pairs: usize,
    pub(crate) moves: u32,
    pub(crate) phase: GamePhase,
    pub(crate) timer: Timer,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            difficulty: Difficulty::default(),
            deck: Deck::default(),
            flipped: Vec::with_capacity(2),
            matched_pairs: 0,
            moves: 0,
            phase: GamePhase::Idle,
            timer: Timer::default(),
        }
    }
}

impl GameSession {
    pub fn new(difficulty: Difficulty, deck: Deck) -> Self {
        Self {
            id: Uuid::new_v4(),
            difficulty,
            deck,
            phase: GamePhase::Active,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Face-up cards awaiting evaluation, in the order they were flipped.
    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn timer_state(&self) -> Option<TimerState> {
        self.timer.state()
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.difficulty.pairs()
    }

    pub fn elapsed_at(&self, now: SystemTime) -> Duration {
        self.timer.elapsed(now)
    }
}
