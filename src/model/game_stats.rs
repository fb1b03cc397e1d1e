use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::StarRating;

/// Cumulative results across every difficulty. Persisted as one record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub games_played: u32,
    pub games_won: u32,
    /// Whole percentage, 0 to 100.
    pub win_rate: u32,
}

impl AggregateStatistics {
    pub fn new(games_played: u32, games_won: u32) -> Self {
        let mut stats = Self {
            games_played,
            games_won,
            win_rate: 0,
        };
        stats.recompute_win_rate();
        stats
    }

    pub fn with_outcome(&self, won: bool) -> Self {
        let games_won = if won {
            self.games_won.saturating_add(1)
        } else {
            self.games_won
        };
        Self::new(self.games_played.saturating_add(1), games_won)
    }

    fn recompute_win_rate(&mut self) {
        self.win_rate = if self.games_played == 0 {
            0
        } else {
            (self.games_won as f64 / self.games_played as f64 * 100.0).round() as u32
        };
    }

    /// A stored record is only trusted if its counters are consistent.
    pub fn is_consistent(&self) -> bool {
        self.games_won <= self.games_played && self.win_rate <= 100
    }
}

/// Result of a completed game, carried by the victory event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictorySummary {
    pub elapsed: Duration,
    pub moves: u32,
    pub stars: StarRating,
    pub is_new_record: bool,
}
