use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive upper bounds on the move count for each star rating.
/// Anything above `two_stars` earns a single star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarThresholds {
    pub three_stars: u32,
    pub two_stars: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn pairs(&self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 8,
            Difficulty::Hard => 12,
        }
    }

    pub fn card_count(&self) -> usize {
        self.pairs() * 2
    }

    pub fn star_thresholds(&self) -> StarThresholds {
        match self {
            Difficulty::Easy => StarThresholds {
                three_stars: 8,
                two_stars: 12,
            },
            Difficulty::Medium => StarThresholds {
                three_stars: 16,
                two_stars: 24,
            },
            Difficulty::Hard => StarThresholds {
                three_stars: 24,
                two_stars: 36,
            },
        }
    }

    /// The largest pair count of any difficulty; the symbol palette must be at least this long.
    pub fn max_pairs() -> usize {
        Difficulty::all()
            .iter()
            .map(Difficulty::pairs)
            .max()
            .unwrap_or_default()
    }

    /// Stable lowercase name, used in persistence keys.
    pub fn key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .into_iter()
            .find(|difficulty| difficulty.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty: {s}"))
    }
}
