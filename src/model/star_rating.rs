use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StarRating {
    One,
    Two,
    Three,
}

impl StarRating {
    pub fn count(&self) -> u8 {
        match self {
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
        }
    }

    pub fn to_glyphs(&self) -> String {
        "⭐".repeat(self.count() as usize)
    }
}
