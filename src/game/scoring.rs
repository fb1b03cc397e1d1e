use crate::model::{Difficulty, StarRating};

/// Stars earned for `moves` moves. Thresholds are inclusive; one star is the fallback.
pub fn stars_for(difficulty: Difficulty, moves: u32) -> StarRating {
    let thresholds = difficulty.star_thresholds();
    if moves <= thresholds.three_stars {
        StarRating::Three
    } else if moves <= thresholds.two_stars {
        StarRating::Two
    } else {
        StarRating::One
    }
}
