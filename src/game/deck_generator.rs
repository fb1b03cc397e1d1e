use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashSet;

use super::error::ConfigurationError;
use crate::model::{Deck, Difficulty, Symbol};

pub const DEFAULT_PALETTE: [Symbol; 24] = [
    Symbol('🎮'),
    Symbol('🎯'),
    Symbol('🎨'),
    Symbol('🎭'),
    Symbol('🎪'),
    Symbol('🎸'),
    Symbol('🎹'),
    Symbol('🎺'),
    Symbol('🎻'),
    Symbol('🎬'),
    Symbol('🎤'),
    Symbol('🎧'),
    Symbol('🎲'),
    Symbol('🎰'),
    Symbol('🎳'),
    Symbol('⚽'),
    Symbol('🏀'),
    Symbol('🏈'),
    Symbol('⚾'),
    Symbol('🎾'),
    Symbol('🏐'),
    Symbol('🏉'),
    Symbol('🎱'),
    Symbol('🏓'),
];

/// Builds shuffled, paired decks from a validated palette.
#[derive(Debug, Clone)]
pub struct DeckGenerator {
    palette: Vec<Symbol>,
    rng: StdRng,
    seed: u64,
}

impl DeckGenerator {
    /// Fails if the palette cannot supply every difficulty or repeats a symbol.
    pub fn new(palette: &[Symbol], seed: Option<u64>) -> Result<Self, ConfigurationError> {
        let required = Difficulty::max_pairs();
        if palette.len() < required {
            return Err(ConfigurationError::PaletteTooSmall {
                available: palette.len(),
                required,
            });
        }
        let mut seen = HashSet::with_capacity(palette.len());
        if let Some(duplicate) = palette.iter().find(|symbol| !seen.insert(**symbol)) {
            return Err(ConfigurationError::DuplicateSymbol(*duplicate));
        }

        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        Ok(Self {
            palette: palette.to_vec(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generate(&mut self, difficulty: Difficulty) -> Deck {
        let selected = &self.palette[..difficulty.pairs()];
        let mut symbols: Vec<Symbol> = selected.iter().chain(selected.iter()).copied().collect();
        shuffle(&mut symbols, &mut self.rng);
        let deck = Deck::from_symbols(symbols);
        trace!(target: "deck_generator", "Generated {} deck: {:?}", difficulty, deck.cards());
        deck
    }
}

/// Fisher-Yates, last index to first, partner drawn from `[0, i]`.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
