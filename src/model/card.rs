use serde::{Deserialize, Serialize};

pub type CardId = usize;

/// Opaque face token; cards match when their symbols are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub char);

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub symbol: Symbol,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub fn new(id: CardId, symbol: Symbol) -> Self {
        Self {
            id,
            symbol,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Face-down and unmatched; the only state in which a card accepts a selection.
    pub fn is_selectable(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }
}
