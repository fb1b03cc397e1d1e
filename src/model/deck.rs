use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Card, CardId, Symbol};

/// Cards in board order; `cards[i].id == i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a deck from symbols already in their final order, assigning ids by position.
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let cards = symbols
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Card::new(id, symbol))
            .collect();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn symbol_counts(&self) -> HashMap<Symbol, usize> {
        self.cards.iter().map(|card| card.symbol).counts()
    }

    /// Ids of the cards holding `symbol`, in board order.
    pub fn positions_of(&self, symbol: Symbol) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| card.symbol == symbol)
            .map(|card| card.id)
            .collect()
    }
}
