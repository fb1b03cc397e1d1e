use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::events::EventHandler;
use crate::game::settings::Settings;
use crate::model::{
    AggregateStatistics, Card, Deck, Difficulty, GameEngineEvent, StarRating, VictorySummary,
};

/// What a presentation layer needs to draw the board and the status bar,
/// rebuilt from engine events alone.
#[derive(Debug, Clone)]
pub struct ScoreboardProjection {
    pub difficulty: Option<Difficulty>,
    pub cards: Vec<Card>,
    pub moves: u32,
    pub stars: StarRating,
    pub best_time: Option<Duration>,
    pub statistics: AggregateStatistics,
    pub settings: Settings,
    /// Cards to highlight as a wrong guess until the mismatch is cleared.
    pub shaking: Vec<usize>,
    pub last_victory: Option<VictorySummary>,
}

impl Default for ScoreboardProjection {
    fn default() -> Self {
        Self {
            difficulty: None,
            cards: Vec::new(),
            moves: 0,
            stars: StarRating::Three,
            best_time: None,
            statistics: AggregateStatistics::default(),
            settings: Settings::default(),
            shaking: Vec::new(),
            last_victory: None,
        }
    }
}

impl ScoreboardProjection {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn reset(&mut self, difficulty: Difficulty, deck: &Deck) {
        self.difficulty = Some(difficulty);
        self.cards = deck.cards().to_vec();
        self.shaking.clear();
        self.last_victory = None;
    }

    fn card_mut(&mut self, id: usize) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }
}

impl EventHandler<GameEngineEvent> for ScoreboardProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::NewGameStarted { difficulty, deck } => self.reset(*difficulty, deck),
            GameEngineEvent::CardFlipped(id) => {
                if let Some(card) = self.card_mut(*id) {
                    card.is_flipped = true;
                }
            }
            GameEngineEvent::CardUnflipped(id) => {
                if let Some(card) = self.card_mut(*id) {
                    card.is_flipped = false;
                }
            }
            GameEngineEvent::CardsMatched(a, b) => {
                for id in [*a, *b] {
                    if let Some(card) = self.card_mut(id) {
                        card.is_matched = true;
                    }
                }
            }
            GameEngineEvent::CardsMismatched(a, b) => self.shaking = vec![*a, *b],
            GameEngineEvent::MismatchCleared(a, b) => self.shaking.retain(|id| id != a && id != b),
            GameEngineEvent::MovesChanged(moves) => self.moves = *moves,
            GameEngineEvent::StarsChanged(stars) => self.stars = *stars,
            GameEngineEvent::BestTimeChanged(best) => self.best_time = *best,
            GameEngineEvent::StatisticsChanged(stats) => self.statistics = *stats,
            GameEngineEvent::SettingsChanged(settings) => self.settings = *settings,
            GameEngineEvent::Victory(summary) => self.last_victory = Some(*summary),
            GameEngineEvent::TimerStateChanged(_) | GameEngineEvent::SoundRequested(_) => (),
        }
    }
}
