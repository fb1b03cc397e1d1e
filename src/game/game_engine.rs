use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::deck_generator::DeckGenerator;
use super::error::ConfigurationError;
use super::persistence::PersistenceGateway;
use super::scheduler::Scheduler;
use super::scoring::stars_for;
use super::settings::{EngineConfig, Settings};
use super::timer::{Clock, SystemClock};
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    AggregateStatistics, CardId, DeferredStep, Difficulty, GameEngineCommand, GameEngineEvent,
    GamePhase, GameSession, ScheduledTask, SoundCue, StarRating, Theme, VictorySummary,
};

/// The memory game state machine.
///
/// Input arrives as method calls or [`GameEngineCommand`]s; every visible
/// consequence leaves as a [`GameEngineEvent`]. Pair evaluation, hiding a
/// mismatch and finishing the game are deferred through the [`Scheduler`] so
/// the presentation can show the cards first. Each deferred task is tagged
/// with the session that scheduled it and ignored once a newer game exists.
pub struct GameEngine {
    session: GameSession,
    deck_generator: DeckGenerator,
    persistence: PersistenceGateway,
    settings: Settings,
    config: EngineConfig,
    scheduler: Rc<dyn Scheduler>,
    clock: Rc<dyn Clock>,
    debug_mode: bool,
    subscription_id: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription_id) = self.subscription_id.take() {
            subscription_id.unsubscribe();
        }
    }
}

impl GameEngine {
    pub fn new(
        config: EngineConfig,
        persistence: PersistenceGateway,
        scheduler: Rc<dyn Scheduler>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
    ) -> Result<Self, ConfigurationError> {
        let deck_generator = DeckGenerator::new(&config.palette, config.seed)?;
        debug!(target: "game_engine", "Deck seed: {}", deck_generator.seed());
        let settings = persistence.load_settings();
        Ok(Self {
            session: GameSession::default(),
            deck_generator,
            persistence,
            settings,
            config,
            scheduler,
            clock: Rc::new(SystemClock),
            debug_mode: Settings::is_debug_mode(),
            subscription_id: None,
            game_engine_event_emitter,
        })
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Moves the engine behind `Rc<RefCell<_>>` and feeds it every command sent on the observer.
    /// Listeners of the engine's own events must not dispatch commands synchronously.
    pub fn connect(
        engine: Self,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) -> Rc<RefCell<Self>> {
        let refcell = Rc::new(RefCell::new(engine));
        let engine_handler = Rc::downgrade(&refcell);
        let subscription_id = game_engine_command_observer.subscribe_with_handle(move |command| {
            if let Some(engine) = engine_handler.upgrade() {
                engine.borrow_mut().handle_command(command.clone());
            }
        });
        refcell.borrow_mut().subscription_id = Some(subscription_id);
        refcell
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::NewGame(difficulty) => self.start_new_game(difficulty),
            GameEngineCommand::SelectCard(card_id) => {
                self.select_card(card_id);
            }
            GameEngineCommand::SetSoundEnabled(enabled) => self.set_sound_enabled(enabled),
            GameEngineCommand::ToggleSound => self.toggle_sound(),
            GameEngineCommand::SetTheme(theme) => self.set_theme(theme),
            GameEngineCommand::ToggleTheme => self.toggle_theme(),
            GameEngineCommand::InitDisplay => self.init_display(),
            GameEngineCommand::RunScheduled(task) => self.run_scheduled(task),
        }
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(&event);
    }

    fn play_sound(&self, cue: SoundCue) {
        if self.settings.sound_enabled {
            self.emit(GameEngineEvent::SoundRequested(cue));
        }
    }

    fn schedule(&self, step: DeferredStep, delay: Duration) {
        let task = ScheduledTask {
            session: self.session.id(),
            step,
            delay,
        };
        trace!(target: "game_engine", "Scheduling {:?}", task);
        self.scheduler.schedule(task);
    }

    /// Replaces the session. Valid in every phase; pending work of the old session goes stale.
    pub fn start_new_game(&mut self, difficulty: Difficulty) {
        let deck = self.deck_generator.generate(difficulty);
        self.session = GameSession::new(difficulty, deck);
        info!(
            target: "game_engine",
            "New game; difficulty: {}; session: {}",
            difficulty,
            self.session.id()
        );
        if self.debug_mode {
            let layout: String = self.session.deck().iter().map(|card| card.symbol.0).collect();
            info!(target: "game_engine", "Layout: {}", layout);
        }

        self.emit(GameEngineEvent::NewGameStarted {
            difficulty,
            deck: self.session.deck().clone(),
        });
        self.emit(GameEngineEvent::MovesChanged(0));
        self.emit(GameEngineEvent::StarsChanged(self.stars()));
        self.emit(GameEngineEvent::TimerStateChanged(None));
        self.emit(GameEngineEvent::BestTimeChanged(
            self.persistence.best_time(difficulty),
        ));
    }

    /// Flips a face-down card. Returns `false`, with no state change and no
    /// events, when the game is not accepting input or the card cannot be selected.
    pub fn select_card(&mut self, card_id: CardId) -> bool {
        if !self.session.phase().accepts_input() {
            trace!(target: "game_engine", "Ignoring card {} in phase {:?}", card_id, self.session.phase());
            return false;
        }
        let Some(card) = self.session.deck.get_mut(card_id) else {
            trace!(target: "game_engine", "Ignoring unknown card {}", card_id);
            return false;
        };
        if !card.is_selectable() {
            trace!(target: "game_engine", "Ignoring card {} already face-up", card_id);
            return false;
        }
        card.is_flipped = true;

        self.emit(GameEngineEvent::CardFlipped(card_id));
        self.play_sound(SoundCue::Flip);
        self.session.flipped.push(card_id);

        if self.session.flipped.len() == 2 {
            if self.session.moves == 0 && !self.session.timer.is_running() {
                self.session.timer.start(self.clock.now());
                self.emit(GameEngineEvent::TimerStateChanged(self.session.timer_state()));
            }
            self.session.moves += 1;
            self.session.phase = GamePhase::Resolving;
            self.emit(GameEngineEvent::MovesChanged(self.session.moves));
            self.emit(GameEngineEvent::StarsChanged(self.stars()));
            self.schedule(DeferredStep::EvaluatePair, self.config.resolve_delay);
        }
        true
    }

    /// Entry point for tasks handed out through the scheduler.
    pub fn run_scheduled(&mut self, task: ScheduledTask) {
        if task.session != self.session.id() {
            debug!(
                target: "game_engine",
                "Discarding {:?} from superseded session {}",
                task.step,
                task.session
            );
            return;
        }
        match task.step {
            DeferredStep::EvaluatePair => self.evaluate_pair(),
            DeferredStep::ConcealMismatch(first, second) => self.conceal_mismatch(first, second),
            DeferredStep::CompleteVictory => self.complete_victory(),
        }
    }

    fn evaluate_pair(&mut self) {
        let &[first, second] = self.session.flipped() else {
            warn!(target: "game_engine", "Pair evaluation with {:?} face-up", self.session.flipped());
            return;
        };
        if self.session.phase() != GamePhase::Resolving {
            warn!(target: "game_engine", "Pair evaluation in phase {:?}", self.session.phase());
            return;
        }
        let symbols = (
            self.session.deck().get(first).map(|card| card.symbol),
            self.session.deck().get(second).map(|card| card.symbol),
        );
        self.session.flipped.clear();

        match symbols {
            (Some(a), Some(b)) if a == b => {
                for card_id in [first, second] {
                    if let Some(card) = self.session.deck.get_mut(card_id) {
                        card.is_matched = true;
                    }
                }
                self.session.matched_pairs += 1;
                self.emit(GameEngineEvent::CardsMatched(first, second));
                self.play_sound(SoundCue::Match);

                if self.session.is_complete() {
                    // stays Resolving so nothing is accepted before the victory step
                    self.schedule(DeferredStep::CompleteVictory, self.config.victory_delay);
                } else {
                    self.session.phase = GamePhase::Active;
                }
            }
            _ => {
                self.emit(GameEngineEvent::CardsMismatched(first, second));
                self.play_sound(SoundCue::Wrong);
                self.schedule(
                    DeferredStep::ConcealMismatch(first, second),
                    self.config.conceal_delay,
                );
                self.session.phase = GamePhase::Active;
            }
        }
    }

    fn conceal_mismatch(&mut self, first: CardId, second: CardId) {
        for card_id in [first, second] {
            if let Some(card) = self.session.deck.get_mut(card_id) {
                if card.is_flipped && !card.is_matched {
                    card.is_flipped = false;
                    self.emit(GameEngineEvent::CardUnflipped(card_id));
                }
            }
        }
        self.emit(GameEngineEvent::MismatchCleared(first, second));
    }

    fn complete_victory(&mut self) {
        if self.session.phase() != GamePhase::Resolving || !self.session.is_complete() {
            warn!(target: "game_engine", "Victory step in phase {:?}", self.session.phase());
            return;
        }
        let now = self.clock.now();
        self.session.timer.stop(now);
        let elapsed = self.session.timer.elapsed(now);
        let difficulty = self.session.difficulty();
        let stars = self.stars();
        let is_new_record = self.persistence.set_best_time_if_better(difficulty, elapsed);
        let statistics = self.persistence.record_game_outcome(true);
        self.session.phase = GamePhase::Won;

        info!(
            target: "game_engine",
            "Won {} game in {:?} with {} moves; {} stars; new record: {}",
            difficulty,
            elapsed,
            self.session.moves(),
            stars.count(),
            is_new_record
        );

        self.emit(GameEngineEvent::TimerStateChanged(self.session.timer_state()));
        self.play_sound(SoundCue::Win);
        if is_new_record {
            self.emit(GameEngineEvent::BestTimeChanged(Some(elapsed)));
        }
        self.emit(GameEngineEvent::StatisticsChanged(statistics));
        self.emit(GameEngineEvent::Victory(VictorySummary {
            elapsed,
            moves: self.session.moves(),
            stars,
            is_new_record,
        }));
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.persistence.set_sound_enabled(enabled);
        self.emit(GameEngineEvent::SettingsChanged(self.settings));
    }

    pub fn toggle_sound(&mut self) {
        self.set_sound_enabled(!self.settings.sound_enabled);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.persistence.set_theme(theme);
        self.emit(GameEngineEvent::SettingsChanged(self.settings));
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.settings.theme.toggled());
    }

    pub fn init_display(&self) {
        self.emit(GameEngineEvent::SettingsChanged(self.settings));
        self.emit(GameEngineEvent::StatisticsChanged(self.statistics()));
        if self.session.phase() != GamePhase::Idle {
            self.emit(GameEngineEvent::BestTimeChanged(self.best_time()));
            self.emit(GameEngineEvent::MovesChanged(self.session.moves()));
            self.emit(GameEngineEvent::StarsChanged(self.stars()));
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Current rating for the live move count.
    pub fn stars(&self) -> StarRating {
        stars_for(self.session.difficulty(), self.session.moves())
    }

    /// Time on the game clock; poll this for a running display.
    pub fn elapsed(&self) -> Duration {
        self.session.elapsed_at(self.clock.now())
    }

    pub fn best_time(&self) -> Option<Duration> {
        self.persistence.best_time(self.session.difficulty())
    }

    pub fn statistics(&self) -> AggregateStatistics {
        self.persistence.statistics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::game::deck_generator::DEFAULT_PALETTE;
    use crate::game::persistence::MemoryStore;
    use crate::game::scheduler::ManualScheduler;
    use crate::game::timer::ManualClock;
    use crate::model::Symbol;
    use crate::tests::UsingLogger;
    use test_context::test_context;

    struct Harness {
        engine: GameEngine,
        scheduler: ManualScheduler,
        clock: ManualClock,
        events: Rc<RefCell<Vec<GameEngineEvent>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            let (emitter, observer) = Channel::<GameEngineEvent>::new();
            let events = Rc::new(RefCell::new(Vec::new()));
            let events_clone = events.clone();
            observer.subscribe(move |event| events_clone.borrow_mut().push(event.clone()));

            let scheduler = ManualScheduler::new();
            let clock = ManualClock::default();
            let config = EngineConfig {
                seed: Some(2024),
                ..EngineConfig::default()
            };
            let engine = GameEngine::new(
                config,
                PersistenceGateway::new(Box::new(store)),
                Rc::new(scheduler.clone()),
                emitter,
            )
            .unwrap()
            .with_clock(Rc::new(clock.clone()));

            Self {
                engine,
                scheduler,
                clock,
                events,
            }
        }

        fn take_events(&self) -> Vec<GameEngineEvent> {
            self.events.borrow_mut().drain(..).collect()
        }

        /// Runs every queued task, including ones queued while running.
        fn fire_all(&mut self) {
            while let Some(task) = self.scheduler.pop() {
                self.clock.advance(task.delay);
                self.engine.run_scheduled(task);
            }
        }

        /// Ids of both cards for every symbol on the board, in palette order.
        fn pairs(&self) -> Vec<(CardId, CardId)> {
            let deck = self.engine.session().deck();
            DEFAULT_PALETTE[..deck.pairs()]
                .iter()
                .map(|symbol| {
                    let ids = deck.positions_of(*symbol);
                    (ids[0], ids[1])
                })
                .collect()
        }

        /// Two face-down cards with different symbols.
        fn mismatch(&self) -> (CardId, CardId) {
            let deck = self.engine.session().deck();
            let first = deck.cards()[0];
            let second = deck
                .iter()
                .find(|card| card.symbol != first.symbol && card.is_selectable())
                .unwrap();
            (first.id, second.id)
        }

        fn play_pair(&mut self, (a, b): (CardId, CardId)) {
            assert!(self.engine.select_card(a));
            assert!(self.engine.select_card(b));
            self.fire_all();
        }
    }

    #[test]
    fn test_idle_engine_ignores_selection() {
        let mut harness = Harness::new();
        assert_eq!(harness.engine.phase(), GamePhase::Idle);
        assert!(!harness.engine.select_card(0));
        assert!(harness.take_events().is_empty());
    }

    #[test]
    fn test_new_game_resets_and_announces() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Medium);

        let session = harness.engine.session();
        assert_eq!(session.phase(), GamePhase::Active);
        assert_eq!(session.difficulty(), Difficulty::Medium);
        assert_eq!(session.deck().len(), 16);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.matched_pairs(), 0);
        assert!(session.flipped().is_empty());

        let events = harness.take_events();
        assert!(matches!(
            events[0],
            GameEngineEvent::NewGameStarted {
                difficulty: Difficulty::Medium,
                ..
            }
        ));
        assert_eq!(
            events[1..],
            [
                GameEngineEvent::MovesChanged(0),
                GameEngineEvent::StarsChanged(StarRating::Three),
                GameEngineEvent::TimerStateChanged(None),
                GameEngineEvent::BestTimeChanged(None),
            ]
        );
    }

    #[test]
    fn test_timer_starts_when_first_move_completes() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.pairs()[0];
        harness.clock.advance(Duration::from_secs(10));
        assert_eq!(harness.engine.elapsed(), Duration::ZERO);

        harness.engine.select_card(a);
        harness.clock.advance(Duration::from_secs(10));
        assert_eq!(harness.engine.elapsed(), Duration::ZERO);
        assert!(harness.engine.session().timer_state().is_none());

        harness.take_events();
        harness.engine.select_card(b);
        assert_eq!(harness.engine.session().moves(), 1);
        assert_eq!(harness.engine.elapsed(), Duration::ZERO);
        let events = harness.take_events();
        assert!(events.iter().any(|event| matches!(
            event,
            GameEngineEvent::TimerStateChanged(Some(state)) if state.is_running()
        )));

        harness.clock.advance(Duration::from_millis(2500));
        assert_eq!(harness.engine.elapsed(), Duration::from_millis(2500));
    }

    #[test]
    fn test_first_card_flips_and_plays_sound() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        harness.take_events();

        assert!(harness.engine.select_card(3));
        assert_eq!(
            harness.take_events(),
            [
                GameEngineEvent::CardFlipped(3),
                GameEngineEvent::SoundRequested(SoundCue::Flip),
            ]
        );
        assert!(harness.engine.session().deck().cards()[3].is_flipped);
        assert_eq!(harness.engine.session().flipped(), &[3]);
        assert_eq!(harness.engine.session().moves(), 0);
    }

    #[test]
    fn test_second_card_defers_evaluation() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.pairs()[0];

        harness.engine.select_card(a);
        harness.engine.select_card(b);

        let session = harness.engine.session();
        assert_eq!(session.moves(), 1);
        assert_eq!(session.phase(), GamePhase::Resolving);
        assert_eq!(session.matched_pairs(), 0);
        assert!(!session.deck().cards()[a].is_matched);

        let pending = harness.scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].step, DeferredStep::EvaluatePair);
        assert_eq!(pending[0].delay, Duration::from_millis(800));
        assert_eq!(pending[0].session, session.id());
    }

    #[test]
    fn test_input_locked_while_resolving() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.pairs()[0];
        let (c, _) = harness.pairs()[1];
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        harness.take_events();

        assert!(!harness.engine.select_card(c));
        assert!(harness.take_events().is_empty());
        assert!(!harness.engine.session().deck().cards()[c].is_flipped);
    }

    #[test]
    fn test_reselecting_flipped_or_matched_card_is_noop() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let pairs = harness.pairs();
        harness.play_pair(pairs[0]);

        let (c, _) = pairs[1];
        harness.engine.select_card(c);
        harness.take_events();
        let before = harness.engine.session().clone();

        assert!(!harness.engine.select_card(c));
        assert!(!harness.engine.select_card(pairs[0].0));
        assert!(!harness.engine.select_card(99));

        assert!(harness.take_events().is_empty());
        let after = harness.engine.session();
        assert_eq!(after.deck(), before.deck());
        assert_eq!(after.flipped(), before.flipped());
        assert_eq!(after.moves(), before.moves());
        assert_eq!(after.phase(), before.phase());
    }

    #[test]
    fn test_equal_symbols_match() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.pairs()[2];
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        harness.take_events();

        harness.fire_all();

        let session = harness.engine.session();
        assert_eq!(session.matched_pairs(), 1);
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.flipped().is_empty());
        assert!(session.deck().cards()[a].is_matched);
        assert!(session.deck().cards()[b].is_matched);
        assert_eq!(
            harness.take_events(),
            vec![
                GameEngineEvent::CardsMatched(a, b),
                GameEngineEvent::SoundRequested(SoundCue::Match),
            ]
        );
    }

    #[test]
    fn test_different_symbols_mismatch_then_unflip() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.mismatch();
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        harness.take_events();

        let evaluate = harness.scheduler.pop().unwrap();
        harness.engine.run_scheduled(evaluate);

        // face-up until the conceal step fires, but input is open again
        let session = harness.engine.session();
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.flipped().is_empty());
        assert!(session.deck().cards()[a].is_flipped);
        assert!(session.deck().cards()[b].is_flipped);
        assert_eq!(
            harness.take_events(),
            vec![
                GameEngineEvent::CardsMismatched(a, b),
                GameEngineEvent::SoundRequested(SoundCue::Wrong),
            ]
        );

        let conceal = harness.scheduler.pop().unwrap();
        assert_eq!(conceal.step, DeferredStep::ConcealMismatch(a, b));
        assert_eq!(conceal.delay, Duration::from_millis(600));
        harness.engine.run_scheduled(conceal);

        let session = harness.engine.session();
        assert!(!session.deck().cards()[a].is_flipped);
        assert!(!session.deck().cards()[b].is_flipped);
        assert_eq!(session.matched_pairs(), 0);
        assert_eq!(
            harness.take_events(),
            vec![
                GameEngineEvent::CardUnflipped(a),
                GameEngineEvent::CardUnflipped(b),
                GameEngineEvent::MismatchCleared(a, b),
            ]
        );
    }

    #[test]
    fn test_win_fires_exactly_on_last_pair() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let pairs = harness.pairs();

        for pair in &pairs[..3] {
            harness.play_pair(*pair);
            assert_eq!(harness.engine.phase(), GamePhase::Active);
        }
        assert!(!harness
            .take_events()
            .iter()
            .any(|event| matches!(event, GameEngineEvent::Victory(_))));

        let (a, b) = pairs[3];
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        let evaluate = harness.scheduler.pop().unwrap();
        harness.engine.run_scheduled(evaluate);

        assert_eq!(harness.engine.phase(), GamePhase::Resolving);
        let pending = harness.scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].step, DeferredStep::CompleteVictory);
        assert_eq!(pending[0].delay, Duration::from_millis(500));

        harness.fire_all();
        assert_eq!(harness.engine.phase(), GamePhase::Won);
        assert_eq!(harness.engine.session().matched_pairs(), 4);
        assert!(!harness.engine.select_card(0));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_perfect_easy_game(_: &mut UsingLogger) {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        for pair in harness.pairs() {
            harness.play_pair(pair);
        }

        let session = harness.engine.session();
        assert_eq!(session.phase(), GamePhase::Won);
        assert_eq!(session.matched_pairs(), 4);
        assert_eq!(session.moves(), 4);
        assert_eq!(harness.engine.stars(), StarRating::Three);
    }

    #[test]
    fn test_eight_moves_still_earns_three_stars() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let pairs = harness.pairs();
        let (a, b) = harness.mismatch();
        for _ in 0..4 {
            harness.play_pair((a, b));
        }
        for pair in pairs {
            harness.play_pair(pair);
        }

        let summary = harness
            .take_events()
            .into_iter()
            .find_map(|event| match event {
                GameEngineEvent::Victory(summary) => Some(summary),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary.moves, 8);
        assert_eq!(summary.stars, StarRating::Three);
        assert_eq!(harness.engine.phase(), GamePhase::Won);
    }

    #[test]
    fn test_ninth_move_drops_to_two_stars() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.mismatch();
        for _ in 0..8 {
            harness.play_pair((a, b));
        }
        harness.take_events();

        harness.engine.select_card(a);
        harness.engine.select_card(b);
        let events = harness.take_events();
        assert!(events.contains(&GameEngineEvent::MovesChanged(9)));
        assert!(events.contains(&GameEngineEvent::StarsChanged(StarRating::Two)));
    }

    #[test]
    fn test_victory_reports_time_and_records() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        harness.take_events();
        let pairs = harness.pairs();

        harness.engine.select_card(pairs[0].0);
        harness.clock.advance(Duration::from_secs(10));
        harness.engine.select_card(pairs[0].1);
        harness.fire_all();
        for pair in &pairs[1..] {
            harness.play_pair(*pair);
        }
        harness.fire_all();

        // the 10s before the first move completes do not count
        let expected = Duration::from_millis(800) * 4
            + Duration::from_millis(500);
        let events = harness.take_events();
        let tail = &events[events.len() - 5..];
        assert!(matches!(tail[0], GameEngineEvent::TimerStateChanged(Some(state)) if !state.is_running()));
        assert_eq!(
            tail[1..],
            [
                GameEngineEvent::SoundRequested(SoundCue::Win),
                GameEngineEvent::BestTimeChanged(Some(expected)),
                GameEngineEvent::StatisticsChanged(AggregateStatistics::new(1, 1)),
                GameEngineEvent::Victory(VictorySummary {
                    elapsed: expected,
                    moves: 4,
                    stars: StarRating::Three,
                    is_new_record: true,
                }),
            ]
        );
        assert_eq!(harness.engine.best_time(), Some(expected));

        // timer is frozen after the win
        harness.clock.advance(Duration::from_secs(60));
        assert_eq!(harness.engine.elapsed(), expected);

        // a slower game is not a record
        harness.engine.start_new_game(Difficulty::Easy);
        let pairs = harness.pairs();
        harness.engine.select_card(pairs[0].0);
        harness.engine.select_card(pairs[0].1);
        harness.fire_all();
        harness.clock.advance(Duration::from_secs(30));
        for pair in &pairs[1..] {
            harness.play_pair(*pair);
        }
        harness.fire_all();
        let summary = harness
            .take_events()
            .into_iter()
            .find_map(|event| match event {
                GameEngineEvent::Victory(summary) => Some(summary),
                _ => None,
            })
            .unwrap();
        assert!(!summary.is_new_record);
        assert_eq!(harness.engine.best_time(), Some(expected));
        assert_eq!(harness.engine.statistics(), AggregateStatistics::new(2, 2));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_stale_evaluation_is_discarded(_: &mut UsingLogger) {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.pairs()[0];
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        let stale = harness.scheduler.pop().unwrap();

        harness.engine.start_new_game(Difficulty::Easy);
        let (c, _) = harness.pairs()[1];
        harness.engine.select_card(c);
        harness.take_events();
        let before = harness.engine.session().clone();

        harness.engine.run_scheduled(stale);

        let after = harness.engine.session();
        assert_eq!(after.id(), before.id());
        assert_eq!(after.deck(), before.deck());
        assert_eq!(after.flipped(), &[c]);
        assert_eq!(after.matched_pairs(), 0);
        assert_eq!(after.moves(), 0);
        assert_eq!(after.phase(), GamePhase::Active);
        assert!(harness.take_events().is_empty());
    }

    #[test]
    fn test_stale_conceal_and_victory_are_discarded() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        let (a, b) = harness.mismatch();
        harness.engine.select_card(a);
        harness.engine.select_card(b);
        let evaluate = harness.scheduler.pop().unwrap();
        harness.engine.run_scheduled(evaluate);
        let stale_conceal = harness.scheduler.pop().unwrap();

        let stale_victory = ScheduledTask {
            session: stale_conceal.session,
            step: DeferredStep::CompleteVictory,
            delay: Duration::from_millis(500),
        };

        harness.engine.start_new_game(Difficulty::Easy);
        harness.engine.select_card(a);
        harness.take_events();

        harness.engine.run_scheduled(stale_conceal);
        harness.engine.run_scheduled(stale_victory);

        assert!(harness.engine.session().deck().cards()[a].is_flipped);
        assert_eq!(harness.engine.phase(), GamePhase::Active);
        assert!(harness.take_events().is_empty());
        assert_eq!(harness.engine.statistics(), AggregateStatistics::default());
    }

    #[test]
    fn test_victory_step_without_complete_board_is_ignored() {
        let mut harness = Harness::new();
        harness.engine.start_new_game(Difficulty::Easy);
        harness.take_events();
        let session = harness.engine.session().id();

        harness.engine.run_scheduled(ScheduledTask {
            session,
            step: DeferredStep::CompleteVictory,
            delay: Duration::ZERO,
        });

        assert_eq!(harness.engine.phase(), GamePhase::Active);
        assert!(harness.take_events().is_empty());
    }

    #[test]
    fn test_sound_disabled_suppresses_cues() {
        let mut harness = Harness::with_store(MemoryStore::with_values([("soundEnabled", "false")]));
        assert!(!harness.engine.settings().sound_enabled);

        harness.engine.start_new_game(Difficulty::Easy);
        let pair = harness.pairs()[0];
        harness.play_pair(pair);

        assert!(!harness
            .take_events()
            .iter()
            .any(|event| matches!(event, GameEngineEvent::SoundRequested(_))));

        harness.engine.toggle_sound();
        assert_eq!(
            harness.take_events(),
            vec![GameEngineEvent::SettingsChanged(Settings {
                sound_enabled: true,
                theme: Theme::Light,
            })]
        );
    }

    #[test]
    fn test_settings_changes_persist() {
        let mut harness = Harness::new();
        harness.engine.toggle_theme();
        harness.engine.set_sound_enabled(false);
        assert_eq!(
            harness.engine.persistence.load_settings(),
            Settings {
                sound_enabled: false,
                theme: Theme::Dark,
            }
        );
        harness.engine.toggle_theme();
        assert_eq!(harness.engine.persistence.theme(), Theme::Light);
    }

    #[test]
    fn test_commands_through_channel() {
        let harness = Harness::new();
        let events = harness.events.clone();
        let scheduler = harness.scheduler.clone();
        let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
        let engine = GameEngine::connect(harness.engine, command_observer);

        command_emitter.emit(&GameEngineCommand::NewGame(Difficulty::Hard));
        command_emitter.emit(&GameEngineCommand::SelectCard(0));
        command_emitter.emit(&GameEngineCommand::SelectCard(1));
        assert_eq!(engine.borrow().session().moves(), 1);

        let task = scheduler.pop().unwrap();
        command_emitter.emit(&GameEngineCommand::RunScheduled(task));
        assert_eq!(engine.borrow().phase(), GamePhase::Active);

        engine.borrow_mut().destroy();
        events.borrow_mut().clear();
        command_emitter.emit(&GameEngineCommand::NewGame(Difficulty::Easy));
        assert!(events.borrow().is_empty());
        assert!(!command_emitter.has_listeners());
    }

    #[test]
    fn test_init_display_replays_state() {
        let harness = Harness::with_store(MemoryStore::with_values([("theme", "dark")]));
        harness.engine.init_display();
        assert_eq!(
            harness.take_events(),
            vec![
                GameEngineEvent::SettingsChanged(Settings {
                    sound_enabled: true,
                    theme: Theme::Dark,
                }),
                GameEngineEvent::StatisticsChanged(AggregateStatistics::default()),
            ]
        );
    }

    #[test]
    fn test_rejects_short_palette() {
        let (emitter, _observer) = Channel::<GameEngineEvent>::new();
        let config = EngineConfig {
            palette: vec![Symbol('x'), Symbol('y')],
            ..EngineConfig::default()
        };
        let result = GameEngine::new(
            config,
            PersistenceGateway::in_memory(),
            Rc::new(ManualScheduler::new()),
            emitter,
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::PaletteTooSmall {
                available: 2,
                required: 12
            })
        ));
    }
}
