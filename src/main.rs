use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use log::{error, info};
use memory_match::events::{Channel, EventHandler};
use memory_match::game::{
    EngineConfig, FileStore, GameEngine, ManualScheduler, MemoryStore, PersistenceGateway,
    Settings,
};
use memory_match::helpers::{format_best_time, format_time};
use memory_match::model::{
    Difficulty, GameEngineCommand, GameEngineEvent, GamePhase, ScoreboardProjection,
};
use memory_match::Destroyable;

const HELP: &str = "\
commands:
  <n>                 flip card n
  new [easy|medium|hard]
  sound               toggle sound cues
  theme               toggle light/dark
  stats               show statistics
  quit";

fn init_logging() {
    env_logger::init();
}

fn open_persistence() -> PersistenceGateway {
    let dir = Settings::data_dir();
    match FileStore::open(&dir) {
        Ok(store) => {
            info!("Using store at {}", store.path().display());
            PersistenceGateway::new(Box::new(store))
        }
        Err(err) => {
            error!("Cannot open store in {}: {}; progress will not be saved", dir.display(), err);
            PersistenceGateway::new(Box::new(MemoryStore::new()))
        }
    }
}

fn render(scoreboard: &ScoreboardProjection, elapsed: std::time::Duration) {
    let columns = match scoreboard.difficulty {
        Some(Difficulty::Hard) => 6,
        _ => 4,
    };
    println!();
    for row in scoreboard.cards.chunks(columns) {
        let line: Vec<String> = row
            .iter()
            .map(|card| {
                let face = if card.is_flipped || card.is_matched {
                    card.symbol.to_string()
                } else {
                    "??".to_string()
                };
                let marker = if scoreboard.shaking.contains(&card.id) { '!' } else { ' ' };
                format!("{:>2}:{}{}", card.id, face, marker)
            })
            .collect();
        println!("  {}", line.join("  "));
    }
    println!(
        "moves {}  {}  time {}  best {}  [{} theme]",
        scoreboard.moves,
        scoreboard.stars.to_glyphs(),
        format_time(elapsed),
        format_best_time(scoreboard.best_time),
        scoreboard.settings.theme
    );
}

fn main() {
    init_logging();

    let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
    let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
    let scheduler = ManualScheduler::new();

    let engine = match GameEngine::new(
        EngineConfig::from_env(),
        open_persistence(),
        Rc::new(scheduler.clone()),
        event_emitter,
    ) {
        Ok(engine) => GameEngine::connect(engine, command_observer),
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let scoreboard = ScoreboardProjection::new();
    let scoreboard_handler: Rc<RefCell<ScoreboardProjection>> = scoreboard.clone();
    event_observer.subscribe(move |event| {
        scoreboard_handler.borrow_mut().handle_event(event);
        match event {
            GameEngineEvent::SoundRequested(cue) => {
                let tone = cue.tone();
                println!("  ♪ {:?} ({} Hz)", cue, tone.frequency_hz);
            }
            GameEngineEvent::Victory(summary) => {
                println!();
                println!("  You won! {}", summary.stars.to_glyphs());
                println!(
                    "  time {}  moves {}{}",
                    format_time(summary.elapsed),
                    summary.moves,
                    if summary.is_new_record { "  NEW RECORD" } else { "" }
                );
            }
            _ => (),
        }
    });

    command_emitter.emit(&GameEngineCommand::InitDisplay);
    command_emitter.emit(&GameEngineCommand::NewGame(Difficulty::default()));
    println!("{}", HELP);

    let stdin = io::stdin();
    loop {
        render(&scoreboard.borrow(), engine.borrow().elapsed());
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }
        let mut words = line.split_whitespace();
        let command = match words.next() {
            None => continue,
            Some("quit") | Some("q") => break,
            Some("help") => {
                println!("{}", HELP);
                continue;
            }
            Some("stats") => {
                let stats = engine.borrow().statistics();
                println!(
                    "played {}  won {}  win rate {}%",
                    stats.games_played, stats.games_won, stats.win_rate
                );
                continue;
            }
            Some("new") => {
                let difficulty = words
                    .next()
                    .map(|word| word.parse::<Difficulty>())
                    .unwrap_or_else(|| Ok(engine.borrow().session().difficulty()));
                match difficulty {
                    Ok(difficulty) => GameEngineCommand::NewGame(difficulty),
                    Err(err) => {
                        println!("{}", err);
                        continue;
                    }
                }
            }
            Some("sound") => GameEngineCommand::ToggleSound,
            Some("theme") => GameEngineCommand::ToggleTheme,
            Some(word) => match word.parse::<usize>() {
                Ok(card_id) => GameEngineCommand::SelectCard(card_id),
                Err(_) => {
                    println!("{}", HELP);
                    continue;
                }
            },
        };
        command_emitter.emit(&command);

        // show the face-up pair before each deferred step runs
        while let Some(task) = scheduler.pop() {
            render(&scoreboard.borrow(), engine.borrow().elapsed());
            std::thread::sleep(task.delay);
            command_emitter.emit(&GameEngineCommand::RunScheduled(task));
        }

        if engine.borrow().phase() == GamePhase::Won {
            println!("  type `new` to play again");
        }
    }

    engine.borrow_mut().destroy();
}
