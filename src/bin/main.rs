use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use board_game_traits::Color;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{info, warn};

use taksync::evaluation::ValueEvaluator;
use taksync::game::Game;
use taksync::position::{Move, Position};
use taksync::protocol::{MoveProtocol, ProtocolAction};
use taksync::search::{CancellationToken, MinimaxEngine, SearchSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("taksync")
        .version("0.1")
        .about("Play Tak against a minimax engine, or watch it play itself")
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .env("SIZE")
                .help("Board size")
                .num_args(1)
                .default_value("5")
                .value_parser(clap::value_parser!(u64).range(3..=8)),
        )
        .arg(
            Arg::new("depth")
                .short('d')
                .long("depth")
                .env("DEPTH")
                .help("Maximum search depth, in plies")
                .num_args(1)
                .default_value("3")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("moveTime")
                .long("move-time")
                .env("MOVE_TIME")
                .help("Stop searching after this many seconds, and play the best move found")
                .num_args(1)
                .value_parser(clap::value_parser!(f32)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .env("SEED")
                .help("Seed for randomized move ordering. 0 picks a random seed")
                .num_args(1)
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("randomize")
                .long("randomize")
                .env("RANDOMIZE")
                .help("Randomize the engine's move ordering, for more varied play")
                .action(ArgAction::SetTrue)
                .num_args(0),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .env("PARALLEL")
                .help("Search root moves on multiple threads")
                .action(ArgAction::SetTrue)
                .num_args(0),
        )
        .arg(
            Arg::new("coreFraction")
                .long("core-fraction")
                .env("CORE_FRACTION")
                .help("Fraction of the available cores to use for a parallel search")
                .num_args(1)
                .default_value("1.0")
                .value_parser(clap::value_parser!(f32)),
        )
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("LOGFILE")
                .value_name("taksync.log")
                .help("Name of debug logfile")
                .num_args(1),
        )
        .get_matches();

    setup_logging(&matches)?;

    let size = matches.get_one::<u64>("size").copied().unwrap_or(5);
    let settings = search_settings(&matches);
    info!("Starting with size {} and {:?}", size, settings);

    println!("play: Play against the engine through the command line");
    println!("aimatch: Watch the engine play against itself");
    println!("perft <depth>: Count the move tree of the start position");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }
        match words[0] {
            "play" => dispatch_size(size, settings.clone(), Mode::Play)?,
            "aimatch" => dispatch_size(size, settings.clone(), Mode::AiMatch)?,
            "perft" => {
                let depth = words.get(1).and_then(|depth| depth.parse().ok()).unwrap_or(3);
                dispatch_size(size, settings.clone(), Mode::Perft(depth))?
            }
            "quit" | "exit" => break,
            s => println!("Unknown command \"{}\"", s),
        }
    }
    Ok(())
}

fn setup_logging(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Warn)
                    .chain(io::stderr()),
            )
            .apply()?
    } else {
        log_dispatcher
            .level(log::LevelFilter::Warn)
            .chain(io::stderr())
            .apply()?
    }
    Ok(())
}

fn search_settings(matches: &ArgMatches) -> SearchSettings {
    let mut settings = SearchSettings::default()
        .depth(matches.get_one::<u16>("depth").copied().unwrap_or(3))
        .seed(matches.get_one::<u64>("seed").copied().unwrap_or(0))
        .randomize(matches.get_flag("randomize"))
        .parallel(matches.get_flag("parallel"))
        .core_fraction(matches.get_one::<f32>("coreFraction").copied().unwrap_or(1.0));
    if let Some(move_time) = matches.get_one::<f32>("moveTime") {
        settings = settings.time_budget(Duration::from_secs_f32(move_time.max(0.0)));
    }
    settings
}

#[derive(Clone, Copy)]
enum Mode {
    Play,
    AiMatch,
    Perft(u16),
}

fn dispatch_size(size: u64, settings: SearchSettings, mode: Mode) -> io::Result<()> {
    match size {
        3 => run::<3>(settings, mode),
        4 => run::<4>(settings, mode),
        5 => run::<5>(settings, mode),
        6 => run::<6>(settings, mode),
        7 => run::<7>(settings, mode),
        8 => run::<8>(settings, mode),
        s => {
            println!("Unsupported size {}", s);
            Ok(())
        }
    }
}

fn run<const S: usize>(settings: SearchSettings, mode: Mode) -> io::Result<()> {
    match mode {
        Mode::Play => play_human::<S>(settings),
        Mode::AiMatch => {
            ai_match::<S>(settings);
            Ok(())
        }
        Mode::Perft(depth) => {
            perft::<S>(depth);
            Ok(())
        }
    }
}

fn perft<const S: usize>(max_depth: u16) {
    let mut position = <Position<S>>::start_position();
    for depth in 0..=max_depth {
        let start_time = Instant::now();
        let result = position.perft(depth);
        println!(
            "{}: {}, {:.2}s, {:.1} Mnps",
            depth,
            result,
            start_time.elapsed().as_secs_f32(),
            result as f32 / start_time.elapsed().as_micros().max(1) as f32
        );
    }
}

fn ai_match<const S: usize>(settings: SearchSettings) {
    let engine = MinimaxEngine::new(ValueEvaluator::default(), settings);
    let mut game = <Game<S>>::new();
    let cancellation = CancellationToken::new();

    while !game.is_over() {
        let start_time = Instant::now();
        let Some(search_info) = engine.search(game.position(), &cancellation) else {
            break;
        };
        println!(
            "{:6}: {:?}, depth {}, {:.2}s",
            search_info.best_move.to_string(),
            search_info.score,
            search_info.depth,
            start_time.elapsed().as_secs_f32()
        );
        if let Err(err) = game.play_move(game.side_to_move(), search_info.best_move) {
            warn!("Engine chose an illegal move: {}", err);
            break;
        }
    }

    for (ply, mv) in game.moves().iter().enumerate() {
        if ply % 2 == 0 {
            print!("{}. {} ", ply / 2 + 1, mv);
        } else {
            println!("{}", mv);
        }
    }
    println!();
    println!("\n{:?}\nResult: {:?}", game.position(), game.outcome());
}

/// The human plays black. Both sides' moves go through the two-phase protocol.
fn play_human<const S: usize>(settings: SearchSettings) -> io::Result<()> {
    let engine = MinimaxEngine::new(ValueEvaluator::default(), settings);
    let mut protocol = MoveProtocol::new(<Game<S>>::new());
    let cancellation = CancellationToken::new();
    let move_duration = Duration::from_secs(30);
    let stdin = io::stdin();

    while !protocol.game().is_over() {
        println!("Position:\n{:?}", protocol.game().position());
        let action = if protocol.game().side_to_move() == Color::Black {
            print!("Type your move (c3), \"undo\", \"redo\" or \"resign\": ");
            io::stdout().flush()?;
            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                return Ok(());
            }
            match input.trim() {
                "undo" => ProtocolAction::Undo,
                "redo" => ProtocolAction::Redo,
                "resign" => {
                    if let Err(err) = protocol.resign(Color::Black) {
                        println!("{}", err);
                    }
                    continue;
                }
                text => match Move::from_string(text) {
                    Ok(mv) => ProtocolAction::Move(mv),
                    Err(err) => {
                        println!("{}, try again.", err);
                        continue;
                    }
                },
            }
        } else {
            match engine.choose_next_move(protocol.game().position(), &cancellation) {
                Some(mv) => {
                    println!("Computer played {}", mv);
                    ProtocolAction::Move(mv)
                }
                None => break,
            }
        };

        let player = protocol.game().side_to_move();
        // Undoing takes back both the engine's move and the human's
        let repetitions = match action {
            ProtocolAction::Move(_) => 1,
            ProtocolAction::Undo | ProtocolAction::Redo => 2,
        };
        for _ in 0..repetitions {
            let mut result = protocol
                .initiate(player, action.clone(), move_duration)
                .map(|_| ());
            if result.is_ok() {
                result = protocol.complete(player, &action);
            }
            if let Err(err) = result {
                println!("{}", err);
                if protocol.pending().is_some() {
                    let _ = protocol.abort();
                }
                break;
            }
        }
    }

    let outcome = protocol.game().outcome();
    println!(
        "Game over: {:?}, winner {:?}, score {}. Board:\n{:?}",
        outcome.win_type,
        outcome.winner,
        outcome.score,
        protocol.game().position()
    );
    Ok(())
}
