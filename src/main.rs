use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use puzzle_2048::config::Config;
use puzzle_2048::engine::{Direction, MergeRule};
use puzzle_2048::game::SessionSnapshot;
use puzzle_2048::input::{self, Command};
use puzzle_2048::session::Session;
use puzzle_2048::store::{JsonFileStore, MemoryStore, SnapshotStore};

#[derive(Parser, Debug)]
#[command(name = "puzzle-2048", version, about = "Play the 2048 sliding-tile puzzle in a terminal")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// JSON file the game is saved to after every turn (overrides config)
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,
    /// Seed for tile spawns (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// Merge rule: cascade or single (overrides config)
    #[arg(long, value_name = "RULE")]
    merge: Option<MergeRule>,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Play interactively: arrows names, wasd or hjkl, then Enter; n = new game, q = quit
    Play,
    /// Play random moves until the game ends
    Auto {
        /// Stop after this many moves even if the game is not over
        #[arg(long, default_value_t = 100_000)]
        moves: u64,
    },
    /// Print the saved game without playing
    Show,
}

type DynSession = Session<Box<dyn SnapshotStore>>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if cli.state.is_some() {
        config.state_file = cli.state.clone();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(merge) = cli.merge {
        config.rules.merge = merge;
    }
    info!("config: {config:?}");

    let mut store: Box<dyn SnapshotStore> = match &config.state_file {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    if let Some(Cmd::Show) = cli.cmd {
        match store.load().context("reading saved game")? {
            Some(snapshot) => print_snapshot(&snapshot),
            None => println!("No saved game."),
        }
        return Ok(());
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = Session::start(store, rng, config.rules).context("saving new game")?;

    match cli.cmd {
        Some(Cmd::Auto { moves }) => autoplay(session, moves),
        _ => play(session),
    }
}

fn play(mut session: DynSession) -> Result<()> {
    print_snapshot(&session.snapshot());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        for key in line.split_whitespace() {
            let snapshot = match input::command_for_key(key) {
                Some(Command::Move(direction)) => session.apply_direction(direction)?,
                Some(Command::NewGame) => session.new_game()?,
                Some(Command::Quit) => return Ok(()),
                None => continue,
            };
            print_snapshot(&snapshot);
        }
        io::stdout().flush()?;
    }
    Ok(())
}

fn autoplay(mut session: DynSession, max_moves: u64) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut move_count = 0u64;
    while !session.game().is_over() && move_count < max_moves {
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        session.apply_direction(direction)?;
        move_count += 1;
    }
    let game = session.game();
    println!("{}", game.board());
    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, Over: {}",
        move_count,
        game.score(),
        game.board().highest_tile(),
        game.is_over()
    );
    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("{}", snapshot.board);
    println!("Score: {}", snapshot.score);
    if snapshot.over {
        println!(
            "Game over! Final score: {}. Enter n for a new game or q to quit.",
            snapshot.score
        );
    }
}
