use bear_hunt::{Bear, Game, GameConfig, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Runs a bear hunt and, if enough bears survive, a second hunt with their children.
#[derive(Parser, Debug)]
#[command(name = "bear_hunt")]
#[command(about = "Bears roaming a wrapping board, eating honey and fighting each other")]
struct Args {
    /// JSON file with the game configuration. Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Length of a side of the board
    #[arg(long)]
    size: Option<usize>,

    /// Number of bears in the first game
    #[arg(long, default_value_t = 20)]
    bears: usize,

    /// Number of rounds in the first game
    #[arg(long, default_value_t = 1000)]
    rounds: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Length of a side of the board for the next generation
    #[arg(long, default_value_t = 3)]
    next_size: usize,

    /// Number of rounds for the next generation
    #[arg(long, default_value_t = 400)]
    next_rounds: usize,

    /// Keep playing until the last round even if one bear or none is left
    #[arg(long)]
    play_all_rounds: bool,

    /// File to save the replay of the first game to
    #[arg(long)]
    replay: Option<String>,

    /// Draw the board in colour instead of plain text
    #[arg(long)]
    draw: bool,
}

fn main() {
    init_tracing();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(size) = args.size {
        config.board_size = size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.replay.is_some() {
        config.replay_filename = args.replay.clone();
    }
    if args.play_all_rounds {
        config.stop_when_settled = false;
    }

    let mut game = Game::new(config.clone())?;
    let bears = game.random_bears(args.bears);
    print_bears(&bears);

    game.generate_world(bears)?;
    show(&game, args.draw)?;
    game.play(args.rounds)?;
    show(&game, args.draw)?;
    print_bears(game.survivors());

    let Some(children) = game.breed_next_generation() else {
        info!(
            survivors = game.survivors().len(),
            "Not enough survivors for a next generation"
        );
        return Ok(());
    };

    println!("Next generation game:");
    let next_config = GameConfig {
        board_size: args.next_size,
        seed: config.seed.map(|seed| seed.wrapping_add(1)),
        replay_filename: None,
        ..config
    };
    let mut game = Game::new(next_config)?;
    if let Err(e) = game.generate_world(children) {
        warn!(error = %e, "Could not place the next generation");
        return Err(e);
    }
    show(&game, args.draw)?;
    game.play(args.next_rounds)?;
    show(&game, args.draw)?;
    print_bears(game.survivors());

    Ok(())
}

fn show(game: &Game, draw: bool) -> Result<()> {
    if draw {
        game.draw()?;
        println!();
    } else {
        game.print_world();
    }
    Ok(())
}

fn print_bears(bears: &[Bear]) {
    for bear in bears {
        println!("{}", bear);
    }
}
