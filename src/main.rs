//! # Monopoly MCTS player
//!
//! Plays one game of Monopoly with the search controlling seat 0 against strategy-driven
//! opponents, then prints a summary. With `--baseline` the controlled seat follows the base
//! strategy instead, which gives a reference reward for the same opponents and seed.
//!
//! ## Usage
//! Run with `cargo run --release --bin play -- --opponents base,random --iterations 2000`.
//! Set `RUST_LOG=mcts=debug` to follow every turn.

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

use mcts::monopoly::{play_game, Action, Board, Greedy, MonopolyState, StrategyKind};
use mcts::search::{RolloutPolicy, UniformRandom};
use mcts::{GameSummary, MctsConfig, SearchError, MCTS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Opponent strategies, one per seat after the controlled player.
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![StrategyKind::Base, StrategyKind::Random])]
    opponents: Vec<StrategyKind>,

    /// Search iterations per committed action.
    #[arg(short, long, default_value_t = 1000)]
    iterations: u32,

    /// UCB1 exploration constant.
    #[arg(short = 'e', long, default_value_t = std::f64::consts::SQRT_2)]
    exploration: f64,

    /// Maximum actions per rollout. 0 plays rollouts to the end of the game.
    #[arg(short = 'd', long, default_value_t = 1000)]
    rollout_depth: u32,

    /// Wall-clock budget per search in milliseconds. 0 means no limit.
    #[arg(long, default_value_t = 0)]
    time_limit_ms: u64,

    /// Search threads. 0 uses every logical CPU.
    #[arg(short = 'n', long, default_value_t = 1)]
    num_threads: usize,

    /// Seed for dice, decks and the search.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many committed actions.
    #[arg(long, default_value_t = 500)]
    max_actions: usize,

    /// Stop after this many rounds.
    #[arg(long, default_value_t = 100)]
    max_rounds: u32,

    /// Use the greedy rollout policy instead of uniform random rollouts.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    greedy: bool,

    /// Play the controlled seat with the base strategy instead of the search.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    baseline: bool,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
    info!(opponents = ?args.opponents, seed = args.seed, "starting game");

    if args.baseline {
        let board = std::sync::Arc::new(Board::standard()?);
        let mut state = MonopolyState::new(board, StrategyKind::Base, &args.opponents, &mut rng)?;
        let outcome = play_game(&mut state, args.max_rounds, &mut rng);
        println!("{}", "Baseline (strategy-only) game".bold());
        println!("  Rounds:    {}", outcome.rounds);
        println!("  Survivors: {}", outcome.survivors.len());
        for (seat, wealth) in outcome.wealth.iter().enumerate() {
            println!("  Seat {seat} wealth: {wealth}");
        }
        print_reward(outcome.reward);
        return Ok(());
    }

    let mut config = MctsConfig::default()
        .with_iterations(args.iterations)
        .with_exploration(args.exploration)
        .with_max_rollout_depth((args.rollout_depth > 0).then_some(args.rollout_depth))
        .with_threads(args.num_threads)
        .with_seed(args.seed);
    if args.time_limit_ms > 0 {
        config = config.with_time_limit(Duration::from_millis(args.time_limit_ms));
    }

    let state = MonopolyState::standard(&args.opponents, &mut rng)?;
    let summary = if args.greedy {
        run(state, config, Greedy::default(), &args, &mut rng)?
    } else {
        run(state, config, UniformRandom, &args, &mut rng)?
    };

    println!("{}", "MCTS game".bold());
    println!("  Actions committed: {}", summary.actions.len());
    println!("  Rounds:            {}", summary.rounds);
    println!(
        "  Finished:          {}",
        if summary.terminal { "yes".green() } else { "no (cap reached)".yellow() }
    );
    print_reward(summary.reward);
    Ok(())
}

fn run<P: RolloutPolicy<MonopolyState>>(
    state: MonopolyState,
    config: MctsConfig,
    policy: P,
    args: &Args,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<GameSummary<Action>, SearchError> {
    let mut engine = MCTS::with_policy(state, config, policy)?;
    Ok(engine.run_game(args.max_actions, args.max_rounds, rng))
}

fn print_reward(reward: f64) {
    let text = format!("{reward:.3}");
    let shown = if reward >= 1.0 { text.green() } else { text.red() };
    println!("  Reward:            {shown}");
}
