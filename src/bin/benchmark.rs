use std::time::Duration;

use clap::Parser;
use mcts::monopoly::{MonopolyState, StrategyKind};
use mcts::{MctsConfig, SearchStats, MCTS};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Iterations per search (default: 5000)
    #[arg(long, default_value_t = 5000)]
    iterations: u32,

    /// Thread counts to compare, comma separated. 0 means one per logical CPU.
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2, 4, 0])]
    threads: Vec<usize>,

    /// Maximum actions per rollout (default: 200)
    #[arg(long, default_value_t = 200)]
    rollout_depth: u32,

    /// Seed for the benchmark position and the search.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Monopoly MCTS - Benchmark Tool");
    println!("==============================");
    println!("Iterations: {}", args.iterations);
    println!("Rollout depth: {}", args.rollout_depth);
    println!("Logical CPUs: {}", num_cpus::get());
    println!("------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
    let position = MonopolyState::standard(&[StrategyKind::Base, StrategyKind::Random], &mut rng)?;

    for &threads in &args.threads {
        let config = MctsConfig::default()
            .with_iterations(args.iterations)
            .with_max_rollout_depth(Some(args.rollout_depth))
            .with_threads(threads);
        let label = format!("{} thread(s)", config.num_threads);
        let mut engine = MCTS::new(position.clone(), config)?;
        let mut search_rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
        let outcome = engine.search(&mut search_rng);
        print_stats(&label, &outcome.stats);
    }
    Ok(())
}

fn print_stats(name: &str, stats: &SearchStats) {
    let secs = stats.elapsed.max(Duration::from_micros(1)).as_secs_f64();
    let ips = f64::from(stats.iterations) / secs;

    println!("{} Results:", name);
    println!("  Tree Nodes: {}", stats.tree_size);
    println!("  Time: {:.3}s", secs);
    println!("  IPS: {:.0} iterations/sec", ips);
    println!("  Root Visits: {}", stats.root_visits);
}
