use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use u_queens::ga::fitness::colliding_columns;
use u_queens::ga::{derived_children_per_gen, QueensConfig, QueensRunner, TracingObserver};

#[derive(Parser)]
#[command(name = "u-queens", about = "Solve N-Queens with a genetic algorithm")]
struct Cli {
    /// Board size N (at least 4)
    #[arg(short, long, default_value = "64")]
    n: usize,
    /// Candidates kept between generations
    #[arg(long, default_value = "100")]
    population_size: usize,
    /// Generation cap
    #[arg(long, default_value = "10000")]
    num_generations: usize,
    /// Mutation gate: a child mutates when a uniform draw exceeds this value
    #[arg(long, default_value = "0.6")]
    mutation_rate: f64,
    /// Children bred per generation (default: 2 * floor(0.2 * population_size))
    #[arg(long)]
    children_per_gen: Option<usize>,
    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between generations in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Log progress every this many generations
    #[arg(long, default_value = "100")]
    log_every: usize,
    /// Do not print the final board
    #[arg(long)]
    quiet: bool,
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut config = QueensConfig::default()
        .with_board_size(cli.n)
        .with_population_size(cli.population_size)
        .with_num_generations(cli.num_generations)
        .with_mutation_rate(cli.mutation_rate)
        .with_children_per_gen(
            cli.children_per_gen
                .unwrap_or_else(|| derived_children_per_gen(cli.population_size)),
        );
    config.seed = cli.seed;
    config.generation_delay_ms = cli.delay_ms;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nCtrl+C received, finishing current generation...");
        stop_handler.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %err, "could not install Ctrl+C handler");
    }

    let mut observer = TracingObserver::new()
        .every(cli.log_every)
        .with_stop_flag(stop);

    let result = QueensRunner::run(&config, &mut observer)?;

    println!(
        "generations: {}  collisions: {}  solved: {}  cancelled: {}",
        result.generations, result.best_collisions, result.solved, result.cancelled
    );
    if !cli.quiet {
        print!("{}", render_board(&result.best));
    }
    Ok(())
}

/// Text board: `Q` for a safe queen, `X` for one under attack.
fn render_board(candidate: &[usize]) -> String {
    let n = candidate.len();
    let attacked = colliding_columns(candidate);
    let mut out = String::with_capacity(n * (n + 1));
    for row in 0..n {
        for (col, &queen_row) in candidate.iter().enumerate() {
            out.push(if queen_row != row {
                '.'
            } else if attacked.contains(&col) {
                'X'
            } else {
                'Q'
            });
        }
        out.push('\n');
    }
    out
}
