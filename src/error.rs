//! Error types.
//!
//! Every failure the solver can report happens before the first generation:
//! a configuration that the evolutionary loop cannot honor. Once a run has
//! started it always produces a [`QueensResult`](crate::ga::QueensResult).

use thiserror::Error;

/// Smallest board the wrap-around crossover can handle.
///
/// The copied segment must span `[2, n - 2]` positions, which is empty
/// for `n < 4`.
pub const MIN_BOARD_SIZE: usize = 4;

/// A parameter that the evolutionary loop cannot run with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board size {0} is below the minimum of 4")]
    BoardTooSmall(usize),
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("num_generations must be at least 1")]
    ZeroGenerations,
    #[error("mutation_rate must lie in [0, 1], got {0}")]
    MutationRateOutOfRange(f64),
    #[error("children_per_gen must be a positive even number, got {0}")]
    OddOrZeroChildren(usize),
    #[error("children_per_gen {children} exceeds population_size {population}")]
    ChildrenExceedPopulation { children: usize, population: usize },
    #[error("generation_delay_ms must be positive or None")]
    ZeroDelay,
}

/// Top-level error for the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueensError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, QueensError>;
