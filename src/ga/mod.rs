//! Genetic algorithm for the N-Queens problem.
//!
//! Candidates are permutations (`candidate[col] == row`), so only diagonal
//! collisions need counting. Each generation breeds children from parents
//! chosen by stochastic universal sampling, then samples survivors from the
//! grown population the same way.
//!
//! # Key Types
//!
//! - [`QueensConfig`]: Algorithm parameters with builder and validation
//! - [`QueensRunner`]: Executes the evolutionary loop
//! - [`EvolutionState`]: Explicit per-run state, stepped by [`step`]
//! - [`QueensResult`]: Final best board with per-generation statistics
//! - [`Observer`]: Per-generation callback for renderers and loggers
//!
//! # Submodules
//!
//! - [`fitness`]: Diagonal-collision fitness
//! - [`selection`]: Stochastic universal sampling
//! - [`operators`]: Wrap-around crossover and gated swap mutation
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection Algorithm"

mod config;
pub mod fitness;
mod observer;
pub mod operators;
mod runner;
pub mod selection;
mod types;

pub use config::{derived_children_per_gen, QueensConfig};
pub use observer::{HistoryObserver, HistoryPoint, NoopObserver, TracingObserver};
pub use runner::{
    breed_generation, refill, select_survivors, step, EvolutionState, GenerationStats,
    QueensResult, QueensRunner,
};
pub use types::{Candidate, GenerationSnapshot, Observer, ObserverError};
