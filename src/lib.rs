//! N-Queens solver built on a permutation-encoded genetic algorithm.
//!
//! A board of side N is encoded as a permutation of `0..N` giving the row of
//! the queen in each column. Fitness is `N²` minus the number of ordered
//! queen pairs sharing a diagonal, so a perfect board scores exactly `N²`.
//!
//! - [`ga`]: configuration, operators, selection, and the evolutionary loop
//! - [`random`]: seeded random source
//! - [`error`]: configuration errors
//!
//! ```
//! use u_queens::ga::{NoopObserver, QueensConfig, QueensRunner};
//!
//! let config = QueensConfig::default()
//!     .with_board_size(4)
//!     .with_population_size(10)
//!     .with_children_per_gen(4)
//!     .with_num_generations(200)
//!     .with_seed(1);
//! let result = QueensRunner::run(&config, &mut NoopObserver)?;
//! println!("collisions: {}", result.best_collisions);
//! # Ok::<(), u_queens::QueensError>(())
//! ```

pub mod error;
pub mod ga;
pub mod random;

pub use error::{ConfigError, QueensError, Result};
