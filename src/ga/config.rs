//! Solver configuration.
//!
//! [`QueensConfig`] holds every parameter that controls the evolutionary
//! loop. All values are fixed for the lifetime of a run.

use crate::error::{ConfigError, MIN_BOARD_SIZE};

/// Default number of children bred per generation for a population size.
///
/// `2 * floor(0.2 * population_size)`: twenty percent of the population,
/// rounded down to an even count.
pub fn derived_children_per_gen(population_size: usize) -> usize {
    2 * (population_size / 5)
}

/// Configuration for the N-Queens genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_queens::ga::QueensConfig;
///
/// let config = QueensConfig::default();
/// assert_eq!(config.board_size, 64);
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.children_per_gen, 40);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_queens::ga::QueensConfig;
///
/// let config = QueensConfig::default()
///     .with_board_size(8)
///     .with_population_size(50)
///     .with_children_per_gen(20)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueensConfig {
    /// Board side length N. Must be at least 4.
    pub board_size: usize,

    /// Target number of candidates kept between generations.
    pub population_size: usize,

    /// Generation cap.
    pub num_generations: usize,

    /// Mutation gate threshold in `[0, 1]`.
    ///
    /// A child is mutated when a uniform draw EXCEEDS this value, so the
    /// effective mutation probability is `1 - mutation_rate`.
    pub mutation_rate: f64,

    /// Children bred per generation. Must be even.
    pub children_per_gen: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional pause between generations in milliseconds.
    ///
    /// Gives a live observer time to draw. `None` runs flat out.
    pub generation_delay_ms: Option<u64>,
}

impl Default for QueensConfig {
    fn default() -> Self {
        let population_size = 100;
        Self {
            board_size: 64,
            population_size,
            num_generations: 10_000,
            mutation_rate: 0.6,
            children_per_gen: derived_children_per_gen(population_size),
            seed: None,
            generation_delay_ms: None,
        }
    }
}

impl QueensConfig {
    /// Sets the board size N.
    pub fn with_board_size(mut self, n: usize) -> Self {
        self.board_size = n;
        self
    }

    /// Sets the population size.
    ///
    /// Does not touch `children_per_gen`; call
    /// [`with_derived_children`](Self::with_derived_children) to recompute it.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation cap.
    pub fn with_num_generations(mut self, n: usize) -> Self {
        self.num_generations = n;
        self
    }

    /// Sets the mutation gate threshold.
    ///
    /// Not clamped: out-of-range values are rejected by [`validate`](Self::validate).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the number of children bred per generation.
    pub fn with_children_per_gen(mut self, n: usize) -> Self {
        self.children_per_gen = n;
        self
    }

    /// Recomputes `children_per_gen` from the current population size.
    pub fn with_derived_children(mut self) -> Self {
        self.children_per_gen = derived_children_per_gen(self.population_size);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the pause between generations in milliseconds.
    pub fn with_generation_delay_ms(mut self, ms: u64) -> Self {
        self.generation_delay_ms = Some(ms);
        self
    }

    /// Fitness of a collision-free board, `N²`.
    pub fn target_fitness(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall(self.board_size));
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.num_generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange(self.mutation_rate));
        }
        if self.children_per_gen == 0 || self.children_per_gen % 2 != 0 {
            return Err(ConfigError::OddOrZeroChildren(self.children_per_gen));
        }
        if self.children_per_gen > self.population_size {
            return Err(ConfigError::ChildrenExceedPopulation {
                children: self.children_per_gen,
                population: self.population_size,
            });
        }
        if self.generation_delay_ms == Some(0) {
            return Err(ConfigError::ZeroDelay);
        }
        Ok(())
    }
}
