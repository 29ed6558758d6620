//! Core type definitions for the solver.
//!
//! A [`Candidate`] is the permutation encoding of a board; an [`Observer`]
//! is the only channel through which a run talks to the outside world.

/// One queen per column: `candidate[col] == row`.
///
/// Always a permutation of `0..N`, so no two queens share a row.
pub type Candidate = Vec<usize>;

/// Error type an observer may return.
///
/// Observer failures are logged by the runner and never abort a run.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only view of one finished generation, handed to an [`Observer`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationSnapshot<'a> {
    /// Generation number, starting at 1.
    pub generation: usize,

    /// Best candidate of the post-breeding population.
    pub best: &'a [usize],

    /// Fitness of `best`.
    pub best_fitness: usize,

    /// Collisions of `best` (`N² - best_fitness`).
    pub best_collisions: usize,

    /// Mean fitness over the post-breeding population.
    pub mean_fitness: f64,

    /// Mean collisions over the post-breeding population.
    pub mean_collisions: f64,
}

/// Receives one snapshot per generation.
///
/// Renderers, plotters, and loggers implement this trait. They cannot
/// change the population; the most they can do is ask the run to stop,
/// which takes effect before the next generation starts.
///
/// # Implementing
///
/// ```
/// use u_queens::ga::{GenerationSnapshot, Observer, ObserverError};
///
/// struct StopWhenClose {
///     done: bool,
/// }
///
/// impl Observer for StopWhenClose {
///     fn on_generation(&mut self, snap: &GenerationSnapshot<'_>) -> Result<(), ObserverError> {
///         self.done = snap.best_collisions <= 2;
///         Ok(())
///     }
///
///     fn should_stop(&self) -> bool {
///         self.done
///     }
/// }
/// ```
pub trait Observer {
    /// Called once at the end of every generation.
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<(), ObserverError>;

    /// Polled between generations. Returning `true` ends the run.
    ///
    /// The default never asks to stop.
    fn should_stop(&self) -> bool {
        false
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<(), ObserverError> {
        (**self).on_generation(snapshot)
    }

    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}
