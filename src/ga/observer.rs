//! Built-in observers.
//!
//! - [`NoopObserver`]: ignores every snapshot
//! - [`TracingObserver`]: logs progress through `tracing`
//! - [`HistoryObserver`]: records the convergence curve

use super::types::{GenerationSnapshot, Observer, ObserverError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_generation(&mut self, _snapshot: &GenerationSnapshot<'_>) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Logs best and mean collisions every `every` generations at `info` level.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    every: usize,
    stop: Option<Arc<AtomicBool>>,
}

impl TracingObserver {
    /// Logs every generation.
    pub fn new() -> Self {
        Self {
            every: 1,
            stop: None,
        }
    }

    /// Logs every `every`-th generation (at least every one).
    pub fn every(mut self, every: usize) -> Self {
        self.every = every.max(1);
        self
    }

    /// Stops the run once `flag` is set, e.g. from a Ctrl-C handler or a
    /// window-close event.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for TracingObserver {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<(), ObserverError> {
        if snapshot.generation % self.every == 0 || snapshot.best_collisions == 0 {
            tracing::info!(
                generation = snapshot.generation,
                best_collisions = snapshot.best_collisions,
                mean_collisions = snapshot.mean_collisions,
                "generation finished"
            );
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// One point of the convergence curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryPoint {
    /// Generation number, starting at 1.
    pub generation: usize,

    /// Collisions of the generation's best candidate.
    pub best_collisions: usize,

    /// Mean collisions over the post-breeding population.
    pub mean_collisions: f64,
}

/// Records `(generation, best collisions, mean collisions)` per generation,
/// the data a convergence plot draws.
#[derive(Debug, Clone, Default)]
pub struct HistoryObserver {
    points: Vec<HistoryPoint>,
}

impl HistoryObserver {
    /// Creates an observer with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points recorded so far, one per generation in order.
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    /// Consumes the observer and returns the recorded points.
    pub fn into_points(self) -> Vec<HistoryPoint> {
        self.points
    }
}

impl Observer for HistoryObserver {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) -> Result<(), ObserverError> {
        self.points.push(HistoryPoint {
            generation: snapshot.generation,
            best_collisions: snapshot.best_collisions,
            mean_collisions: snapshot.mean_collisions,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(generation: usize, best: &[usize]) -> GenerationSnapshot<'_> {
        GenerationSnapshot {
            generation,
            best,
            best_fitness: 14,
            best_collisions: 2,
            mean_fitness: 11.5,
            mean_collisions: 4.5,
        }
    }

    #[test]
    fn test_history_records_points() {
        let board = [0, 2, 1, 3];
        let mut history = HistoryObserver::new();
        history.on_generation(&snapshot(1, &board)).unwrap();
        history.on_generation(&snapshot(2, &board)).unwrap();
        assert_eq!(history.points().len(), 2);
        assert_eq!(
            history.points()[1],
            HistoryPoint {
                generation: 2,
                best_collisions: 2,
                mean_collisions: 4.5,
            }
        );
        assert!(!history.should_stop());
    }

    #[test]
    fn test_tracing_observer_stop_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut observer = TracingObserver::new().every(10).with_stop_flag(flag.clone());
        observer.on_generation(&snapshot(3, &[1, 3, 0, 2])).unwrap();
        assert!(!observer.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(observer.should_stop());
    }

    #[test]
    fn test_tracing_observer_every_floor() {
        let observer = TracingObserver::new().every(0);
        assert_eq!(observer.every, 1);
    }
}
