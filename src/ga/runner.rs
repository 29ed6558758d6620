//! Evolutionary loop execution.
//!
//! [`QueensRunner`] drives a run generation by generation:
//! evaluate → select parents → breed → evaluate → select survivors → refill.
//!
//! The whole run state lives in an [`EvolutionState`], so independent runs
//! never share anything and [`step`] can be driven by hand.

use super::config::QueensConfig;
use super::fitness::{best_index, evaluate_population, max_fitness, mean, normalize};
use super::operators::breed_pair;
use super::selection::stochastic_universal;
use super::types::{Candidate, GenerationSnapshot, Observer};
use crate::error::Result;
use crate::random::{random_permutation, rng_from_seed};
use rand::seq::index;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Statistics of one finished generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation number, starting at 1.
    pub generation: usize,

    /// Best fitness of the post-breeding population.
    pub best_fitness: usize,

    /// Collisions of the best candidate.
    pub best_collisions: usize,

    /// Mean fitness of the post-breeding population.
    pub mean_fitness: f64,

    /// Mean collisions of the post-breeding population.
    pub mean_collisions: f64,

    /// Size of the post-breeding population that was evaluated.
    pub evaluated: usize,

    /// Survivors returned by selection, before refilling with the best.
    ///
    /// Below `population_size` when sampling undershoots.
    pub survivors: usize,
}

/// Result of a run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueensResult {
    /// Best candidate seen during the whole run.
    pub best: Candidate,

    /// Fitness of `best`.
    pub best_fitness: usize,

    /// Collisions of `best`; zero when solved.
    pub best_collisions: usize,

    /// Generations executed.
    pub generations: usize,

    /// Whether a collision-free board was found.
    pub solved: bool,

    /// Whether the run was stopped by an observer or the cancel flag.
    pub cancelled: bool,

    /// Statistics for every executed generation.
    pub history: Vec<GenerationStats>,
}

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct EvolutionState {
    /// Current population. Holds `population_size` candidates between
    /// generations.
    pub population: Vec<Candidate>,

    /// Generations completed so far.
    pub generation: usize,

    /// Best candidate of the latest evaluation.
    pub best: Candidate,

    /// Fitness of `best`.
    pub best_fitness: usize,

    /// Mean fitness of the latest evaluation.
    pub mean_fitness: f64,

    /// Best candidate across all generations.
    pub best_ever: Candidate,

    /// Fitness of `best_ever`.
    pub best_ever_fitness: usize,

    board_size: usize,
}

impl EvolutionState {
    /// Creates `population_size` random permutations and scores them.
    pub fn new<R: Rng>(config: &QueensConfig, rng: &mut R) -> Self {
        let population: Vec<Candidate> = (0..config.population_size)
            .map(|_| random_permutation(config.board_size, rng))
            .collect();
        Self::from_population(config.board_size, population)
    }

    /// Wraps an existing population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn from_population(board_size: usize, population: Vec<Candidate>) -> Self {
        let fitness = evaluate_population(&population);
        let best_idx = best_index(&fitness);
        let best = population[best_idx].clone();
        Self {
            best_ever: best.clone(),
            best_ever_fitness: fitness[best_idx],
            best,
            best_fitness: fitness[best_idx],
            mean_fitness: mean(&fitness),
            population,
            generation: 0,
            board_size,
        }
    }

    /// Whether the latest best candidate is collision-free.
    pub fn is_solved(&self) -> bool {
        self.best_fitness == max_fitness(self.board_size)
    }

    fn snapshot(&self) -> GenerationSnapshot<'_> {
        let target = max_fitness(self.board_size);
        GenerationSnapshot {
            generation: self.generation,
            best: &self.best,
            best_fitness: self.best_fitness,
            best_collisions: target - self.best_fitness,
            mean_fitness: self.mean_fitness,
            mean_collisions: target as f64 - self.mean_fitness,
        }
    }
}

/// Selects parents from the current population and appends
/// `children_per_gen` children to it.
///
/// Skips breeding (with a warning) when selection yields fewer than two
/// parents.
pub fn breed_generation<R: Rng>(
    config: &QueensConfig,
    state: &mut EvolutionState,
    rng: &mut R,
) -> Result<()> {
    let fitness = evaluate_population(&state.population);
    let mut parents = stochastic_universal(&normalize(&fitness), config.children_per_gen, rng);
    if parents.len() % 2 == 1 {
        parents.pop();
    }
    if parents.len() < 2 {
        tracing::warn!(
            generation = state.generation + 1,
            parents = parents.len(),
            "not enough parents selected, skipping breeding"
        );
        return Ok(());
    }

    let mut children = Vec::with_capacity(config.children_per_gen);
    while children.len() < config.children_per_gen {
        let pair = index::sample(rng, parents.len(), 2);
        let p1 = &state.population[parents[pair.index(0)]];
        let p2 = &state.population[parents[pair.index(1)]];
        let (c1, c2) = breed_pair(p1, p2, config.mutation_rate, rng)?;
        children.push(c1);
        children.push(c2);
    }

    state.population.extend(children);
    Ok(())
}

/// Samples `target` survivors from `population` by stochastic universal
/// sampling over `probabilities`, then pads any shortfall with `best`.
///
/// Returns the next population and the number of sampled survivors
/// before padding.
pub fn select_survivors<R: Rng>(
    population: &[Candidate],
    probabilities: &[f64],
    best: &[usize],
    target: usize,
    rng: &mut R,
) -> (Vec<Candidate>, usize) {
    let mut next: Vec<Candidate> = stochastic_universal(probabilities, target, rng)
        .into_iter()
        .map(|i| population[i].clone())
        .collect();
    let sampled = next.len();
    if sampled < target {
        tracing::debug!(
            selected = sampled,
            requested = target,
            "survivor selection undershot, refilling with best"
        );
    }
    refill(&mut next, best, target);
    (next, sampled)
}

/// Pads `population` with copies of `best` until it holds `target`
/// candidates.
pub fn refill(population: &mut Vec<Candidate>, best: &[usize], target: usize) {
    while population.len() < target {
        population.push(best.to_vec());
    }
}

/// Runs one full generation and returns its statistics.
pub fn step<R: Rng>(
    config: &QueensConfig,
    state: &mut EvolutionState,
    rng: &mut R,
) -> Result<GenerationStats> {
    breed_generation(config, state, rng)?;

    let fitness = evaluate_population(&state.population);
    let best_idx = best_index(&fitness);
    state.best = state.population[best_idx].clone();
    state.best_fitness = fitness[best_idx];
    state.mean_fitness = mean(&fitness);
    if state.best_fitness > state.best_ever_fitness {
        state.best_ever = state.best.clone();
        state.best_ever_fitness = state.best_fitness;
    }

    let evaluated = state.population.len();
    let (next, survivor_count) = select_survivors(
        &state.population,
        &normalize(&fitness),
        &state.best,
        config.population_size,
        rng,
    );
    state.population = next;
    state.generation += 1;

    let target = config.target_fitness();
    Ok(GenerationStats {
        generation: state.generation,
        best_fitness: state.best_fitness,
        best_collisions: target - state.best_fitness,
        mean_fitness: state.mean_fitness,
        mean_collisions: target as f64 - state.mean_fitness,
        evaluated,
        survivors: survivor_count,
    })
}

/// Executes the evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_queens::ga::{NoopObserver, QueensConfig, QueensRunner};
///
/// let config = QueensConfig::default()
///     .with_board_size(6)
///     .with_population_size(20)
///     .with_children_per_gen(8)
///     .with_num_generations(50)
///     .with_seed(42);
/// let result = QueensRunner::run(&config, &mut NoopObserver).unwrap();
/// assert!(result.generations <= 50);
/// ```
pub struct QueensRunner;

impl QueensRunner {
    /// Runs the solver, reporting each generation to `observer`.
    ///
    /// # Errors
    /// Returns [`QueensError::InvalidConfiguration`](crate::QueensError::InvalidConfiguration)
    /// before any work is done if `config` does not validate.
    pub fn run<O: Observer>(config: &QueensConfig, observer: &mut O) -> Result<QueensResult> {
        Self::run_with_cancel(config, observer, None)
    }

    /// Runs the solver with an optional cancellation token.
    ///
    /// If `cancel` is set to `true`, or the observer asks to stop, the run
    /// ends before the next generation starts and returns the best
    /// candidate found so far.
    pub fn run_with_cancel<O: Observer>(
        config: &QueensConfig,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<QueensResult> {
        config.validate()?;

        let mut rng = rng_from_seed(config.seed);
        let mut state = EvolutionState::new(config, &mut rng);
        let mut history = Vec::with_capacity(config.num_generations.min(1024));
        let mut cancelled = false;

        tracing::info!(
            board_size = config.board_size,
            population_size = config.population_size,
            num_generations = config.num_generations,
            seed = ?config.seed,
            "starting evolution"
        );

        while state.generation < config.num_generations && !state.is_solved() {
            let stop_requested = cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed));
            if stop_requested || observer.should_stop() {
                cancelled = true;
                break;
            }

            let stats = step(config, &mut state, &mut rng)?;
            tracing::debug!(
                generation = stats.generation,
                best_collisions = stats.best_collisions,
                mean_collisions = stats.mean_collisions,
                survivors = stats.survivors,
                "generation complete"
            );
            history.push(stats);

            if let Err(err) = observer.on_generation(&state.snapshot()) {
                tracing::warn!(generation = state.generation, error = %err, "observer failed");
            }

            if let Some(ms) = config.generation_delay_ms {
                std::thread::sleep(Duration::from_millis(ms));
            }
        }

        let target = config.target_fitness();
        let result = QueensResult {
            best_collisions: target - state.best_ever_fitness,
            best_fitness: state.best_ever_fitness,
            solved: state.best_ever_fitness == target,
            best: state.best_ever,
            generations: state.generation,
            cancelled,
            history,
        };

        tracing::info!(
            generations = result.generations,
            best_collisions = result.best_collisions,
            solved = result.solved,
            cancelled = result.cancelled,
            "evolution finished"
        );

        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, QueensError};
    use crate::ga::fitness::collisions;
    use crate::ga::observer::{HistoryObserver, NoopObserver};
    use crate::ga::types::ObserverError;
    use crate::random::create_rng;
    use std::collections::HashSet;

    fn small_config() -> QueensConfig {
        QueensConfig::default()
            .with_board_size(8)
            .with_population_size(30)
            .with_children_per_gen(12)
            .with_num_generations(40)
            .with_seed(42)
    }

    fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
        let set: HashSet<usize> = perm.iter().copied().collect();
        perm.len() == n && set.len() == n && perm.iter().all(|&v| v < n)
    }

    #[test]
    fn test_solves_n4() {
        let config = QueensConfig::default()
            .with_board_size(4)
            .with_population_size(10)
            .with_children_per_gen(4)
            .with_num_generations(200)
            .with_seed(42);

        let result = QueensRunner::run(&config, &mut NoopObserver).unwrap();

        assert!(result.generations <= 200);
        assert!(result.solved, "expected a solution for N=4, got {result:?}");
        assert_eq!(result.best_fitness, 16);
        assert_eq!(result.best_collisions, 0);
        assert_eq!(collisions(&result.best), 0);
    }

    #[test]
    fn test_rejects_small_board() {
        let config = QueensConfig::default()
            .with_board_size(3)
            .with_population_size(10)
            .with_children_per_gen(4);
        let err = QueensRunner::run(&config, &mut NoopObserver).unwrap_err();
        assert_eq!(err, QueensError::InvalidConfiguration(ConfigError::BoardTooSmall(3)));
    }

    #[test]
    fn test_step_keeps_population_size() {
        let config = small_config();
        let mut rng = create_rng(42);
        let mut state = EvolutionState::new(&config, &mut rng);

        for _ in 0..20 {
            let stats = step(&config, &mut state, &mut rng).unwrap();
            assert_eq!(stats.evaluated, config.population_size + config.children_per_gen);
            assert!(stats.survivors <= config.population_size);
            assert_eq!(state.population.len(), config.population_size);
            for c in &state.population {
                assert!(is_valid_permutation(c, config.board_size));
            }
        }
        assert_eq!(state.generation, 20);
    }

    #[test]
    fn test_breed_generation_grows_population() {
        let config = small_config();
        let mut rng = create_rng(7);
        let mut state = EvolutionState::new(&config, &mut rng);
        breed_generation(&config, &mut state, &mut rng).unwrap();
        assert_eq!(
            state.population.len(),
            config.population_size + config.children_per_gen
        );
    }

    #[test]
    fn test_mean_is_over_grown_population() {
        let config = small_config();
        let mut rng = create_rng(99);
        let state = EvolutionState::new(&config, &mut rng);

        // Replay the breeding phase with an identical generator.
        let mut replay_state = state.clone();
        let mut replay_rng = rng.clone();
        breed_generation(&config, &mut replay_state, &mut replay_rng).unwrap();
        let grown = evaluate_population(&replay_state.population);
        let expected_mean = grown.iter().sum::<usize>() as f64 / grown.len() as f64;
        let pre_breeding = evaluate_population(&state.population);

        let mut live_state = state;
        let stats = step(&config, &mut live_state, &mut rng).unwrap();

        assert_eq!(grown.len(), stats.evaluated);
        assert!((stats.mean_fitness - expected_mean).abs() < 1e-12);
        assert!(
            (stats.mean_collisions - (config.target_fitness() as f64 - expected_mean)).abs()
                < 1e-12
        );
        assert_eq!(stats.best_fitness, *grown.iter().max().unwrap());
        assert_eq!(pre_breeding.len(), config.population_size);
    }

    #[test]
    fn test_refill_pads_tail_with_best() {
        let best = vec![1, 3, 0, 2];
        let mut population = vec![vec![0, 1, 2, 3], vec![3, 2, 1, 0]];
        refill(&mut population, &best, 6);

        assert_eq!(population.len(), 6);
        assert_eq!(population[0], vec![0, 1, 2, 3]);
        assert_eq!(population[1], vec![3, 2, 1, 0]);
        for candidate in &population[2..] {
            assert_eq!(candidate, &best);
        }
    }

    #[test]
    fn test_refill_leaves_full_population_alone() {
        let mut population = vec![vec![0, 1, 2, 3]; 4];
        refill(&mut population, &[1, 3, 0, 2], 4);
        assert_eq!(population, vec![vec![0, 1, 2, 3]; 4]);
    }

    #[test]
    fn test_survivor_undershoot_is_refilled_with_best() {
        // Half the probability mass is missing, so only two of four
        // pointers land on a candidate.
        let population = vec![
            vec![0, 1, 2, 3],
            vec![3, 2, 1, 0],
            vec![0, 2, 1, 3],
            vec![2, 0, 3, 1],
        ];
        let best = vec![2, 0, 3, 1];
        let probabilities = [0.25, 0.25, 0.0, 0.0];
        let mut rng = create_rng(5);

        for _ in 0..50 {
            let (next, sampled) =
                select_survivors(&population, &probabilities, &best, 4, &mut rng);
            assert_eq!(sampled, 2);
            assert_eq!(next.len(), 4);
            assert_eq!(next[0], population[0]);
            assert_eq!(next[1], population[1]);
            assert_eq!(next[2], best);
            assert_eq!(next[3], best);
        }
    }

    #[test]
    fn test_full_survivor_selection_needs_no_refill() {
        let config = small_config();
        let mut rng = create_rng(21);
        let population: Vec<Candidate> = (0..config.population_size)
            .map(|_| random_permutation(config.board_size, &mut rng))
            .collect();
        let probabilities = normalize(&evaluate_population(&population));
        let best = vec![0; config.board_size];

        let (next, sampled) =
            select_survivors(&population, &probabilities, &best, config.population_size, &mut rng);
        assert_eq!(sampled, config.population_size);
        assert!(next.iter().all(|c| population.contains(c)));
    }

    #[test]
    fn test_seed_reproducibility() {
        let config = small_config();
        let a = QueensRunner::run(&config, &mut NoopObserver).unwrap();
        let b = QueensRunner::run(&config, &mut NoopObserver).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.generations, b.generations);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_history_matches_observer() {
        let config = small_config().with_board_size(10).with_num_generations(15);
        let mut observer = HistoryObserver::new();
        let result = QueensRunner::run(&config, &mut observer).unwrap();

        assert_eq!(result.history.len(), result.generations);
        assert_eq!(observer.points().len(), result.generations);
        for (stats, point) in result.history.iter().zip(observer.points()) {
            assert_eq!(stats.generation, point.generation);
            assert_eq!(stats.best_collisions, point.best_collisions);
        }
    }

    #[test]
    fn test_best_ever_is_monotone() {
        let config = small_config().with_board_size(12).with_num_generations(30);
        let result = QueensRunner::run(&config, &mut NoopObserver).unwrap();
        let best_seen = result.history.iter().map(|s| s.best_fitness).max().unwrap();
        assert!(result.best_fitness >= best_seen);
        assert_eq!(collisions(&result.best), result.best_collisions);
    }

    struct StopAfter {
        limit: usize,
        seen: usize,
    }

    impl Observer for StopAfter {
        fn on_generation(
            &mut self,
            _snapshot: &GenerationSnapshot<'_>,
        ) -> std::result::Result<(), ObserverError> {
            self.seen += 1;
            Ok(())
        }

        fn should_stop(&self) -> bool {
            self.seen >= self.limit
        }
    }

    #[test]
    fn test_observer_stop_between_generations() {
        let config = small_config().with_board_size(30).with_num_generations(1000);
        let mut observer = StopAfter { limit: 5, seen: 0 };
        let result = QueensRunner::run(&config, &mut observer).unwrap();
        assert!(!result.solved);
        assert!(result.cancelled);
        assert_eq!(result.generations, 5);
        assert_eq!(result.history.len(), 5);
        assert_eq!(observer.seen, 5);
    }

    #[test]
    fn test_cancel_flag_set_before_start() {
        let config = small_config().with_board_size(30);
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            QueensRunner::run_with_cancel(&config, &mut NoopObserver, Some(cancel)).unwrap();
        assert!(!result.solved);
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert!(result.history.is_empty());
    }

    struct FailingObserver {
        calls: usize,
    }

    impl Observer for FailingObserver {
        fn on_generation(
            &mut self,
            _snapshot: &GenerationSnapshot<'_>,
        ) -> std::result::Result<(), ObserverError> {
            self.calls += 1;
            Err("renderer unavailable".into())
        }
    }

    #[test]
    fn test_observer_errors_do_not_abort() {
        let config = small_config().with_board_size(30).with_num_generations(10);
        let mut observer = FailingObserver { calls: 0 };
        let result = QueensRunner::run(&config, &mut observer).unwrap();
        assert!(!result.cancelled);
        assert_eq!(observer.calls, result.generations);
        assert!(result.solved || result.generations == 10);
    }

    #[test]
    fn test_from_population_detects_solution() {
        let state = EvolutionState::from_population(4, vec![vec![1, 3, 0, 2], vec![0, 1, 2, 3]]);
        assert!(state.is_solved());
        assert_eq!(state.best, vec![1, 3, 0, 2]);
    }
}
