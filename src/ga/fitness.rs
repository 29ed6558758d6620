//! Collision-based fitness.
//!
//! A candidate places one queen per column, and its values form a
//! permutation, so rows never clash. Only the two diagonal families can
//! produce collisions.
//!
//! Diagonals are indexed so that the bottom-left corner is 0 for the main
//! family and the bottom-right corner is 0 for the anti family; both
//! indices fall in `[0, 2N - 2]`.

use super::types::Candidate;

/// Fitness of a collision-free board of side `n`.
pub fn max_fitness(n: usize) -> usize {
    n * n
}

/// Frequency tables of queens per main diagonal and per anti-diagonal.
fn diagonal_counts(candidate: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let n = candidate.len();
    let lines = (2 * n).saturating_sub(1);
    let mut diag = vec![0usize; lines];
    let mut anti = vec![0usize; lines];
    for (col, &row) in candidate.iter().enumerate() {
        debug_assert!(row < n, "row {row} out of range for board size {n}");
        diag[col + (n - row) - 1] += 1;
        anti[(n - col) + (n - row) - 2] += 1;
    }
    (diag, anti)
}

/// Counts ordered pairs of queens sharing a diagonal or anti-diagonal.
///
/// A line holding `f` queens contributes `f * (f - 1)`.
pub fn collisions(candidate: &[usize]) -> usize {
    let (diag, anti) = diagonal_counts(candidate);
    diag.iter()
        .chain(anti.iter())
        .map(|&f| f * f.saturating_sub(1))
        .sum()
}

/// Scores a candidate as `N² - collisions`. Higher is better.
///
/// The result lies in `[0, N²]` and equals `N²` exactly when no two queens
/// attack each other.
pub fn fitness(candidate: &[usize]) -> usize {
    max_fitness(candidate.len()).saturating_sub(collisions(candidate))
}

/// Columns whose queen shares a diagonal with at least one other queen.
pub fn colliding_columns(candidate: &[usize]) -> Vec<usize> {
    let n = candidate.len();
    let (diag, anti) = diagonal_counts(candidate);
    candidate
        .iter()
        .enumerate()
        .filter(|&(col, &row)| {
            diag[col + (n - row) - 1] > 1 || anti[(n - col) + (n - row) - 2] > 1
        })
        .map(|(col, _)| col)
        .collect()
}

/// Scores every candidate in the population, in order.
pub fn evaluate_population(population: &[Candidate]) -> Vec<usize> {
    population.iter().map(|c| fitness(c)).collect()
}

/// Normalizes fitness values into a probability distribution.
///
/// Returns a uniform distribution when every value is zero.
pub fn normalize(fitness: &[usize]) -> Vec<f64> {
    let total: usize = fitness.iter().sum();
    if total == 0 {
        let uniform = 1.0 / fitness.len().max(1) as f64;
        return vec![uniform; fitness.len()];
    }
    let total = total as f64;
    fitness.iter().map(|&f| f as f64 / total).collect()
}

/// Index of the first candidate with the highest fitness.
///
/// # Panics
/// Panics if `fitness` is empty.
pub fn best_index(fitness: &[usize]) -> usize {
    assert!(!fitness.is_empty(), "cannot pick best of empty population");
    let mut best = 0;
    for (i, &f) in fitness.iter().enumerate().skip(1) {
        if f > fitness[best] {
            best = i;
        }
    }
    best
}

/// Arithmetic mean of the fitness values, `0.0` when empty.
pub fn mean(fitness: &[usize]) -> f64 {
    if fitness.is_empty() {
        return 0.0;
    }
    fitness.iter().sum::<usize>() as f64 / fitness.len() as f64
}
