//! Permutation crossover and mutation for queen placements.
//!
//! # Crossover
//!
//! - [`wrap_crossover`]: copies a circular segment from each parent and
//!   fills the rest from the other parent, wrapping around the board
//!
//! # Mutation
//!
//! - [`swap_mutation`]: exchanges the rows of two distinct columns — O(1)
//! - [`gated_mutation`]: applies [`swap_mutation`] when a uniform draw
//!   exceeds the configured rate
//!
//! All operators keep their input a permutation of `0..N`.

use super::types::Candidate;
use crate::error::{ConfigError, Result, MIN_BOARD_SIZE};
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Wrap-around partially mapped crossover.
///
/// # Algorithm
///
/// 1. Pick `start` in `[0, N-1]` and a segment length in `[2, N-2]`; the
///    segment runs from `start` and wraps past the last column
/// 2. Child1 copies parent1's segment, child2 copies parent2's
/// 3. Walking the remaining columns from the segment end around to `start`,
///    each child takes the next value of the other parent, scanning forward
///    circularly and skipping values it already holds
///
/// Each child therefore inherits at least two consecutive columns from each
/// parent.
///
/// # Errors
/// Returns [`ConfigError::BoardTooSmall`] when `N < 4`.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn wrap_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<(Candidate, Candidate)> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < MIN_BOARD_SIZE {
        return Err(ConfigError::BoardTooSmall(n).into());
    }

    let start = rng.random_range(0..n);
    let len = rng.random_range(2..=n - 2);

    Ok((
        wrap_child(parent1, parent2, start, len),
        wrap_child(parent2, parent1, start, len),
    ))
}

/// Builds one child: `len` columns from `template` starting at `start`
/// (wrapping), the rest filled from `donor`.
///
/// `len` must be below `template.len()`.
pub fn wrap_child(template: &[usize], donor: &[usize], start: usize, len: usize) -> Candidate {
    let n = template.len();
    debug_assert!(len < n && start < n);

    let mut child = vec![usize::MAX; n];
    let mut used = vec![false; n];

    for offset in 0..len {
        let col = (start + offset) % n;
        child[col] = template[col];
        used[template[col]] = true;
    }

    let end = (start + len) % n;
    let mut scan = end;
    for offset in 0..(n - len) {
        let col = (end + offset) % n;
        while used[donor[scan]] {
            scan = (scan + 1) % n;
        }
        child[col] = donor[scan];
        used[donor[scan]] = true;
    }

    child
}

// ============================================================================
// Mutation
// ============================================================================

/// Swap mutation: exchange the rows of two distinct columns.
pub fn swap_mutation<R: Rng>(candidate: &mut [usize], rng: &mut R) {
    let n = candidate.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    candidate.swap(i, j);
}

/// Draws `u` uniformly from `[0, 1)` and applies [`swap_mutation`] when
/// `u > mutation_rate`.
///
/// The effective mutation probability is `1 - mutation_rate`: a rate of
/// `1.0` never mutates and a rate of `0.0` almost always does.
///
/// Returns whether the candidate was mutated.
pub fn gated_mutation<R: Rng>(candidate: &mut [usize], mutation_rate: f64, rng: &mut R) -> bool {
    if rng.random::<f64>() > mutation_rate {
        swap_mutation(candidate, rng);
        true
    } else {
        false
    }
}

/// Crossover followed by an independent gated mutation of each child.
pub fn breed_pair<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    mutation_rate: f64,
    rng: &mut R,
) -> Result<(Candidate, Candidate)> {
    let (mut child1, mut child2) = wrap_crossover(parent1, parent2, rng)?;
    gated_mutation(&mut child1, mutation_rate, rng);
    gated_mutation(&mut child2, mutation_rate, rng);
    Ok((child1, child2))
}

// ============================================================================
// Tests
// ============================================================================
