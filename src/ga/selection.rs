//! Stochastic universal sampling.
//!
//! A single random offset places `num` evenly spaced pointers over the
//! cumulative distribution. Each index is chosen once per pointer that
//! falls inside its bucket, so the selection count of an index differs from
//! its expected value `num * p[i]` by less than one.
//!
//! # References
//!
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection Algorithm"

use rand::Rng;

/// Selects up to `num` indices from `probabilities` by stochastic universal
/// sampling. Duplicates are expected.
///
/// `probabilities` should sum to 1. The walk stops as soon as it runs past
/// the last index, so when floating-point drift (or a distribution that
/// sums to less than 1) leaves pointers uncovered the result is shorter
/// than `num`. Callers that need an exact count must pad it themselves.
///
/// Never returns more than `num` indices. Returned indices are ascending.
///
/// # Complexity
/// O(n + num)
pub fn stochastic_universal<R: Rng>(probabilities: &[f64], num: usize, rng: &mut R) -> Vec<usize> {
    if num == 0 || probabilities.is_empty() {
        return Vec::new();
    }

    let step = 1.0 / num as f64;
    let mut pointer = rng.random::<f64>() * step;
    let mut selected = Vec::with_capacity(num);
    let mut idx = 0;
    let mut cumulative = probabilities[0];

    while pointer < 1.0 && selected.len() < num {
        if pointer < cumulative {
            selected.push(idx);
            pointer += step;
        } else {
            idx += 1;
            if idx == probabilities.len() {
                break;
            }
            cumulative += probabilities[idx];
        }
    }

    selected
}
