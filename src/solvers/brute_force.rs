//! Exhaustive search over all tours.

use crate::error::{Error, Result};
use crate::path::Path;
use crate::problem::{require_cities, DistanceOracle};
use crate::runner::RunContext;
use crate::solver::Solver;

use super::{canonical_tour, is_finite_cost};

/// Scores every permutation of the interior cities and keeps the
/// cheapest. Guaranteed optimal, `O(n!)`; practical to roughly a dozen
/// cities.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceSolver;

impl BruteForceSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Advances `arr` to its next lexicographic permutation in place.
/// Returns `false` once `arr` is the final (descending) permutation.
fn next_permutation(arr: &mut [usize]) -> bool {
    if arr.len() < 2 {
        return false;
    }
    let mut i = arr.len() - 1;
    while i > 0 && arr[i - 1] >= arr[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = arr.len() - 1;
    while arr[j] <= arr[i - 1] {
        j -= 1;
    }
    arr.swap(i - 1, j);
    arr[i..].reverse();
    true
}

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

impl Solver for BruteForceSolver {
    fn name(&self) -> &'static str {
        "Brute Force"
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        let mut best = canonical_tour(oracle)?;
        let mut best_dist = best.distance.ok_or(Error::NoTour)?;

        // The start city is pinned; only interior orderings vary.
        let mut interior: Vec<usize> = (1..n).collect();
        let total = factorial(n.saturating_sub(1));
        let mut consumed = 1.0;
        let mut current = best.clone();

        while next_permutation(&mut interior) {
            if ctx.is_cancelled() {
                break;
            }
            for (position, &city) in interior.iter().enumerate() {
                current.set_stop(position + 1, city);
            }
            let dist = oracle.path_dist(&current)?;
            current.distance = Some(dist);
            if dist < best_dist {
                best_dist = dist;
                best = current.clone();
                tracing::debug!(distance = dist, "new incumbent");
            }
            consumed += 1.0;
            ctx.publish(consumed / total, Some(&current), Some(&best));
        }

        if !is_finite_cost(best_dist) {
            return Err(Error::NoTour);
        }
        Ok(best)
    }
}
