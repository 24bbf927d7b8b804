//! Nearest-neighbor construction.

use crate::error::{Error, Result};
use crate::path::Path;
use crate::problem::{require_cities, DistanceOracle};
use crate::runner::RunContext;
use crate::solver::Solver;

use super::is_finite_cost;

/// Builds a tour by repeatedly hopping to the cheapest unvisited city.
///
/// Deterministic, `O(n^2)`, and the seeding step of
/// [`TabuSearchSolver`](super::TabuSearchSolver). The construction is
/// bounded and always runs to completion, so cancellation is not
/// observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl GreedySolver {
    pub fn new() -> Self {
        Self
    }
}

/// The nearest-neighbor tour from city 0, scored.
///
/// Fails with [`Error::NoTour`] when every edge out of some partial tour
/// is missing.
pub(crate) fn nearest_neighbor_tour(oracle: &dyn DistanceOracle) -> Result<Path> {
    let n = require_cities(oracle)?;
    let mut path = Path::new(n + 1);
    path.set_stop(0, 0);
    path.set_stop(n, 0);

    for position in 1..n {
        let current = path
            .get_stop(position - 1)
            .ok_or(Error::UnsetStop(position - 1))?;
        let mut min_dist = u64::MAX;
        let mut next = None;
        for city in 0..n {
            if path.in_path(city, position) {
                continue;
            }
            let dist = oracle.dist(current, city);
            if is_finite_cost(dist) && dist < min_dist {
                min_dist = dist;
                next = Some(city);
            }
        }
        match next {
            Some(city) => path.set_stop(position, city),
            None => return Err(Error::NoTour),
        }
    }

    let distance = oracle.path_dist(&path)?;
    if !is_finite_cost(distance) {
        // The closing hop back to 0 can still be missing.
        return Err(Error::NoTour);
    }
    path.distance = Some(distance);
    Ok(path)
}

impl Solver for GreedySolver {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let path = nearest_neighbor_tour(oracle)?;
        ctx.publish(1.0, Some(&path), Some(&path));
        tracing::debug!(distance = path.distance, "greedy construction done");
        Ok(path)
    }
}
