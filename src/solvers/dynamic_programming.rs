//! Held-Karp dynamic programming over city subsets.

use crate::error::{Error, Result};
use crate::path::Path;
use crate::problem::{require_cities, DistanceOracle, MISSING};
use crate::runner::RunContext;
use crate::solver::Solver;

use super::is_finite_cost;

/// Guard against the `O(n^2 * 2^n)` table blowing up memory.
pub const MAX_DIMENSION: usize = 22;

const NO_PRED: u32 = u32::MAX;

/// Held-Karp: the cheapest completion of a tour depends only on the
/// current city and the set of cities already visited, so tours sharing
/// that pair share their tail. Guaranteed optimal, `O(n^2 * 2^n)` time
/// and `O(n * 2^n)` memory; instances above [`MAX_DIMENSION`] cities are
/// rejected.
///
/// The table is filled in one pass, so cancellation mid-fill aborts with
/// [`Error::NoTour`] rather than returning a partial incumbent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgrammingSolver;

impl DynamicProgrammingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DynamicProgrammingSolver {
    fn name(&self) -> &'static str {
        "Dynamic Programming"
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        if n > MAX_DIMENSION {
            return Err(Error::Config(format!(
                "instance has {n} cities, dynamic programming handles at most {MAX_DIMENSION}"
            )));
        }

        let full = (1usize << n) - 1;
        // mem[city << n | visited]: cheapest way to leave `city`, visit
        // everything outside `visited`, and return to 0.
        let mut mem = vec![MISSING; n << n];
        let mut pred = vec![NO_PRED; n << n];

        // States only ever grow their visited set, so filling masks in
        // decreasing order sees every successor before its predecessors.
        // Reachable states always contain the start city.
        for (processed, visited) in (1..=full).rev().enumerate() {
            if processed & 0x3ff == 0 {
                if ctx.is_cancelled() {
                    return Err(Error::NoTour);
                }
                ctx.publish(processed as f64 / full as f64, None, None);
            }
            if visited & 1 == 0 {
                continue;
            }
            for city in 0..n {
                if visited & (1 << city) == 0 {
                    continue;
                }
                let idx = (city << n) | visited;
                if visited == full {
                    mem[idx] = oracle.dist(city, 0);
                    continue;
                }
                let mut min_dist = MISSING;
                let mut min_city = NO_PRED;
                for next in 0..n {
                    let mask = 1 << next;
                    if visited & mask != 0 {
                        continue;
                    }
                    let dist = oracle
                        .dist(city, next)
                        .saturating_add(mem[(next << n) | (visited | mask)]);
                    if dist < min_dist {
                        min_dist = dist;
                        min_city = next as u32;
                    }
                }
                mem[idx] = min_dist;
                pred[idx] = min_city;
            }
        }

        let best_dist = mem[1];
        if !is_finite_cost(best_dist) {
            return Err(Error::NoTour);
        }

        // Walk the predecessor chain from the start state.
        let mut path = Path::new(n + 1);
        let mut city = 0usize;
        let mut visited = 1usize;
        let mut position = 0usize;
        loop {
            path.set_stop(position, city);
            let next = pred[(city << n) | visited];
            if next == NO_PRED {
                break;
            }
            city = next as usize;
            visited |= 1 << city;
            position += 1;
        }
        path.set_stop(n, 0);
        path.distance = Some(best_dist);

        tracing::debug!(distance = best_dist, "table filled, tour reconstructed");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::tests::small_matrix;
    use crate::problem::DistanceMatrix;
    use crate::solvers::tests::assert_valid_tour;

    #[test]
    fn test_optimum_on_spec_instance() {
        let mut ctx = RunContext::detached();
        let best = DynamicProgrammingSolver::new()
            .solve(&small_matrix(), &mut ctx)
            .unwrap();
        assert_eq!(best.distance, Some(34));
        assert_valid_tour(&best, 4);
    }

    #[test]
    fn test_single_city() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0]]).unwrap();
        let mut ctx = RunContext::detached();
        let best = DynamicProgrammingSolver::new()
            .solve(&matrix, &mut ctx)
            .unwrap();
        assert_eq!(best.distance, Some(0));
        assert_eq!(best.len(), 2);
    }

    #[test]
    fn test_reconstruction_matches_reported_cost() {
        let matrix = crate::solvers::tests::random_matrix(10, 21);
        let mut ctx = RunContext::detached();
        let best = DynamicProgrammingSolver::new()
            .solve(&matrix, &mut ctx)
            .unwrap();
        assert_valid_tour(&best, 10);
        assert_eq!(matrix.path_dist(&best).unwrap(), best.distance.unwrap());
    }

    #[test]
    fn test_oversized_instance_is_rejected() {
        let n = MAX_DIMENSION + 1;
        let matrix = DistanceMatrix::from_rows(vec![vec![1; n]; n]).unwrap();
        let mut ctx = RunContext::detached();
        let err = DynamicProgrammingSolver::new()
            .solve(&matrix, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_no_finite_tour_is_an_error() {
        use crate::problem::MISSING;
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, MISSING, MISSING],
            vec![1, 0, 1],
            vec![1, 1, 0],
        ])
        .unwrap();
        let mut ctx = RunContext::detached();
        assert_eq!(
            DynamicProgrammingSolver::new()
                .solve(&matrix, &mut ctx)
                .unwrap_err(),
            Error::NoTour
        );
    }
}
