//! Tabu search over an exhaustively scanned neighborhood.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::path::{Neighborhood, Path};
use crate::problem::{require_cities, DistanceOracle};
use crate::runner::RunContext;
use crate::solver::Solver;
use crate::solver::{Property, PropertyValue};

use super::greedy::nearest_neighbor_tour;

const PROPERTIES: &[Property] = &[
    Property {
        label: "Iterations",
        field: "iterations",
        default: PropertyValue::Int(1000),
    },
    Property {
        label: "Cadence",
        field: "cadence",
        default: PropertyValue::Int(18),
    },
    Property {
        label: "Neighborhood",
        field: "neighborhood",
        default: PropertyValue::Neighborhood(Neighborhood::Invert),
    },
    Property {
        label: "Reset threshold",
        field: "reset_threshold",
        default: PropertyValue::Int(45),
    },
    Property {
        label: "Stop threshold",
        field: "stop_threshold",
        default: PropertyValue::Int(450),
    },
    Property {
        label: "Run time [ms]",
        field: "run_time",
        default: PropertyValue::Int(0),
    },
];

/// Symmetric matrix of per-move tabu tenures.
///
/// A nonzero entry forbids the move `(i, j)` (and its mirror); entries
/// decay by one each iteration.
struct TabuMatrix {
    dimension: usize,
    tenures: Vec<u32>,
}

impl TabuMatrix {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            tenures: vec![0; dimension * dimension],
        }
    }

    fn is_tabu(&self, i: usize, j: usize) -> bool {
        self.tenures[i * self.dimension + j] > 0
    }

    /// Marks a move and its mirror tabu for `cadence` iterations.
    fn mark(&mut self, i: usize, j: usize, cadence: u32) {
        self.tenures[i * self.dimension + j] = cadence;
        self.tenures[j * self.dimension + i] = cadence;
    }

    fn decay(&mut self) {
        for tenure in &mut self.tenures {
            *tenure = tenure.saturating_sub(1);
        }
    }
}

/// Steepest-descent local search that forbids recently used moves,
/// letting the walk escape local minima it would otherwise oscillate
/// around. Deterministic: seeded by nearest-neighbor construction and
/// scanning the full neighborhood every iteration.
///
/// Termination is either count-driven, `iterations` with an optional
/// early stop after `stop_threshold` non-improving iterations, or
/// time-driven when `run_time` is nonzero, never both.
#[derive(Debug, Clone)]
pub struct TabuSearchSolver {
    pub iterations: usize,
    /// Iterations a used move stays forbidden.
    pub cadence: u32,
    pub neighborhood: Neighborhood,
    /// Non-improving iterations before the walk restarts from the best
    /// tour found; `0` disables restarts.
    pub reset_threshold: usize,
    /// Non-improving iterations before the search gives up; `0`
    /// disables the early stop. Count-driven runs only.
    pub stop_threshold: usize,
    /// Wall-clock budget in milliseconds; `0` selects count-driven
    /// termination.
    pub run_time: u64,
}

impl Default for TabuSearchSolver {
    fn default() -> Self {
        Self {
            iterations: 1000,
            cadence: 18,
            neighborhood: Neighborhood::Invert,
            reset_threshold: 45,
            stop_threshold: 450,
            run_time: 0,
        }
    }
}

impl TabuSearchSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_cadence(mut self, cadence: u32) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    pub fn with_reset_threshold(mut self, reset_threshold: usize) -> Self {
        self.reset_threshold = reset_threshold;
        self
    }

    pub fn with_stop_threshold(mut self, stop_threshold: usize) -> Self {
        self.stop_threshold = stop_threshold;
        self
    }

    pub fn with_run_time(mut self, run_time: u64) -> Self {
        self.run_time = run_time;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.cadence == 0 {
            return Err(Error::Config("cadence must be at least 1".into()));
        }
        if self.run_time == 0 && self.iterations == 0 {
            return Err(Error::Config(
                "iterations must be positive for count-driven runs".into(),
            ));
        }
        Ok(())
    }

    /// The cheapest non-tabu neighbor of `path`, marking the move that
    /// produced it. Returns `path` itself when every move is tabu.
    fn min_neighbor(
        &self,
        oracle: &dyn DistanceOracle,
        tabu: &mut TabuMatrix,
        path: &Path,
    ) -> Result<Path> {
        let n = oracle.dimension();
        let mut min_neighbor: Option<Path> = None;
        let mut min_dist = u64::MAX;
        let mut best_move = None;

        for i in 1..n {
            for j in 1..n {
                // Skip redundant moves: swap and invert are symmetric
                // in (i, j), insertion at an adjacent position is the
                // same swap.
                match self.neighborhood {
                    Neighborhood::Swap | Neighborhood::Invert => {
                        if j <= i {
                            continue;
                        }
                    }
                    Neighborhood::Insert => {
                        if j + 1 == i || j == i + 1 {
                            continue;
                        }
                    }
                }
                if tabu.is_tabu(i, j) {
                    continue;
                }

                let mut neighbor = path.clone();
                neighbor.apply(self.neighborhood, i, j);
                let dist = oracle.path_dist(&neighbor)?;
                neighbor.distance = Some(dist);
                if dist < min_dist {
                    min_dist = dist;
                    min_neighbor = Some(neighbor);
                    best_move = Some((i, j));
                }
            }
        }

        if let Some((i, j)) = best_move {
            tabu.mark(i, j, self.cadence);
        }
        // In small instances every move can be tabu at once; stand
        // still rather than return nothing.
        Ok(min_neighbor.unwrap_or_else(|| path.clone()))
    }
}

impl Solver for TabuSearchSolver {
    fn name(&self) -> &'static str {
        "Tabu Search"
    }

    fn properties(&self) -> &'static [Property] {
        PROPERTIES
    }

    fn set_property(&mut self, field: &str, value: PropertyValue) -> Result<()> {
        fn non_negative(field: &str, value: i64) -> Result<usize> {
            usize::try_from(value)
                .map_err(|_| Error::Config(format!("{field} must be non-negative")))
        }

        match field {
            "iterations" => self.iterations = non_negative(field, value.expect_int(field)?)?,
            "cadence" => {
                self.cadence = u32::try_from(value.expect_int(field)?)
                    .map_err(|_| Error::Config("cadence must be non-negative".into()))?;
            }
            "neighborhood" => self.neighborhood = value.expect_neighborhood(field)?,
            "reset_threshold" => {
                self.reset_threshold = non_negative(field, value.expect_int(field)?)?;
            }
            "stop_threshold" => {
                self.stop_threshold = non_negative(field, value.expect_int(field)?)?;
            }
            "run_time" => {
                self.run_time = u64::try_from(value.expect_int(field)?)
                    .map_err(|_| Error::Config("run_time must be non-negative".into()))?;
            }
            _ => return Err(Error::UnknownProperty(field.to_string())),
        }
        Ok(())
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        self.validate()?;
        let mut current = nearest_neighbor_tour(oracle)?;
        if n < 3 {
            // No interior pair to move.
            return Ok(current);
        }

        let mut best = current.clone();
        let mut tabu = TabuMatrix::new(n);
        let mut reset_counter = 0usize;
        let mut stop_counter = 0usize;

        let time_bounded = self.run_time > 0;
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.run_time);

        let mut iteration = 0usize;
        loop {
            if ctx.is_cancelled() {
                break;
            }
            if !time_bounded && iteration >= self.iterations {
                break;
            }

            current = self.min_neighbor(oracle, &mut tabu, &current)?;

            if current.distance < best.distance {
                best = current.clone();
                reset_counter = 0;
                stop_counter = 0;
                tracing::debug!(distance = best.distance, iteration, "new incumbent");
            } else {
                reset_counter += 1;
                stop_counter += 1;

                if !time_bounded
                    && self.stop_threshold > 0
                    && stop_counter >= self.stop_threshold
                {
                    break;
                }
                if self.reset_threshold > 0 && reset_counter >= self.reset_threshold {
                    // Stuck: restart the walk from the best tour found.
                    current = best.clone();
                    reset_counter = 0;
                }
            }

            tabu.decay();
            iteration += 1;

            let progress = if time_bounded {
                started.elapsed().as_millis() as f64 / self.run_time as f64
            } else {
                iteration as f64 / self.iterations as f64
            };
            ctx.publish(progress, Some(&current), Some(&best));

            if time_bounded && Instant::now() >= deadline {
                break;
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::tests::small_matrix;
    use crate::solvers::tests::{assert_valid_tour, random_matrix};
    use crate::solvers::GreedySolver;

    #[test]
    fn test_tabu_matrix_marks_symmetrically_and_decays() {
        let mut tabu = TabuMatrix::new(5);
        tabu.mark(1, 3, 2);
        assert!(tabu.is_tabu(1, 3));
        assert!(tabu.is_tabu(3, 1));
        assert!(!tabu.is_tabu(1, 2));

        tabu.decay();
        assert!(tabu.is_tabu(1, 3));
        tabu.decay();
        assert!(!tabu.is_tabu(1, 3));
        // Expired entries stay at zero.
        tabu.decay();
        assert!(!tabu.is_tabu(1, 3));
    }

    #[test]
    fn test_finds_optimum_on_spec_instance() {
        let mut ctx = RunContext::detached();
        let best = TabuSearchSolver::new()
            .with_iterations(20)
            .solve(&small_matrix(), &mut ctx)
            .unwrap();
        assert_eq!(best.distance, Some(34));
        assert_valid_tour(&best, 4);
    }

    #[test]
    fn test_never_worse_than_its_greedy_seed() {
        let mut ctx = RunContext::detached();
        for seed in [1, 2, 3] {
            let matrix = random_matrix(12, seed);
            let greedy = GreedySolver::new().solve(&matrix, &mut ctx).unwrap();
            let tabu = TabuSearchSolver::new()
                .with_iterations(100)
                .solve(&matrix, &mut ctx)
                .unwrap();
            assert!(tabu.distance <= greedy.distance, "seed {seed}");
            assert_valid_tour(&tabu, 12);
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let matrix = random_matrix(10, 44);
        let mut ctx = RunContext::detached();
        let a = TabuSearchSolver::new()
            .with_iterations(50)
            .solve(&matrix, &mut ctx)
            .unwrap();
        let b = TabuSearchSolver::new()
            .with_iterations(50)
            .solve(&matrix, &mut ctx)
            .unwrap();
        assert_eq!(a.stops(), b.stops());
        assert_eq!(a.distance, b.distance);
    }

    #[test]
    fn test_all_tabu_stands_still() {
        // Dimension 3 has a single non-redundant invert move; after it
        // is marked, the scan finds nothing and must return the current
        // path unchanged.
        let matrix = random_matrix(3, 5);
        let solver = TabuSearchSolver::new();
        let mut tabu = TabuMatrix::new(3);
        tabu.mark(1, 2, 10);
        let path = nearest_neighbor_tour(&matrix).unwrap();
        let neighbor = solver.min_neighbor(&matrix, &mut tabu, &path).unwrap();
        assert_eq!(neighbor.stops(), path.stops());
    }

    #[test]
    fn test_set_property_round_trip() {
        let mut solver = TabuSearchSolver::new();
        solver
            .set_property("iterations", PropertyValue::Int(5))
            .unwrap();
        solver.set_property("cadence", PropertyValue::Int(3)).unwrap();
        solver
            .set_property("stop_threshold", PropertyValue::Int(0))
            .unwrap();
        assert_eq!(solver.iterations, 5);
        assert_eq!(solver.cadence, 3);
        assert_eq!(solver.stop_threshold, 0);

        assert!(solver
            .set_property("cadence", PropertyValue::Int(-1))
            .is_err());
        assert!(solver
            .set_property("tenure", PropertyValue::Int(1))
            .is_err());
    }

    #[test]
    fn test_zero_cadence_is_rejected() {
        let mut ctx = RunContext::detached();
        let err = TabuSearchSolver::new()
            .with_cadence(0)
            .solve(&small_matrix(), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
