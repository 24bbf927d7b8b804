//! The six solving strategies.
//!
//! Exact: [`BruteForceSolver`], [`BranchAndBoundSolver`],
//! [`DynamicProgrammingSolver`] (Held-Karp). Heuristic:
//! [`GreedySolver`] (nearest neighbor), [`SimulatedAnnealingSolver`],
//! [`TabuSearchSolver`], [`GeneticAlgorithmSolver`].
//!
//! All are independent and built on [`Path`] and
//! [`DistanceOracle`](crate::problem::DistanceOracle); a selection UI
//! enumerates them through the explicit [`REGISTRY`] table.

mod annealing;
mod branch_and_bound;
mod brute_force;
mod dynamic_programming;
pub mod genetic;
mod greedy;
mod tabu;

pub use annealing::SimulatedAnnealingSolver;
pub use branch_and_bound::BranchAndBoundSolver;
pub use brute_force::BruteForceSolver;
pub use dynamic_programming::DynamicProgrammingSolver;
pub use genetic::GeneticAlgorithmSolver;
pub use greedy::GreedySolver;
pub use tabu::TabuSearchSolver;

use rand::Rng;

use crate::error::Result;
use crate::path::Path;
use crate::problem::{DistanceOracle, MISSING};
use crate::solver::Solver;

/// A registered solver: display name plus factory.
pub struct SolverEntry {
    pub name: &'static str,
    pub build: fn() -> Box<dyn Solver>,
}

fn build_brute_force() -> Box<dyn Solver> {
    Box::new(BruteForceSolver::new())
}

fn build_branch_and_bound() -> Box<dyn Solver> {
    Box::new(BranchAndBoundSolver::new())
}

fn build_dynamic_programming() -> Box<dyn Solver> {
    Box::new(DynamicProgrammingSolver::new())
}

fn build_greedy() -> Box<dyn Solver> {
    Box::new(GreedySolver::new())
}

fn build_annealing() -> Box<dyn Solver> {
    Box::new(SimulatedAnnealingSolver::new())
}

fn build_tabu() -> Box<dyn Solver> {
    Box::new(TabuSearchSolver::new())
}

fn build_genetic() -> Box<dyn Solver> {
    Box::new(GeneticAlgorithmSolver::new())
}

/// Registration table of every concrete solver, populated statically.
pub const REGISTRY: &[SolverEntry] = &[
    SolverEntry {
        name: "Brute Force",
        build: build_brute_force,
    },
    SolverEntry {
        name: "Branch and Bound",
        build: build_branch_and_bound,
    },
    SolverEntry {
        name: "Dynamic Programming",
        build: build_dynamic_programming,
    },
    SolverEntry {
        name: "Greedy",
        build: build_greedy,
    },
    SolverEntry {
        name: "Simulated Annealing",
        build: build_annealing,
    },
    SolverEntry {
        name: "Tabu Search",
        build: build_tabu,
    },
    SolverEntry {
        name: "Genetic Algorithm",
        build: build_genetic,
    },
];

/// Builds a registered solver by display name.
pub fn create(name: &str) -> Option<Box<dyn Solver>> {
    REGISTRY
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
}

/// The identity tour `0, 1, .., n-1, 0`, scored.
pub(crate) fn canonical_tour(oracle: &dyn DistanceOracle) -> Result<Path> {
    let n = oracle.dimension();
    let mut stops: Vec<usize> = (0..n).collect();
    stops.push(0);
    let mut path = Path::from_stops(stops);
    path.distance = Some(oracle.path_dist(&path)?);
    Ok(path)
}

/// A uniformly shuffled closed tour with the start city fixed at both
/// ends, scored.
pub(crate) fn random_tour<R: Rng>(oracle: &dyn DistanceOracle, rng: &mut R) -> Result<Path> {
    let mut path = canonical_tour(oracle)?;
    let len = path.len();
    path.shuffle(1, len - 1, rng);
    path.distance = Some(oracle.path_dist(&path)?);
    Ok(path)
}

/// Two distinct random interior positions of a closed tour over
/// `dimension` cities, i.e. positions in `[1, dimension)`.
pub(crate) fn random_interior_pair<R: Rng>(rng: &mut R, dimension: usize) -> (usize, usize) {
    debug_assert!(dimension >= 3, "need at least two interior positions");
    let i = rng.random_range(1..dimension);
    let mut j = rng.random_range(1..dimension);
    while j == i {
        j = rng.random_range(1..dimension);
    }
    (i, j)
}

/// Whether a tour distance is finite, i.e. crosses no missing edge.
pub(crate) fn is_finite_cost(distance: u64) -> bool {
    distance < MISSING
}
