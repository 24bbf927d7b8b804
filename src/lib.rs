//! Tour-optimization engine for the traveling salesman problem.
//!
//! Provides a shared tour representation and a family of interchangeable
//! solving strategies:
//!
//! - **Brute Force**: Exhaustive enumeration of all tours. Optimal,
//!   factorial time.
//! - **Branch and Bound**: Depth-first search pruning branches that
//!   cannot beat the incumbent. Optimal.
//! - **Dynamic Programming**: Held-Karp subset recurrence. Optimal,
//!   `O(n^2 * 2^n)`.
//! - **Greedy**: Nearest-neighbor construction. Fast, deterministic.
//! - **Simulated Annealing (SA)**: Random local moves with a cooling
//!   acceptance schedule.
//! - **Tabu Search (TS)**: Steepest-descent over a full neighborhood
//!   scan with short-term move memory.
//! - **Genetic Algorithm (GA)**: Population search with elitism,
//!   roulette selection, and permutation crossover (OX, PMX, NWOX).
//!
//! # Architecture
//!
//! Solvers read travel costs through the [`problem::DistanceOracle`]
//! trait and mutate [`path::Path`] values via a closed set of
//! neighborhood moves. They run either synchronously or on a worker
//! thread via [`runner::SolverRunner`], which streams progress
//! snapshots through a bounded channel with rate limiting and
//! cooperative cancellation.

pub mod error;
pub mod path;
pub mod problem;
pub mod rng;
pub mod runner;
pub mod solver;
pub mod solvers;
