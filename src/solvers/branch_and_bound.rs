//! Depth-first search with cost-bound pruning.

use crate::error::{Error, Result};
use crate::path::Path;
use crate::problem::{require_cities, DistanceOracle};
use crate::runner::RunContext;
use crate::solver::Solver;

/// Explores partial tours depth-first and prunes any branch whose cost
/// already matches or exceeds the best complete tour found. Guaranteed
/// optimal; worst case still factorial, but pruning makes mid-size
/// instances tractable well past brute force.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "Branch and Bound"
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        let mut path = Path::new(n + 1);
        path.set_stop(n, 0);

        let mut best: Option<Path> = None;
        let mut best_dist = u64::MAX;

        // Explicit stack of (tour position, city, cost so far); the
        // working path is shared across branches, valid up to the
        // popped position.
        let mut stack: Vec<(usize, usize, u64)> = vec![(0, 0, 0)];
        let mut roots_done = 0usize;

        while let Some((level, city, dist)) = stack.pop() {
            if ctx.is_cancelled() {
                break;
            }
            path.set_stop(level, city);

            if level == 1 {
                roots_done += 1;
            }
            let progress = if n > 1 {
                roots_done as f64 / (n - 1) as f64
            } else {
                1.0
            };
            ctx.publish(progress, None, best.as_ref());

            if level == n - 1 {
                let total = dist.saturating_add(oracle.dist(city, 0));
                if total < best_dist {
                    let mut found = path.clone();
                    found.distance = Some(total);
                    best_dist = total;
                    ctx.publish_with_highlight(progress, None, Some(&found), &found);
                    best = Some(found);
                    tracing::debug!(distance = total, "new incumbent");
                }
                continue;
            }

            for next_city in 0..n {
                if path.in_path(next_city, level + 1) {
                    continue;
                }
                let next_dist = dist.saturating_add(oracle.dist(city, next_city));
                // Also cuts branches crossing missing edges: a saturated
                // cost can never undercut the incumbent.
                if next_dist >= best_dist {
                    continue;
                }
                stack.push((level + 1, next_city, next_dist));
            }
        }

        best.ok_or(Error::NoTour)
    }
}
