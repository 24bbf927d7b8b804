//! RNG construction for stochastic solvers.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates the RNG used by the stochastic solvers.
///
/// A fixed seed gives fully reproducible runs; `None` seeds from the
/// thread-local entropy source.
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    }
}
