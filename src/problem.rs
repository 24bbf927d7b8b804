//! Distance oracle contract and the matrix-backed implementation.
//!
//! Solvers only read the oracle; it stays immutable for the duration of a
//! solve and may be shared across concurrent solver instances.

use crate::error::{Error, Result};
use crate::path::Path;

/// Cost marking a missing or infinite edge.
///
/// All cost accumulation in the crate is saturating, so a tour crossing a
/// missing edge can never undercut a finite incumbent; exact solvers that
/// find no finite closed tour fail with [`Error::NoTour`].
pub const MISSING: u64 = u64::MAX;

/// Read-only source of pairwise travel costs.
///
/// Costs are non-negative and may be asymmetric (`dist(i, j)` need not
/// equal `dist(j, i)`).
pub trait DistanceOracle: Send + Sync {
    /// Number of cities in the instance.
    fn dimension(&self) -> usize;

    /// Travel cost from city `i` to city `j`.
    ///
    /// # Panics
    /// Implementations panic when either index is outside
    /// `[0, dimension)`.
    fn dist(&self, i: usize, j: usize) -> u64;

    /// Total distance of a path: the sum of `dist` over consecutive
    /// stops.
    ///
    /// Partial paths are not validated as permutations, but an unset
    /// stop inside the summed range is an explicit error rather than an
    /// arbitrary lookup.
    fn path_dist(&self, path: &Path) -> Result<u64> {
        let mut total = 0u64;
        for k in 0..path.len().saturating_sub(1) {
            let from = path.get_stop(k).ok_or(Error::UnsetStop(k))?;
            let to = path.get_stop(k + 1).ok_or(Error::UnsetStop(k + 1))?;
            total = total.saturating_add(self.dist(from, to));
        }
        Ok(total)
    }
}

/// Row-major distance matrix, the concrete oracle used by callers,
/// tests, and benchmarks.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    dimension: usize,
    costs: Vec<u64>,
}

impl DistanceMatrix {
    /// Builds a matrix from square row data.
    ///
    /// Fails with a configuration error when the rows are not square.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self> {
        let dimension = rows.len();
        let mut costs = Vec::with_capacity(dimension * dimension);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(Error::Config(format!(
                    "distance matrix row {i} has {} entries, expected {dimension}",
                    row.len()
                )));
            }
            costs.extend(row);
        }
        Ok(Self { dimension, costs })
    }
}

impl DistanceOracle for DistanceMatrix {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn dist(&self, i: usize, j: usize) -> u64 {
        assert!(
            i < self.dimension && j < self.dimension,
            "city pair ({i}, {j}) out of range for dimension {}",
            self.dimension
        );
        self.costs[i * self.dimension + j]
    }
}

/// Fails fast on an empty instance before any solver iteration.
pub(crate) fn require_cities(oracle: &dyn DistanceOracle) -> Result<usize> {
    match oracle.dimension() {
        0 => Err(Error::EmptyProblem),
        n => Ok(n),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The 4-city instance used across the solver tests.
    pub(crate) fn small_matrix() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0, 2, 3, 4],
            vec![5, 0, 7, 8],
            vec![9, 10, 0, 12],
            vec![13, 14, 15, 0],
        ])
        .unwrap()
    }

    #[test]
    fn test_dist_lookup() {
        let matrix = small_matrix();
        assert_eq!(matrix.dimension(), 4);
        assert_eq!(matrix.dist(1, 3), 8);
        assert_eq!(matrix.dist(3, 3), 0);
        assert_eq!(matrix.dist(3, 2), 15);
        assert_eq!(matrix.dist(1, 2), 7);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_dist_out_of_range() {
        small_matrix().dist(0, 4);
    }

    #[test]
    fn test_path_dist() {
        let matrix = small_matrix();
        let data: [(&[usize], u64); 4] = [
            (&[0, 1, 2, 3], 2 + 7 + 12),
            (&[2, 0, 1, 3], 9 + 2 + 8),
            (&[0, 3, 1, 0], 4 + 14 + 5),
            (&[1, 1, 1, 1], 0),
        ];
        for (stops, expected) in data {
            let path = Path::from_stops(stops.to_vec());
            assert_eq!(matrix.path_dist(&path).unwrap(), expected, "{stops:?}");
        }
    }

    #[test]
    fn test_path_dist_rejects_unset_stops() {
        let matrix = small_matrix();
        let mut path = Path::new(4);
        path.set_stop(0, 0);
        path.set_stop(1, 1);
        assert_eq!(matrix.path_dist(&path).unwrap_err(), Error::UnsetStop(2));

        let sentinel = Path::new(4);
        assert_eq!(matrix.path_dist(&sentinel).unwrap_err(), Error::UnsetStop(0));
    }

    #[test]
    fn test_path_dist_saturates_on_missing_edges() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, MISSING],
            vec![1, 0],
        ])
        .unwrap();
        let path = Path::from_stops([0, 1, 0]);
        assert_eq!(matrix.path_dist(&path).unwrap(), MISSING);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = DistanceMatrix::from_rows(vec![vec![0, 1], vec![2]]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_require_cities() {
        assert_eq!(
            require_cities(&DistanceMatrix::from_rows(vec![]).unwrap()).unwrap_err(),
            Error::EmptyProblem
        );
        assert_eq!(require_cities(&small_matrix()).unwrap(), 4);
    }
}
