//! Tour representation and neighborhood move primitives.
//!
//! [`Path`] is a fixed-length sequence of city stops with a cached total
//! distance. It owns the three local moves — swap, insert, invert — that
//! every metaheuristic in this crate explores through [`Path::apply`].

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::error::{Error, Result};

/// Neighborhood move kind.
///
/// The set of moves is closed and exhaustively matched; adding a kind
/// means extending every dispatch site, which is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Neighborhood {
    /// Exchange the cities at two positions.
    Swap,
    /// Remove the city at one position and reinsert it at another,
    /// shifting the stops in between.
    Insert,
    /// Reverse the closed sub-range between two positions (2-opt).
    Invert,
}

/// A tour, possibly partial.
///
/// Stops are `Option<usize>` city indices; `None` marks an unset slot
/// (partial paths built during construction and branch-and-bound contain
/// them legitimately). A complete closed tour of an `n`-city instance has
/// length `n + 1` with equal first and last stops.
///
/// The cached `distance` is **not** auto-maintained: every order-changing
/// operation resets it to `None`, and callers must refresh it through the
/// distance oracle before relying on it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    stops: Vec<Option<usize>>,
    /// Total distance of the path, `None` until computed.
    pub distance: Option<u64>,
}

impl Path {
    /// Creates a path of the given length with every stop unset.
    pub fn new(length: usize) -> Self {
        Self {
            stops: vec![None; length],
            distance: None,
        }
    }

    /// Creates a path from a complete stop sequence.
    pub fn from_stops(stops: impl Into<Vec<usize>>) -> Self {
        Self {
            stops: stops.into().into_iter().map(Some).collect(),
            distance: None,
        }
    }

    /// Number of stops (set or not) in the path.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// The full stop sequence.
    pub fn stops(&self) -> &[Option<usize>] {
        &self.stops
    }

    /// Sets the stop at `index` to the given city.
    ///
    /// # Panics
    /// Panics if `index` is out of range. Out-of-range access is a caller
    /// bug; it is never clamped.
    pub fn set_stop(&mut self, index: usize, city: usize) {
        self.check_index(index);
        self.stops[index] = Some(city);
        self.distance = None;
    }

    /// Returns the city at `index`, or `None` if the stop is unset.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get_stop(&self, index: usize) -> Option<usize> {
        self.check_index(index);
        self.stops[index]
    }

    /// Replaces the entire stop sequence.
    ///
    /// Fails with [`Error::LengthMismatch`] when `stops` does not match
    /// the path length; the path is left unmodified in that case.
    pub fn set_path(&mut self, stops: &[usize]) -> Result<()> {
        if stops.len() != self.stops.len() {
            return Err(Error::LengthMismatch {
                expected: self.stops.len(),
                got: stops.len(),
            });
        }
        self.stops = stops.iter().copied().map(Some).collect();
        self.distance = None;
        Ok(())
    }

    /// Randomly permutes the half-open slice `[i, j)` in place.
    ///
    /// Unlike the move primitives below, the range excludes `j`; a
    /// closed tour keeps its endpoints with `shuffle(1, len - 1, rng)`.
    ///
    /// # Panics
    /// Panics if `i > j` or `j` exceeds the path length.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, i: usize, j: usize, rng: &mut R) {
        assert!(
            i <= j && j <= self.stops.len(),
            "shuffle range [{i}, {j}) out of bounds for path of length {}",
            self.stops.len()
        );
        self.stops[i..j].shuffle(rng);
        self.distance = None;
    }

    /// Whether `city` occurs among the first `limit` stops.
    ///
    /// # Panics
    /// Panics if `limit` exceeds the path length.
    pub fn in_path(&self, city: usize, limit: usize) -> bool {
        assert!(
            limit <= self.stops.len(),
            "limit {limit} out of bounds for path of length {}",
            self.stops.len()
        );
        self.stops[..limit].contains(&Some(city))
    }

    /// Exchanges the stops at `i` and `j`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.check_index(i);
        self.check_index(j);
        self.stops.swap(i, j);
        self.distance = None;
    }

    /// Removes the stop at `i`, shifts every stop strictly between `i`
    /// and `j` one step toward `i`, and places the removed stop at `j`.
    ///
    /// `[1,2,3,4,5,6].insert(1, 3)` yields `[1,3,4,2,5,6]`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn insert(&mut self, mut i: usize, j: usize) {
        self.check_index(i);
        self.check_index(j);
        let moved = self.stops[i];

        while i > j {
            self.stops[i] = self.stops[i - 1];
            i -= 1;
        }
        while i < j {
            self.stops[i] = self.stops[i + 1];
            i += 1;
        }

        self.stops[j] = moved;
        self.distance = None;
    }

    /// Reverses the closed sub-range `[min(i, j), max(i, j)]` in place.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn invert(&mut self, i: usize, j: usize) {
        self.check_index(i);
        self.check_index(j);
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.stops[lo..=hi].reverse();
        self.distance = None;
    }

    /// Performs the move named by `neighborhood` on positions `i`, `j`.
    ///
    /// This is the single dispatch point shared by every metaheuristic's
    /// neighborhood exploration.
    pub fn apply(&mut self, neighborhood: Neighborhood, i: usize, j: usize) {
        match neighborhood {
            Neighborhood::Swap => self.swap(i, j),
            Neighborhood::Insert => self.insert(i, j),
            Neighborhood::Invert => self.invert(i, j),
        }
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.stops.len(),
            "stop index {index} out of range for path of length {}",
            self.stops.len()
        );
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, stop) in self.stops.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            match stop {
                Some(city) => write!(f, "{city}")?,
                None => write!(f, "-")?,
            }
        }
        match self.distance {
            Some(d) => write!(f, " ({d})"),
            None => write!(f, " (?)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    fn stops_of(path: &Path) -> Vec<usize> {
        path.stops().iter().map(|s| s.expect("set stop")).collect()
    }

    #[test]
    fn test_new_path_is_unset() {
        for len in 0..10 {
            let path = Path::new(len);
            assert_eq!(path.len(), len);
            assert!(path.stops().iter().all(|s| s.is_none()));
            assert_eq!(path.distance, None);
        }
    }

    #[test]
    fn test_set_and_get_stop() {
        let mut path = Path::new(6);
        let data = [
            (1, 5, [None, Some(5), None, None, None, None]),
            (0, 0, [Some(0), Some(5), None, None, None, None]),
            (5, 9, [Some(0), Some(5), None, None, None, Some(9)]),
            (2, 3, [Some(0), Some(5), Some(3), None, None, Some(9)]),
        ];

        for (index, city, expected) in data {
            path.set_stop(index, city);
            assert_eq!(path.stops(), expected);
            assert_eq!(path.get_stop(index), Some(city));
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_stop_out_of_range() {
        let mut path = Path::new(6);
        path.set_stop(6, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_stop_out_of_range() {
        let path = Path::new(6);
        path.get_stop(20);
    }

    #[test]
    fn test_set_path() {
        let mut path = Path::new(6);
        for p in [[1, 2, 3, 4, 5, 6], [9, 20, 1, 5, 55, 7], [0, 0, 0, 0, 0, 0]] {
            path.set_path(&p).unwrap();
            assert_eq!(stops_of(&path), p);
        }
    }

    #[test]
    fn test_set_path_length_mismatch_leaves_path_unmodified() {
        let mut path = Path::from_stops([1, 2, 3, 4, 5, 6]);
        for bad in [vec![1, 2, 3, 4, 5], vec![1, 2, 3, 4, 5, 6, 7], vec![1], vec![]] {
            let err = path.set_path(&bad).unwrap_err();
            assert_eq!(
                err,
                Error::LengthMismatch {
                    expected: 6,
                    got: bad.len()
                }
            );
            assert_eq!(stops_of(&path), [1, 2, 3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_shuffle_only_permutes_the_half_open_slice() {
        let mut rng = create_rng(Some(42));
        let original = [0, 1, 2, 3, 4, 5, 6, 7];

        for _ in 0..20 {
            let mut path = Path::from_stops(original);
            path.shuffle(2, 5, &mut rng);
            let shuffled = stops_of(&path);

            // Prefix and suffix untouched, slice content preserved.
            assert_eq!(&shuffled[..2], &original[..2]);
            assert_eq!(&shuffled[5..], &original[5..]);
            let mut slice: Vec<usize> = shuffled[2..5].to_vec();
            slice.sort_unstable();
            assert_eq!(slice, [2, 3, 4]);
        }
    }

    #[test]
    fn test_in_path() {
        let path = Path::from_stops([4, 1, 8, 2, 9, 7]);
        let data = [
            (4, 6, true),
            (2, 6, true),
            (7, 6, true),
            (3, 6, false),
            (4, 1, true),
            (8, 3, true),
            (4, 0, false),
            (7, 5, false),
            (10, 3, false),
        ];
        for (city, limit, expected) in data {
            assert_eq!(path.in_path(city, limit), expected, "city {city} limit {limit}");
        }
    }

    #[test]
    fn test_in_path_on_all_sentinel_path() {
        let path = Path::new(5);
        for limit in 0..=5 {
            assert!(!path.in_path(0, limit));
        }
    }

    // Move tables ported from the reference behavior; each row mutates
    // the same path as the previous one.

    #[test]
    fn test_swap_table() {
        let mut path = Path::from_stops([1, 2, 3, 4, 5, 6]);
        let data = [
            (1, 3, [1, 4, 3, 2, 5, 6]),
            (0, 4, [5, 4, 3, 2, 1, 6]),
            (2, 5, [5, 4, 6, 2, 1, 3]),
            (5, 0, [3, 4, 6, 2, 1, 5]),
            (2, 3, [3, 4, 2, 6, 1, 5]),
            (4, 4, [3, 4, 2, 6, 1, 5]),
        ];
        for (i, j, expected) in data {
            path.swap(i, j);
            assert_eq!(stops_of(&path), expected, "swap({i}, {j})");
        }
    }

    #[test]
    fn test_insert_table() {
        let mut path = Path::from_stops([1, 2, 3, 4, 5, 6]);
        let data = [
            (1, 3, [1, 3, 4, 2, 5, 6]),
            (0, 4, [3, 4, 2, 5, 1, 6]),
            (2, 5, [3, 4, 5, 1, 6, 2]),
            (5, 0, [2, 3, 4, 5, 1, 6]),
            (2, 3, [2, 3, 5, 4, 1, 6]),
            (4, 4, [2, 3, 5, 4, 1, 6]),
        ];
        for (i, j, expected) in data {
            path.insert(i, j);
            assert_eq!(stops_of(&path), expected, "insert({i}, {j})");
        }
    }

    #[test]
    fn test_invert_table() {
        let mut path = Path::from_stops([1, 2, 3, 4, 5, 6]);
        let data = [
            (1, 3, [1, 4, 3, 2, 5, 6]),
            (0, 4, [5, 2, 3, 4, 1, 6]),
            (2, 5, [5, 2, 6, 1, 4, 3]),
            (5, 0, [3, 4, 1, 6, 2, 5]),
            (2, 3, [3, 4, 6, 1, 2, 5]),
            (4, 4, [3, 4, 6, 1, 2, 5]),
        ];
        for (i, j, expected) in data {
            path.invert(i, j);
            assert_eq!(stops_of(&path), expected, "invert({i}, {j})");
        }
    }

    #[test]
    fn test_apply_dispatch() {
        let mut path = Path::from_stops([1, 2, 3, 4, 5, 6]);
        let data = [
            (Neighborhood::Swap, 1, 4, [1, 5, 3, 4, 2, 6]),
            (Neighborhood::Insert, 1, 4, [1, 3, 4, 2, 5, 6]),
            (Neighborhood::Invert, 1, 4, [1, 5, 2, 4, 3, 6]),
        ];
        for (neighborhood, i, j, expected) in data {
            path.apply(neighborhood, i, j);
            assert_eq!(stops_of(&path), expected, "{neighborhood:?}({i}, {j})");
        }
    }

    #[test]
    fn test_swap_and_invert_are_involutions() {
        let original = Path::from_stops([3, 1, 4, 1, 5, 9, 2, 6]);

        let mut path = original.clone();
        path.swap(2, 6);
        path.swap(2, 6);
        assert_eq!(path.stops(), original.stops());

        let mut path = original.clone();
        path.invert(1, 5);
        path.invert(1, 5);
        assert_eq!(path.stops(), original.stops());
        // No analogous assumption is made for insert; its reversal
        // behavior is not relied upon anywhere in the crate.
    }

    #[test]
    fn test_moves_invalidate_cached_distance() {
        let mut path = Path::from_stops([0, 1, 2, 0]);
        path.distance = Some(42);
        path.swap(1, 2);
        assert_eq!(path.distance, None);

        path.distance = Some(42);
        path.invert(1, 2);
        assert_eq!(path.distance, None);

        path.distance = Some(42);
        path.insert(1, 2);
        assert_eq!(path.distance, None);
    }
}
