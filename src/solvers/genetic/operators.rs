//! Permutation crossover operators.
//!
//! Each operator copies the slice `[start, end]` of the first parent
//! into the child and fills the remaining positions from the second
//! parent without duplicating cities. They operate on raw stop
//! sequences; scoring is the caller's job.
//!
//! Parents must be fully set and of equal length.

use std::collections::{HashMap, HashSet};

use crate::path::Path;

fn stop(parent: &Path, position: usize) -> usize {
    parent
        .get_stop(position)
        .expect("crossover parents must be complete paths")
}

/// Order crossover (OX).
///
/// The filler's cities are taken in the order they appear starting just
/// past the copied slice, wrapping around; cities already in the slice
/// are skipped.
pub fn order_crossover(parent1: &Path, parent2: &Path, start: usize, end: usize) -> Path {
    let len = parent1.len();
    assert_eq!(len, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < len, "invalid crossover slice");

    let mut child = Path::new(len);
    let mut subpath = HashSet::new();
    for position in start..=end {
        let city = stop(parent1, position);
        child.set_stop(position, city);
        subpath.insert(city);
    }

    let mut child_pos = (end + 1) % len;
    let mut parent_pos = (end + 1) % len;
    while child_pos != start {
        while subpath.contains(&stop(parent2, parent_pos)) {
            parent_pos = (parent_pos + 1) % len;
        }
        child.set_stop(child_pos, stop(parent2, parent_pos));
        child_pos = (child_pos + 1) % len;
        parent_pos = (parent_pos + 1) % len;
    }

    child
}

/// Partially matched crossover (PMX).
///
/// Positions outside the slice take the filler's city, substituted
/// through the slice mapping until the value is free of the copied
/// slice.
pub fn pmx_crossover(parent1: &Path, parent2: &Path, start: usize, end: usize) -> Path {
    let len = parent1.len();
    assert_eq!(len, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < len, "invalid crossover slice");

    let mut child = Path::new(len);
    let mut mapping = HashMap::new();
    for position in start..=end {
        child.set_stop(position, stop(parent1, position));
        mapping.insert(stop(parent1, position), stop(parent2, position));
    }

    for position in (0..len).filter(|p| *p < start || *p > end) {
        let mut city = stop(parent2, position);
        while let Some(&mapped) = mapping.get(&city) {
            city = mapped;
        }
        child.set_stop(position, city);
    }

    child
}

/// Non-wrapping order crossover (NWOX).
///
/// Like OX but the fill runs left to right without wrapping, so
/// position 0 keeps the filler's first eligible city. On closed tours
/// the one slot the duplicated start city cannot fill is the last; it
/// is set to the start city, preserving closure.
pub fn nwox_crossover(parent1: &Path, parent2: &Path, start: usize, end: usize) -> Path {
    let len = parent1.len();
    assert_eq!(len, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < len, "invalid crossover slice");

    let mut child = Path::new(len);
    for position in start..=end {
        child.set_stop(position, stop(parent1, position));
    }

    let mut child_pos = 0usize;
    let mut parent_pos = 0usize;
    while parent_pos < len && child_pos < len {
        if (start..=end).contains(&child_pos) {
            child_pos = end + 1;
            continue;
        }
        let city = stop(parent2, parent_pos);
        if child.in_path(city, len) {
            parent_pos += 1;
        } else {
            child.set_stop(child_pos, city);
            child_pos += 1;
            parent_pos += 1;
        }
    }

    if child.get_stop(len - 1).is_none() {
        child.set_stop(len - 1, 0);
    }

    child
}
