//! The solver contract: named, parameterized strategies producing tours.
//!
//! Every solving strategy implements [`Solver`]: a display name, a fixed
//! table of configurable [`Property`] entries, and a `solve` method that
//! consumes a [`DistanceOracle`] and produces the best [`Path`] found,
//! optionally streaming [`SolverState`] snapshots through a
//! [`RunContext`](crate::runner::RunContext) along the way.

use crate::error::{Error, Result};
use crate::path::{Neighborhood, Path};
use crate::problem::DistanceOracle;
use crate::runner::RunContext;

/// Crossover operator kind for the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossoverKind {
    /// Order crossover (Davis, 1985).
    Ox,
    /// Partially matched crossover (Goldberg & Lingle, 1985).
    Pmx,
    /// Non-wrapping order crossover (Cicirello, 2006).
    Nwox,
}

/// A progress snapshot emitted by a streaming solver.
///
/// Exactly one state per run has `is_final == true`; it terminates the
/// stream and carries the best path found.
#[derive(Debug, Clone)]
pub struct SolverState {
    /// Completed fraction of the run, in `[0, 1]`.
    pub progress: f64,
    /// The tour the solver is currently working on, if any.
    pub current: Option<Path>,
    /// The best tour found so far, if any.
    pub best: Option<Path>,
    /// Whether this is the terminating state of the stream.
    pub is_final: bool,
    /// An optional path to emphasize (e.g. the neighbor just committed).
    pub highlight: Option<Path>,
}

impl SolverState {
    /// An intermediate (non-final) state.
    pub fn intermediate(progress: f64, current: Option<Path>, best: Option<Path>) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            current,
            best,
            is_final: false,
            highlight: None,
        }
    }

    /// The terminating state, carrying the best path found.
    pub fn finished(best: Option<Path>) -> Self {
        Self {
            progress: 1.0,
            current: None,
            best,
            is_final: true,
            highlight: None,
        }
    }
}

/// Value of a solver property.
///
/// The variant doubles as the property's type tag (see
/// [`PropertyValue::kind`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Neighborhood(Neighborhood),
    Crossover(CrossoverKind),
}

/// Type tag of a [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Float,
    Neighborhood,
    Crossover,
}

impl PropertyValue {
    /// The type tag of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Neighborhood(_) => PropertyKind::Neighborhood,
            PropertyValue::Crossover(_) => PropertyKind::Crossover,
        }
    }

    pub(crate) fn expect_int(&self, field: &str) -> Result<i64> {
        match self {
            PropertyValue::Int(v) => Ok(*v),
            _ => Err(Error::PropertyType {
                field: field.to_string(),
                expected: "integer",
            }),
        }
    }

    pub(crate) fn expect_float(&self, field: &str) -> Result<f64> {
        match self {
            PropertyValue::Float(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v as f64),
            _ => Err(Error::PropertyType {
                field: field.to_string(),
                expected: "float",
            }),
        }
    }

    pub(crate) fn expect_neighborhood(&self, field: &str) -> Result<Neighborhood> {
        match self {
            PropertyValue::Neighborhood(v) => Ok(*v),
            _ => Err(Error::PropertyType {
                field: field.to_string(),
                expected: "neighborhood",
            }),
        }
    }

    pub(crate) fn expect_crossover(&self, field: &str) -> Result<CrossoverKind> {
        match self {
            PropertyValue::Crossover(v) => Ok(*v),
            _ => Err(Error::PropertyType {
                field: field.to_string(),
                expected: "crossover",
            }),
        }
    }
}

/// A configurable solver parameter: display label, field name, and the
/// default value (whose variant carries the type).
#[derive(Debug, Clone, Copy)]
pub struct Property {
    /// Human-readable label for a selection UI.
    pub label: &'static str,
    /// Field name accepted by [`Solver::set_property`].
    pub field: &'static str,
    /// Default value; its variant is the property's type.
    pub default: PropertyValue,
}

/// A tour-optimization strategy.
///
/// Implementations are single-threaded, CPU-bound loops. They check
/// [`RunContext::is_cancelled`] once per iteration and return their best
/// tour so far within one iteration of observing cancellation.
pub trait Solver: Send {
    /// Display name of the strategy.
    fn name(&self) -> &'static str;

    /// The fixed set of configurable properties.
    ///
    /// Exact solvers expose none.
    fn properties(&self) -> &'static [Property] {
        &[]
    }

    /// Applies a property by field name.
    ///
    /// Fails with [`Error::UnknownProperty`] for fields not listed in
    /// [`properties`](Solver::properties) and [`Error::PropertyType`]
    /// for mismatched value kinds.
    fn set_property(&mut self, field: &str, _value: PropertyValue) -> Result<()> {
        Err(Error::UnknownProperty(field.to_string()))
    }

    /// Finds the best tour for the given instance.
    ///
    /// Fails fast with [`Error::EmptyProblem`] when the oracle has no
    /// cities, before any iteration runs.
    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path>;
}
