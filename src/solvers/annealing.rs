//! Simulated annealing over random neighborhood moves.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{Error, Result};
use crate::path::{Neighborhood, Path};
use crate::problem::{require_cities, DistanceOracle};
use crate::runner::RunContext;
use crate::solver::Solver;
use crate::solver::{Property, PropertyValue};

use super::{canonical_tour, random_interior_pair, random_tour};

const PROPERTIES: &[Property] = &[
    Property {
        label: "Initial temperature",
        field: "init_temp",
        default: PropertyValue::Float(100.0),
    },
    Property {
        label: "End temperature",
        field: "end_temp",
        default: PropertyValue::Float(0.1),
    },
    Property {
        label: "Cooling rate",
        field: "cooling_rate",
        default: PropertyValue::Float(0.01),
    },
    Property {
        label: "Neighborhood",
        field: "neighborhood",
        default: PropertyValue::Neighborhood(Neighborhood::Invert),
    },
    Property {
        label: "Run time [ms]",
        field: "run_time",
        default: PropertyValue::Int(0),
    },
];

/// Random local search that sometimes accepts a worse tour, with the
/// acceptance odds decaying as the temperature cools geometrically.
///
/// Termination is either temperature-driven (the default) or
/// time-driven when `run_time` is nonzero, never both.
///
/// The property table covers the search parameters only; `seed` is a
/// programmatic reproducibility control set through
/// [`with_seed`](Self::with_seed).
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingSolver {
    pub init_temp: f64,
    pub end_temp: f64,
    pub cooling_rate: f64,
    pub neighborhood: Neighborhood,
    /// Wall-clock budget in milliseconds; `0` selects temperature-driven
    /// termination.
    pub run_time: u64,
    /// RNG seed; `None` draws one from entropy. Not in the property
    /// table.
    pub seed: Option<u64>,
}

impl Default for SimulatedAnnealingSolver {
    fn default() -> Self {
        Self {
            init_temp: 100.0,
            end_temp: 0.1,
            cooling_rate: 0.01,
            neighborhood: Neighborhood::Invert,
            run_time: 0,
            seed: None,
        }
    }
}

impl SimulatedAnnealingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init_temp(mut self, init_temp: f64) -> Self {
        self.init_temp = init_temp;
        self
    }

    pub fn with_end_temp(mut self, end_temp: f64) -> Self {
        self.end_temp = end_temp;
        self
    }

    pub fn with_cooling_rate(mut self, cooling_rate: f64) -> Self {
        self.cooling_rate = cooling_rate;
        self
    }

    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    pub fn with_run_time(mut self, run_time: u64) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.init_temp <= 0.0 {
            return Err(Error::Config("init_temp must be positive".into()));
        }
        if self.end_temp <= 0.0 || self.end_temp >= self.init_temp {
            return Err(Error::Config(
                "end_temp must be positive and below init_temp".into(),
            ));
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(Error::Config("cooling_rate must be in (0, 1)".into()));
        }
        Ok(())
    }

    /// Iterations the cooling schedule will take, for progress
    /// reporting.
    fn estimated_iterations(&self) -> f64 {
        ((self.end_temp / self.init_temp).ln() / (1.0 - self.cooling_rate).ln())
            .ceil()
            .max(1.0)
    }
}

impl Solver for SimulatedAnnealingSolver {
    fn name(&self) -> &'static str {
        "Simulated Annealing"
    }

    fn properties(&self) -> &'static [Property] {
        PROPERTIES
    }

    fn set_property(&mut self, field: &str, value: PropertyValue) -> Result<()> {
        match field {
            "init_temp" => self.init_temp = value.expect_float(field)?,
            "end_temp" => self.end_temp = value.expect_float(field)?,
            "cooling_rate" => self.cooling_rate = value.expect_float(field)?,
            "neighborhood" => self.neighborhood = value.expect_neighborhood(field)?,
            "run_time" => {
                let ms = value.expect_int(field)?;
                self.run_time = u64::try_from(ms)
                    .map_err(|_| Error::Config("run_time must be non-negative".into()))?;
            }
            _ => return Err(Error::UnknownProperty(field.to_string())),
        }
        Ok(())
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        self.validate()?;
        if n < 3 {
            // No interior pair to move; the canonical tour is the only
            // one.
            return canonical_tour(oracle);
        }

        let mut rng = crate::rng::create_rng(self.seed);
        let mut current = random_tour(oracle, &mut rng)?;
        let mut current_dist = oracle.path_dist(&current)?;
        current.distance = Some(current_dist);
        let mut best = current.clone();
        let mut best_dist = current_dist;

        let time_bounded = self.run_time > 0;
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.run_time);
        let estimated = self.estimated_iterations();

        let mut temp = self.init_temp;
        let mut iteration = 0u64;
        loop {
            if ctx.is_cancelled() {
                break;
            }

            let (i, j) = random_interior_pair(&mut rng, n);
            let mut neighbor = current.clone();
            neighbor.apply(self.neighborhood, i, j);
            let neighbor_dist = oracle.path_dist(&neighbor)?;
            neighbor.distance = Some(neighbor_dist);

            if neighbor_dist < best_dist {
                best_dist = neighbor_dist;
                best = neighbor.clone();
                tracing::debug!(distance = best_dist, temp, "new incumbent");
            }

            if neighbor_dist <= current_dist {
                current = neighbor;
                current_dist = neighbor_dist;
            } else {
                let delta = (neighbor_dist - current_dist) as f64;
                if (-delta / temp).exp() > rng.random::<f64>() {
                    current = neighbor;
                    current_dist = neighbor_dist;
                }
            }

            temp *= 1.0 - self.cooling_rate;
            iteration += 1;

            let progress = if time_bounded {
                started.elapsed().as_millis() as f64 / self.run_time as f64
            } else {
                iteration as f64 / estimated
            };
            ctx.publish(progress, Some(&current), Some(&best));

            if time_bounded {
                if Instant::now() >= deadline {
                    break;
                }
            } else if temp < self.end_temp {
                break;
            }
        }

        Ok(best)
    }
}
