//! Genetic algorithm: population search with elitism, roulette
//! selection, permutation crossover, and neighborhood mutation.

pub mod operators;

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{Error, Result};
use crate::path::{Neighborhood, Path};
use crate::problem::{require_cities, DistanceOracle};
use crate::rng::create_rng;
use crate::runner::RunContext;
use crate::solver::Solver;
use crate::solver::{CrossoverKind, Property, PropertyValue};

use super::{canonical_tour, random_interior_pair};
use operators::{nwox_crossover, order_crossover, pmx_crossover};

const PROPERTIES: &[Property] = &[
    Property {
        label: "Population size",
        field: "population_size",
        default: PropertyValue::Int(80),
    },
    Property {
        label: "Elite size",
        field: "elite_size",
        default: PropertyValue::Int(30),
    },
    Property {
        label: "Mutation rate",
        field: "mutation_rate",
        default: PropertyValue::Float(0.05),
    },
    Property {
        label: "Generations",
        field: "generations",
        default: PropertyValue::Int(2000),
    },
    Property {
        label: "Run time [ms]",
        field: "run_time",
        default: PropertyValue::Int(0),
    },
    Property {
        label: "Crossover",
        field: "crossover_type",
        default: PropertyValue::Crossover(CrossoverKind::Nwox),
    },
    Property {
        label: "Mutation",
        field: "mutation_type",
        default: PropertyValue::Neighborhood(Neighborhood::Invert),
    },
];

/// Evolves a population of tours. Each generation keeps the elite
/// unchanged, fills a mating pool by inverse-distance roulette, breeds
/// children pairwise with the configured crossover, and mutates
/// non-elite individuals with the configured neighborhood move.
///
/// Termination is either generation-driven (the default) or time-driven
/// when `run_time` is nonzero, never both.
///
/// The property table covers the search parameters only; `seed` is a
/// programmatic reproducibility control set through
/// [`with_seed`](Self::with_seed).
#[derive(Debug, Clone)]
pub struct GeneticAlgorithmSolver {
    pub population_size: usize,
    /// Individuals copied unchanged into the next generation.
    pub elite_size: usize,
    /// Probability that a non-elite individual mutates, in `[0, 1]`.
    pub mutation_rate: f64,
    pub generations: usize,
    /// Wall-clock budget in milliseconds; `0` selects generation-driven
    /// termination.
    pub run_time: u64,
    pub crossover_type: CrossoverKind,
    pub mutation_type: Neighborhood,
    /// RNG seed; `None` draws one from entropy. Not in the property
    /// table.
    pub seed: Option<u64>,
}

impl Default for GeneticAlgorithmSolver {
    fn default() -> Self {
        Self {
            population_size: 80,
            elite_size: 30,
            mutation_rate: 0.05,
            generations: 2000,
            run_time: 0,
            crossover_type: CrossoverKind::Nwox,
            mutation_type: Neighborhood::Invert,
            seed: None,
        }
    }
}

impl GeneticAlgorithmSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_elite_size(mut self, elite_size: usize) -> Self {
        self.elite_size = elite_size;
        self
    }

    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_run_time(mut self, run_time: u64) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn with_crossover(mut self, crossover_type: CrossoverKind) -> Self {
        self.crossover_type = crossover_type;
        self
    }

    pub fn with_mutation(mut self, mutation_type: Neighborhood) -> Self {
        self.mutation_type = mutation_type;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::Config("population_size must be at least 2".into()));
        }
        if self.elite_size >= self.population_size {
            return Err(Error::Config(
                "elite_size must be below population_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::Config("mutation_rate must be in [0, 1]".into()));
        }
        if self.run_time == 0 && self.generations == 0 {
            return Err(Error::Config(
                "generations must be positive for generation-driven runs".into(),
            ));
        }
        Ok(())
    }

    fn init_population(
        &self,
        oracle: &dyn DistanceOracle,
        rng: &mut rand::rngs::StdRng,
    ) -> Result<Vec<Path>> {
        let n = oracle.dimension();
        let mut population = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size {
            let mut stops: Vec<usize> = (0..n).collect();
            stops.push(0);
            let mut path = Path::from_stops(stops);
            path.shuffle(1, n, rng);
            population.push(path);
        }
        score_all(oracle, &mut population)?;
        population.sort_by_key(|p| p.distance);
        Ok(population)
    }

    /// Elites plus inverse-distance roulette picks: shorter tours get
    /// proportionally larger wheel slices.
    fn selection(&self, population: &[Path], rng: &mut rand::rngs::StdRng) -> Vec<Path> {
        let mut pool: Vec<Path> = population[..self.elite_size].to_vec();

        let max_dist = population
            .iter()
            .filter_map(|p| p.distance)
            .max()
            .unwrap_or(0);
        let weights: Vec<f64> = population
            .iter()
            .map(|p| (max_dist - p.distance.unwrap_or(max_dist)) as f64 + 1.0)
            .collect();
        let total: f64 = weights.iter().sum();

        for _ in 0..self.population_size - self.elite_size {
            let threshold = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            let mut picked = population.len() - 1;
            for (index, weight) in weights.iter().enumerate() {
                cumulative += weight;
                if threshold < cumulative {
                    picked = index;
                    break;
                }
            }
            pool.push(population[picked].clone());
        }

        pool
    }

    fn crossover(&self, parent1: &Path, parent2: &Path, start: usize, end: usize) -> Path {
        match self.crossover_type {
            CrossoverKind::Ox => order_crossover(parent1, parent2, start, end),
            CrossoverKind::Pmx => pmx_crossover(parent1, parent2, start, end),
            CrossoverKind::Nwox => nwox_crossover(parent1, parent2, start, end),
        }
    }

    /// Next generation: elites carried over, the rest bred unscored
    /// from consecutive mating-pool pairs.
    fn breeding(
        &self,
        oracle: &dyn DistanceOracle,
        population: &[Path],
        pool: &[Path],
        rng: &mut rand::rngs::StdRng,
    ) -> Vec<Path> {
        let n = oracle.dimension();
        let mut next: Vec<Path> = population[..self.elite_size].to_vec();

        let mut pair = 0usize;
        while next.len() < self.population_size {
            let parent1 = &pool[pair % pool.len()];
            let parent2 = &pool[(pair + 1) % pool.len()];
            let (start, end) = rand_subpath(rng, n);
            next.push(self.crossover(parent1, parent2, start, end));
            pair += 1;
        }

        next
    }

    fn mutation(
        &self,
        oracle: &dyn DistanceOracle,
        population: &mut [Path],
        rng: &mut rand::rngs::StdRng,
    ) {
        let n = oracle.dimension();
        for individual in population[self.elite_size..].iter_mut() {
            if rng.random::<f64>() < self.mutation_rate {
                let (i, j) = random_interior_pair(rng, n);
                individual.apply(self.mutation_type, i, j);
            }
        }
    }
}

/// Scores every unscored individual; already-scored elites are skipped.
#[cfg(feature = "parallel")]
fn score_all(oracle: &dyn DistanceOracle, population: &mut [Path]) -> Result<()> {
    use rayon::prelude::*;
    population.par_iter_mut().try_for_each(|path| {
        if path.distance.is_none() {
            path.distance = Some(oracle.path_dist(path)?);
        }
        Ok(())
    })
}

/// Scores every unscored individual; already-scored elites are skipped.
#[cfg(not(feature = "parallel"))]
fn score_all(oracle: &dyn DistanceOracle, population: &mut [Path]) -> Result<()> {
    for path in population.iter_mut() {
        if path.distance.is_none() {
            path.distance = Some(oracle.path_dist(path)?);
        }
    }
    Ok(())
}

/// A random interior slice `(start, end)` with `start < end`.
fn rand_subpath(rng: &mut rand::rngs::StdRng, dimension: usize) -> (usize, usize) {
    let (i, j) = random_interior_pair(rng, dimension);
    (i.min(j), i.max(j))
}

impl Solver for GeneticAlgorithmSolver {
    fn name(&self) -> &'static str {
        "Genetic Algorithm"
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
            "population_size" => {
                self.population_size = non_negative(field, value.expect_int(field)?)?;
            }
            "elite_size" => self.elite_size = non_negative(field, value.expect_int(field)?)?,
            "mutation_rate" => self.mutation_rate = value.expect_float(field)?,
            "generations" => self.generations = non_negative(field, value.expect_int(field)?)?,
            "run_time" => {
                self.run_time = u64::try_from(value.expect_int(field)?)
                    .map_err(|_| Error::Config("run_time must be non-negative".into()))?;
            }
            "crossover_type" => self.crossover_type = value.expect_crossover(field)?,
            "mutation_type" => self.mutation_type = value.expect_neighborhood(field)?,
            _ => return Err(Error::UnknownProperty(field.to_string())),
        }
        Ok(())
    }

    fn solve(&mut self, oracle: &dyn DistanceOracle, ctx: &mut RunContext) -> Result<Path> {
        let n = require_cities(oracle)?;
        self.validate()?;
        if n < 3 {
            // No interior slice to cross over or mutate.
            return canonical_tour(oracle);
        }

        let mut rng = create_rng(self.seed);
        let mut population = self.init_population(oracle, &mut rng)?;
        let mut best = population[0].clone();

        let time_bounded = self.run_time > 0;
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.run_time);

        let mut generation = 0usize;
        loop {
            if ctx.is_cancelled() {
                break;
            }
            if !time_bounded && generation >= self.generations {
                break;
            }

            let pool = self.selection(&population, &mut rng);
            population = self.breeding(oracle, &population, &pool, &mut rng);
            self.mutation(oracle, &mut population, &mut rng);
            score_all(oracle, &mut population)?;
            population.sort_by_key(|p| p.distance);

            if population[0].distance < best.distance {
                best = population[0].clone();
                tracing::debug!(distance = best.distance, generation, "new incumbent");
            }

            generation += 1;
            let progress = if time_bounded {
                started.elapsed().as_millis() as f64 / self.run_time as f64
            } else {
                generation as f64 / self.generations as f64
            };
            ctx.publish(progress, Some(&population[0]), Some(&best));

            if time_bounded && Instant::now() >= deadline {
                break;
            }
        }

        Ok(best)
    }
}
