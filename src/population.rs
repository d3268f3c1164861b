//! A generation's worth of [Individual]s, and the ranking used to pick breeding stock from them.

use crate::{
    chromosome::GeneRange,
    error::{Error, Result},
    eval::Evaluator,
    individual::Individual,
    structure::Structure,
};
use core::cmp::Ordering;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Summary of the fitness of an evaluated population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
}

#[derive(Debug, Clone)]
pub struct Population {
    structure: Structure,
    individuals: Vec<Individual>,
}

/// NaN never outranks a real fitness
#[inline]
fn rank_key(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

impl Population {
    /// `size` freshly randomized individuals
    pub fn new(size: usize, structure: &Structure, range: GeneRange, rng: &mut impl Rng) -> Self {
        Self {
            individuals: (0..size)
                .map(|_| Individual::new(structure, range, rng))
                .collect(),
            structure: structure.clone(),
        }
    }

    /// Wrap existing individuals, who must all share `structure`
    pub fn from_individuals(structure: &Structure, individuals: Vec<Individual>) -> Result<Self> {
        if let Some(stray) = individuals.iter().find(|i| i.structure() != structure) {
            return Err(Error::Structure(format!(
                "individual with layers {:?} in a population of {:?}",
                stray.structure().layers(),
                structure.layers()
            )));
        }

        Ok(Self {
            structure: structure.clone(),
            individuals,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    #[inline]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Individual> {
        self.individuals.get(idx)
    }

    pub fn is_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    /// Evaluate every individual in order against a single evaluator
    pub fn evaluate_all<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) {
        let len = self.individuals.len();
        for (idx, individual) in self.individuals.iter_mut().enumerate() {
            let fitness = individual.evaluate(evaluator);
            trace!(individual = idx + 1, of = len, fitness, "evaluated");
            if fitness.is_nan() {
                warn!(individual = idx, "evaluator returned NaN, ranking it last");
            }
        }
    }

    /// Evaluate individuals across threads. `context` builds one evaluator per worker, so no
    /// evaluation context is ever shared between two running evaluations.
    #[cfg(feature = "parallel")]
    pub fn evaluate_all_parallel<E, F>(&mut self, context: F)
    where
        E: Evaluator,
        F: Fn() -> E + Sync + Send,
    {
        use rayon::prelude::*;

        self.individuals
            .par_iter_mut()
            .for_each_init(context, |evaluator, individual| {
                individual.evaluate(evaluator);
            });
    }

    /// Indices of individuals, fittest first. Equal fitnesses keep their insertion order.
    pub fn rank(&self) -> Vec<usize> {
        let mut order = (0..self.individuals.len()).collect::<Vec<_>>();
        order.sort_by(|&l, &r| {
            rank_key(self.individuals[r].fitness())
                .partial_cmp(&rank_key(self.individuals[l].fitness()))
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    /// Fitness of the `n_firsts` fittest individuals, fittest first
    pub fn best(&self, n_firsts: usize) -> Vec<f64> {
        self.rank()
            .into_iter()
            .take(n_firsts)
            .map(|idx| self.individuals[idx].fitness())
            .collect()
    }

    pub fn fittest(&self) -> Option<&Individual> {
        self.rank().first().map(|idx| &self.individuals[*idx])
    }

    pub fn stats(&self) -> Option<Stats> {
        if self.individuals.is_empty() {
            return None;
        }

        let fitness = self.individuals.iter().map(Individual::fitness);
        Some(Stats {
            best: fitness.clone().map(rank_key).fold(f64::NEG_INFINITY, f64::max),
            mean: fitness.clone().sum::<f64>() / self.individuals.len() as f64,
            worst: fitness.map(rank_key).fold(f64::INFINITY, f64::min),
        })
    }

    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }
}
