//! The generation loop: evaluate the current population, breed the fittest into the next one,
//! and keep a history of what came before.

use crate::{
    breed::{crossover, mutate, offspring_counts, pair_weights, pairs, MutationPolicy},
    chromosome::GeneRange,
    constants::{
        NEUROGA_HISTORY_DEFAULT, NEUROGA_KEEP_BESTS, NEUROGA_MUTATION_START, NEUROGA_N_BESTS,
    },
    error::{Error, Result},
    eval::Evaluator,
    individual::Individual,
    population::{Population, Stats},
    random::{default_rng, WyRng},
    structure::Structure,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-chromosome mutation chance as a function of the generation index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationSchedule {
    Constant { rate: f64 },
    /// Interpolates from `start` at generation 0 to `stop` at `generations`, and holds `stop`
    /// after that
    Linear {
        start: f64,
        stop: f64,
        generations: usize,
    },
}

impl MutationSchedule {
    pub fn rate(&self, generation: usize) -> f64 {
        let rate = match *self {
            Self::Constant { rate } => rate,
            Self::Linear { stop, generations: 0, .. } => stop,
            Self::Linear {
                start,
                stop,
                generations,
            } => {
                let t = generation.min(generations) as f64 / generations as f64;
                start + (stop - start) * t
            }
        };
        rate.clamp(0., 1.)
    }
}

/// Which past generations are kept in history. The current generation is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    All,
    /// The `k` most recent generations, current included
    Last(usize),
    /// The current generation, plus the `k` past generations with the best champions
    Best(usize),
}

impl Default for Retention {
    fn default() -> Self {
        Self::Last(NEUROGA_HISTORY_DEFAULT)
    }
}

/// Knobs for a single breeding round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    /// Fittest individuals used as breeding stock, raised to 2 if lower
    pub n_bests: usize,
    /// One weight per breeding stock member, fittest first. Uniform when absent
    pub weights: Option<Vec<f64>>,
    /// Chance for each chromosome of an offspring to mutate
    pub mutation_chance: f64,
    /// Fittest individuals copied unchanged into the next generation
    pub keep_bests: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            n_bests: NEUROGA_N_BESTS,
            weights: None,
            mutation_chance: NEUROGA_MUTATION_START,
            keep_bests: NEUROGA_KEEP_BESTS,
        }
    }
}

/// A population and its place in history. `stats` is filled in once it's been evaluated
#[derive(Debug, Clone)]
pub struct Generation {
    pub index: usize,
    pub population: Population,
    pub stats: Option<Stats>,
}

pub struct Evolution<R: RngCore = WyRng> {
    size: usize,
    structure: Structure,
    range: GeneRange,
    policy: MutationPolicy,
    retention: Retention,
    history: Vec<Generation>,
    generation: usize,
    rng: R,
}

impl Evolution<WyRng> {
    pub fn new(size: usize, structure: Structure, range: GeneRange) -> Result<Self> {
        Self::with_rng(size, structure, range, default_rng())
    }
}

impl<R: RngCore> Evolution<R> {
    /// Start from a random population of `size`, drawing every random number from `rng`
    pub fn with_rng(size: usize, structure: Structure, range: GeneRange, mut rng: R) -> Result<Self> {
        if size < 2 {
            return Err(Error::PopulationSize(size));
        }

        let population = Population::new(size, &structure, range, &mut rng);
        Self::from_population(population, 0, rng)
    }

    /// Resume from an existing population, numbered `generation`. Every individual must share
    /// one gene range, which breeding keeps offspring within.
    pub fn from_population(population: Population, generation: usize, rng: R) -> Result<Self> {
        let range = match population.get(0) {
            Some(first) if population.len() >= 2 => first.genome().range(),
            _ => return Err(Error::PopulationSize(population.len())),
        };

        if let Some(stray) = population
            .individuals()
            .iter()
            .find(|i| i.genome().range() != range)
        {
            let stray = stray.genome().range();
            return Err(Error::Config(format!(
                "gene range [{}, {}] in a population bred within [{}, {}]",
                stray.lo(),
                stray.hi(),
                range.lo(),
                range.hi()
            )));
        }

        Ok(Self {
            size: population.len(),
            structure: population.structure().clone(),
            range,
            policy: MutationPolicy::default(),
            retention: Retention::default(),
            history: vec![Generation {
                index: generation,
                population,
                stats: None,
            }],
            generation,
            rng,
        })
    }

    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self.retain();
        self
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    #[inline]
    pub fn range(&self) -> GeneRange {
        self.range
    }

    /// Index of the current generation
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn history(&self) -> &[Generation] {
        &self.history
    }

    pub fn current(&self) -> &Population {
        &self.current_generation().population
    }

    fn current_generation(&self) -> &Generation {
        // history is never empty, retention always spares the current generation
        &self.history[self.history.len() - 1]
    }

    /// The most recent generation that has been evaluated
    pub fn last_evaluated(&self) -> Option<&Generation> {
        self.history.iter().rev().find(|g| g.stats.is_some())
    }

    /// Evaluate the current generation, returning its stats
    pub fn evaluate<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) -> Stats {
        let last = self.history.len() - 1;
        self.history[last].population.evaluate_all(evaluator);
        self.record()
    }

    /// Evaluate the current generation across threads, one evaluator per worker from `context`
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel<E, F>(&mut self, context: F) -> Stats
    where
        E: Evaluator,
        F: Fn() -> E + Sync + Send,
    {
        let last = self.history.len() - 1;
        self.history[last].population.evaluate_all_parallel(context);
        self.record()
    }

    fn record(&mut self) -> Stats {
        let last = self.history.len() - 1;
        let current = &mut self.history[last];
        // populations are never smaller than 2
        let stats = current.population.stats().unwrap_or(Stats {
            best: f64::NAN,
            mean: f64::NAN,
            worst: f64::NAN,
        });
        current.stats = Some(stats);
        info!(
            generation = current.index,
            best = stats.best,
            mean = stats.mean,
            worst = stats.worst,
            "evaluated"
        );
        stats
    }

    /// Breed the evaluated current generation into the next one, which becomes current
    pub fn breed(&mut self, params: &TrainParams) -> Result<&Population> {
        let current = &self.history[self.history.len() - 1];
        if current.stats.is_none() {
            return Err(Error::NotEvaluated(current.index));
        }

        if !params.mutation_chance.is_finite() {
            return Err(Error::Config(format!(
                "mutation chance {} is not a number",
                params.mutation_chance
            )));
        }
        let chance = params.mutation_chance.clamp(0., 1.);

        let n_bests = params.n_bests.max(2);
        let mut weights = match &params.weights {
            None => vec![1.; n_bests],
            Some(w) if w.len() == n_bests => w.clone(),
            Some(w) => {
                return Err(Error::WeightCount {
                    expected: n_bests,
                    got: w.len(),
                })
            }
        };
        let n_bests = n_bests.min(self.size);
        weights.truncate(n_bests);

        let population = &current.population;
        let ranked = population.rank();
        let keep = params.keep_bests.min(self.size);
        let mut offspring = Vec::with_capacity(self.size);
        offspring.extend(
            ranked[..keep]
                .iter()
                .map(|idx| population.individuals()[*idx].duplicate()),
        );

        let stock = &ranked[..n_bests];
        let counts = offspring_counts(&pair_weights(&weights), self.size - keep);
        for ((l, r), count) in pairs(n_bests).into_iter().zip(counts) {
            let (l, r) = (
                population.individuals()[stock[l]].genome(),
                population.individuals()[stock[r]].genome(),
            );
            for _ in 0..count {
                let mut child = crossover(l, r, l.clone(), &mut self.rng)?;
                mutate(&mut child, chance, self.policy, &mut self.rng);
                offspring.push(Individual::from_genome(child));
            }
        }
        debug_assert_eq!(offspring.len(), self.size);

        let next = Population::from_individuals(&self.structure, offspring)?;
        self.generation += 1;
        debug!(
            generation = self.generation,
            n_bests, keep, chance, "bred next generation"
        );
        self.history.push(Generation {
            index: self.generation,
            population: next,
            stats: None,
        });
        self.retain();

        Ok(self.current())
    }

    /// Evaluate the current generation and breed the next one from it
    pub fn train<E: Evaluator + ?Sized>(
        &mut self,
        evaluator: &mut E,
        params: &TrainParams,
    ) -> Result<&Population> {
        self.evaluate(evaluator);
        self.breed(params)
    }

    fn retain(&mut self) {
        match self.retention {
            Retention::All => {}
            Retention::Last(k) => {
                let k = k.max(1);
                if self.history.len() > k {
                    self.history.drain(..self.history.len() - k);
                }
            }
            Retention::Best(k) => {
                let Some(current) = self.history.pop() else {
                    return;
                };

                if self.history.len() > k {
                    let best = |g: &Generation| {
                        g.stats
                            .map(|s| s.best)
                            .filter(|b| !b.is_nan())
                            .unwrap_or(f64::NEG_INFINITY)
                    };
                    let mut order = (0..self.history.len()).collect::<Vec<_>>();
                    order.sort_by(|&l, &r| best(&self.history[r]).total_cmp(&best(&self.history[l])));
                    let mut keep = vec![false; self.history.len()];
                    for idx in order.into_iter().take(k) {
                        keep[idx] = true;
                    }
                    let mut keep = keep.into_iter();
                    self.history.retain(|_| keep.next().unwrap_or(false));
                }

                self.history.push(current);
            }
        }
    }
}
