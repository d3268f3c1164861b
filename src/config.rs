//! Run configuration, read from JSON. Omitted fields fall back to [crate::constants].

use crate::{
    breed::MutationPolicy,
    chromosome::GeneRange,
    constants::{
        NEUROGA_KEEP_BESTS, NEUROGA_MUTATION_GENERATIONS, NEUROGA_MUTATION_START,
        NEUROGA_MUTATION_STOP, NEUROGA_N_BESTS, NEUROGA_POPULATION,
    },
    error::{Error, Result},
    evolution::{Evolution, MutationSchedule, Retention, TrainParams},
    random::WyRng,
    structure::Structure,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub population: usize,
    pub structure: Option<Structure>,
    pub range: GeneRange,
    pub n_bests: usize,
    pub weights: Option<Vec<f64>>,
    pub keep_bests: usize,
    pub schedule: MutationSchedule,
    pub policy: MutationPolicy,
    pub retention: Retention,
    /// Seed for the random source. Drawn from the OS when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: NEUROGA_POPULATION,
            structure: None,
            range: GeneRange::default(),
            n_bests: NEUROGA_N_BESTS,
            weights: None,
            keep_bests: NEUROGA_KEEP_BESTS,
            schedule: MutationSchedule::Linear {
                start: NEUROGA_MUTATION_START,
                stop: NEUROGA_MUTATION_STOP,
                generations: NEUROGA_MUTATION_GENERATIONS,
            },
            policy: MutationPolicy::default(),
            retention: Retention::default(),
            seed: None,
        }
    }
}

impl Config {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.population < 2 {
            return Err(Error::PopulationSize(self.population));
        }

        if self.keep_bests >= self.population {
            return Err(Error::Config(format!(
                "keeping {} of {} individuals leaves none to breed",
                self.keep_bests, self.population
            )));
        }

        if let Some(weights) = &self.weights {
            let n_bests = self.n_bests.max(2);
            if weights.len() != n_bests {
                return Err(Error::WeightCount {
                    expected: n_bests,
                    got: weights.len(),
                });
            }
        }

        Ok(())
    }

    /// Breeding parameters for `generation`
    pub fn params(&self, generation: usize) -> TrainParams {
        TrainParams {
            n_bests: self.n_bests,
            weights: self.weights.clone(),
            mutation_chance: self.schedule.rate(generation),
            keep_bests: self.keep_bests,
        }
    }

    /// An [Evolution] over `structure`, unless the config names its own
    pub fn evolution(&self, structure: Structure) -> Result<Evolution<WyRng>> {
        let rng = match self.seed {
            Some(seed) => WyRng::seeded(seed),
            None => crate::random::default_rng(),
        };
        self.evolution_with_rng(structure, rng)
    }

    pub fn evolution_with_rng<R: RngCore>(&self, structure: Structure, rng: R) -> Result<Evolution<R>> {
        self.validate()?;
        let structure = self.structure.clone().unwrap_or(structure);
        Ok(Evolution::with_rng(self.population, structure, self.range, rng)?
            .with_policy(self.policy)
            .with_retention(self.retention))
    }
}
