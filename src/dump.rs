//! Snapshots of a generation's decoded weights, for inspecting a run or resuming one.

use crate::{
    chromosome::GeneRange,
    codec::{encode, Layer},
    error::Result,
    individual::Individual,
    population::Population,
    structure::Structure,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationDump {
    pub generation: usize,
    pub best_fitness: Option<f64>,
    pub structure: Structure,
    /// Decoded layers of every individual, in population order
    pub individuals: Vec<Vec<Layer>>,
}

impl GenerationDump {
    /// Rebuild the dumped population. `range` should cover every dumped weight, or encoding
    /// will clip them.
    pub fn population(&self, range: GeneRange) -> Result<Population> {
        let individuals = self
            .individuals
            .iter()
            .map(|layers| encode(&self.structure, layers, range).map(Individual::from_genome))
            .collect::<Result<Vec<_>>>()?;
        Population::from_individuals(&self.structure, individuals)
    }

    pub fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

impl Population {
    /// Snapshot this population as generation `generation`. The best fitness is only recorded
    /// once every individual has been evaluated.
    pub fn dump(&self, generation: usize) -> GenerationDump {
        GenerationDump {
            generation,
            best_fitness: self
                .is_evaluated()
                .then(|| self.best(1).first().copied())
                .flatten(),
            structure: self.structure().clone(),
            individuals: self
                .individuals()
                .iter()
                .map(|i| i.weights().to_vec())
                .collect(),
        }
    }
}
