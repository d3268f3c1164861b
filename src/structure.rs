use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Layer sizes of a fully connected feed-forward network, inputs first and outputs last.
/// Fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Structure(Vec<usize>);

impl Structure {
    pub fn new(layers: Vec<usize>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::Structure(format!(
                "need at least an input and an output layer, got {} layers",
                layers.len()
            )));
        }

        if let Some(idx) = layers.iter().position(|n| *n == 0) {
            return Err(Error::Structure(format!("layer {idx} has no neurons")));
        }

        Ok(Self(layers))
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.0[0]
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// Number of weight layers, one less than the number of neuron layers
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    /// Neurons fed by weight layer `layer`, each owning one chromosome
    #[inline]
    pub fn neurons(&self, layer: usize) -> usize {
        self.0[layer + 1]
    }

    /// Incoming connections of a neuron in weight layer `layer`, plus its bias
    #[inline]
    pub fn chromosome_len(&self, layer: usize) -> usize {
        self.0[layer] + 1
    }

    pub fn layer_genes(&self, layer: usize) -> usize {
        self.neurons(layer) * self.chromosome_len(layer)
    }

    pub fn gene_count(&self) -> usize {
        (0..self.depth()).map(|layer| self.layer_genes(layer)).sum()
    }

    /// Index of the first gene of chromosome (`layer`, `neuron`) in a flat gene arena
    pub fn offset(&self, layer: usize, neuron: usize) -> usize {
        debug_assert!(neuron < self.neurons(layer));
        (0..layer).map(|l| self.layer_genes(l)).sum::<usize>()
            + neuron * self.chromosome_len(layer)
    }
}

impl TryFrom<Vec<usize>> for Structure {
    type Error = Error;

    fn try_from(layers: Vec<usize>) -> Result<Self> {
        Self::new(layers)
    }
}

impl From<Structure> for Vec<usize> {
    fn from(structure: Structure) -> Self {
        structure.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_structure_rejects_degenerate() {
        assert!(matches!(Structure::new(vec![]), Err(Error::Structure(_))));
        assert!(matches!(Structure::new(vec![4]), Err(Error::Structure(_))));
        assert!(matches!(
            Structure::new(vec![4, 0, 2]),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn test_structure_sizes() {
        let s = Structure::new(vec![4, 3, 2]).unwrap();
        assert_eq!(s.inputs(), 4);
        assert_eq!(s.outputs(), 2);
        assert_eq!(s.depth(), 2);
        assert_eq!(s.neurons(0), 3);
        assert_eq!(s.chromosome_len(0), 5);
        assert_eq!(s.neurons(1), 2);
        assert_eq!(s.chromosome_len(1), 4);
        assert_eq!(s.gene_count(), 3 * 5 + 2 * 4);
    }

    #[test]
    fn test_structure_offset() {
        let s = Structure::new(vec![4, 3, 2]).unwrap();
        assert_eq!(s.offset(0, 0), 0);
        assert_eq!(s.offset(0, 2), 10);
        assert_eq!(s.offset(1, 0), 15);
        assert_eq!(s.offset(1, 1), 19);
    }

    #[test]
    fn test_structure_serde() {
        let s = Structure::new(vec![2, 3, 1]).unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "[2,3,1]");
        assert_eq!(serde_json::from_str::<Structure>("[2,3,1]").unwrap(), s);
        assert!(serde_json::from_str::<Structure>("[2]").is_err());
    }
}
