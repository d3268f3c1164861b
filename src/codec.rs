//! Conversion between a [Genome] and the per-layer weight matrices and bias vectors a dense
//! feed-forward evaluator consumes.
//!
//! Neuron `j` of weight layer `i` owns the chromosome `[w_0j, w_1j, ..., w_(k-1)j, b_j]`, where
//! `k` is the size of layer `i`. Stacking a layer's chromosomes column by column gives a
//! `k x n` weight matrix, and their last genes give the bias vector of length `n`.

use crate::{
    chromosome::{GeneRange, Genome},
    error::{Error, Result},
    serialize::{deserialize_matrix, deserialize_vec, serialize_matrix, serialize_vec},
    structure::Structure,
};
use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{Deserialize, Serialize};

/// Parameters of one dense layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// incoming x outgoing, indexed as [from, to]
    #[serde(
        serialize_with = "serialize_matrix",
        deserialize_with = "deserialize_matrix"
    )]
    pub weights: Matrix<f64>,
    #[serde(serialize_with = "serialize_vec", deserialize_with = "deserialize_vec")]
    pub bias: Vec<f64>,
}

impl Layer {
    #[inline]
    pub fn incoming(&self) -> usize {
        self.weights.rows()
    }

    #[inline]
    pub fn outgoing(&self) -> usize {
        self.weights.cols()
    }
}

pub fn decode(genome: &Genome) -> Vec<Layer> {
    let structure = genome.structure();
    (0..structure.depth())
        .map(|layer| {
            let incoming = structure.layers()[layer];
            let outgoing = structure.neurons(layer);
            let mut weights = vec![0.; incoming * outgoing];
            let mut bias = Vec::with_capacity(outgoing);
            for neuron in 0..outgoing {
                let (w, b) = genome.chromosome(layer, neuron).split_at(incoming);
                for (from, v) in w.iter().enumerate() {
                    weights[from * outgoing + neuron] = *v;
                }
                bias.push(b[0]);
            }

            Layer {
                weights: Matrix::new(incoming, outgoing, weights),
                bias,
            }
        })
        .collect()
}

/// The inverse of [decode]. Every gene is clamped into `range`, so a range narrower than the
/// weights being encoded will clip them.
pub fn encode(structure: &Structure, layers: &[Layer], range: GeneRange) -> Result<Genome> {
    if layers.len() != structure.depth() {
        return Err(Error::Shape {
            context: "weight layers",
            expected: structure.depth(),
            got: layers.len(),
        });
    }

    let mut genes = Vec::with_capacity(structure.gene_count());
    for (idx, layer) in layers.iter().enumerate() {
        let incoming = structure.layers()[idx];
        let outgoing = structure.neurons(idx);
        for (context, expected, got) in [
            ("weight matrix rows", incoming, layer.incoming()),
            ("weight matrix cols", outgoing, layer.outgoing()),
            ("bias length", outgoing, layer.bias.len()),
        ] {
            if expected != got {
                return Err(Error::Shape {
                    context,
                    expected,
                    got,
                });
            }
        }

        let data = layer.weights.data();
        for neuron in 0..outgoing {
            genes.extend((0..incoming).map(|from| data[from * outgoing + neuron]));
            genes.push(layer.bias[neuron]);
        }
    }

    Genome::from_genes(structure, range, genes)
}
