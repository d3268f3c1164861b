//! Genes, chromosomes, and the flat gene arena every [crate::Individual] is built on.
//!
//! A chromosome holds the incoming weights of one neuron followed by its bias. Rather than
//! nesting one allocation per neuron, a [Genome] stores every chromosome of a network back to
//! back in a single buffer, and hands out slices of it indexed by (layer, neuron).

use crate::{
    constants::{NEUROGA_GENE_MAX, NEUROGA_GENE_MIN},
    error::{Error, Result},
    structure::Structure,
};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Closed interval `[lo, hi]` that every gene is kept within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct GeneRange {
    lo: f64,
    hi: f64,
}

impl GeneRange {
    /// Reversed bounds are swapped rather than rejected
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        if !lo.is_finite() || !hi.is_finite() || Uniform::new_inclusive(lo, hi).is_err() {
            return Err(Error::Range { lo, hi });
        }

        Ok(Self { lo, hi })
    }

    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lo, self.hi)
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        (self.lo..=self.hi).contains(&v)
    }

    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match Uniform::new_inclusive(self.lo, self.hi) {
            Ok(dist) => dist.sample(rng),
            Err(_) => self.lo,
        }
    }
}

impl Default for GeneRange {
    fn default() -> Self {
        Self {
            lo: NEUROGA_GENE_MIN,
            hi: NEUROGA_GENE_MAX,
        }
    }
}

impl TryFrom<(f64, f64)> for GeneRange {
    type Error = Error;

    fn try_from((lo, hi): (f64, f64)) -> Result<Self> {
        Self::new(lo, hi)
    }
}

impl From<GeneRange> for (f64, f64) {
    fn from(range: GeneRange) -> Self {
        (range.lo, range.hi)
    }
}

/// The weights feeding a single neuron, bias last
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<f64>,
    range: GeneRange,
}

impl Chromosome {
    /// Build from known genes, clamping each into range
    pub fn new(genes: Vec<f64>, range: GeneRange) -> Self {
        Self {
            genes: genes.into_iter().map(|g| range.clamp(g)).collect(),
            range,
        }
    }

    pub fn random(len: usize, range: GeneRange, rng: &mut impl Rng) -> Self {
        Self {
            genes: (0..len).map(|_| range.sample(rng)).collect(),
            range,
        }
    }

    pub fn zeroed(len: usize, range: GeneRange) -> Self {
        Self::new(vec![0.; len], range)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[inline]
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    #[inline]
    pub fn range(&self) -> GeneRange {
        self.range
    }

    #[inline]
    pub fn bias(&self) -> Option<f64> {
        self.genes.last().copied()
    }
}

/// Every chromosome of one network, stored contiguously layer by layer, neuron by neuron.
/// Cloning copies the whole arena, so an offspring can never alias its parents' genes.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    structure: Structure,
    range: GeneRange,
    genes: Vec<f64>,
}

impl Genome {
    pub fn random(structure: &Structure, range: GeneRange, rng: &mut impl Rng) -> Self {
        Self {
            genes: (0..structure.gene_count())
                .map(|_| range.sample(rng))
                .collect(),
            structure: structure.clone(),
            range,
        }
    }

    /// Build from a flat gene buffer laid out as [Structure::offset] describes. Genes are
    /// clamped into `range`.
    pub fn from_genes(structure: &Structure, range: GeneRange, genes: Vec<f64>) -> Result<Self> {
        if genes.len() != structure.gene_count() {
            return Err(Error::Shape {
                context: "genome genes",
                expected: structure.gene_count(),
                got: genes.len(),
            });
        }

        Ok(Self {
            genes: genes.into_iter().map(|g| range.clamp(g)).collect(),
            structure: structure.clone(),
            range,
        })
    }

    /// Build from one list of chromosomes per weight layer, one chromosome per neuron.
    /// Any disagreement with `structure` is an error, nothing is padded or truncated.
    pub fn from_chromosomes(
        structure: &Structure,
        range: GeneRange,
        chromosomes: &[Vec<Chromosome>],
    ) -> Result<Self> {
        if chromosomes.len() != structure.depth() {
            return Err(Error::Shape {
                context: "chromosome layers",
                expected: structure.depth(),
                got: chromosomes.len(),
            });
        }

        let mut genes = Vec::with_capacity(structure.gene_count());
        for (layer, neurons) in chromosomes.iter().enumerate() {
            if neurons.len() != structure.neurons(layer) {
                return Err(Error::Shape {
                    context: "chromosomes per layer",
                    expected: structure.neurons(layer),
                    got: neurons.len(),
                });
            }

            for chromosome in neurons {
                if chromosome.len() != structure.chromosome_len(layer) {
                    return Err(Error::Shape {
                        context: "chromosome length",
                        expected: structure.chromosome_len(layer),
                        got: chromosome.len(),
                    });
                }
                genes.extend(chromosome.genes().iter().map(|g| range.clamp(*g)));
            }
        }

        Ok(Self {
            structure: structure.clone(),
            range,
            genes,
        })
    }

    pub fn to_chromosomes(&self) -> Vec<Vec<Chromosome>> {
        (0..self.structure.depth())
            .map(|layer| {
                (0..self.structure.neurons(layer))
                    .map(|neuron| Chromosome {
                        genes: self.chromosome(layer, neuron).to_vec(),
                        range: self.range,
                    })
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    #[inline]
    pub fn range(&self) -> GeneRange {
        self.range
    }

    #[inline]
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    pub fn chromosome(&self, layer: usize, neuron: usize) -> &[f64] {
        let start = self.structure.offset(layer, neuron);
        &self.genes[start..start + self.structure.chromosome_len(layer)]
    }

    /// Writes through this slice are not clamped, callers must keep genes in [Genome::range]
    pub fn chromosome_mut(&mut self, layer: usize, neuron: usize) -> &mut [f64] {
        let start = self.structure.offset(layer, neuron);
        let len = self.structure.chromosome_len(layer);
        &mut self.genes[start..start + len]
    }

    /// Every (layer, neuron) position in arena order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.structure.depth())
            .flat_map(move |layer| (0..self.structure.neurons(layer)).map(move |n| (layer, n)))
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = (usize, usize, &[f64])> {
        self.positions()
            .map(move |(layer, neuron)| (layer, neuron, self.chromosome(layer, neuron)))
    }

    pub fn chromosome_count(&self) -> usize {
        (0..self.structure.depth())
            .map(|layer| self.structure.neurons(layer))
            .sum()
    }

    pub fn in_range(&self) -> bool {
        self.genes.iter().all(|g| self.range.contains(*g))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_gene_range_normalized() {
        let range = GeneRange::new(2., -3.).unwrap();
        assert_eq!(range.lo(), -3.);
        assert_eq!(range.hi(), 2.);
        assert!(range.contains(0.));
        assert!(!range.contains(2.5));
        assert_eq!(range.clamp(10.), 2.);
        assert_eq!(range.clamp(-10.), -3.);
    }

    #[test]
    fn test_gene_range_rejects_non_finite() {
        assert!(GeneRange::new(f64::NAN, 1.).is_err());
        assert!(GeneRange::new(0., f64::INFINITY).is_err());
    }

    #[test]
    fn test_gene_range_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = GeneRange::new(-0.5, 0.25).unwrap();
        for _ in 0..10_000 {
            assert!(range.contains(range.sample(&mut rng)));
        }

        let point = GeneRange::new(0.3, 0.3).unwrap();
        assert!(point.is_degenerate());
        assert_eq!(point.sample(&mut rng), 0.3);
    }

    #[test]
    fn test_gene_range_serde() {
        let range = GeneRange::new(1., -1.).unwrap();
        assert_eq!(serde_json::to_string(&range).unwrap(), "[-1.0,1.0]");
        let back = serde_json::from_str::<GeneRange>("[1.0,-1.0]").unwrap();
        assert_eq!(back, range);
    }

    #[test]
    fn test_chromosome_clamped() {
        let range = GeneRange::new(-1., 1.).unwrap();
        let c = Chromosome::new(vec![-4., 0.5, 9.], range);
        assert_eq!(c.genes(), &[-1., 0.5, 1.]);
        assert_eq!(c.bias(), Some(1.));
        assert_eq!(Chromosome::zeroed(3, range).genes(), &[0., 0., 0.]);
    }

    #[test]
    fn test_chromosome_random_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let range = GeneRange::new(3., 5.).unwrap();
        let c = Chromosome::random(100, range, &mut rng);
        assert_eq!(c.len(), 100);
        assert!(c.genes().iter().all(|g| range.contains(*g)));
    }

    #[test]
    fn test_genome_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let structure = Structure::new(vec![4, 3, 2]).unwrap();
        let genome = Genome::random(&structure, GeneRange::default(), &mut rng);
        assert_eq!(genome.chromosome_count(), 5);
        for (layer, _, chromosome) in genome.chromosomes() {
            assert_eq!(chromosome.len(), structure.layers()[layer] + 1);
        }
        assert!(genome.in_range());
    }

    #[test]
    fn test_genome_chromosomes_round_trip() {
        let mut rng = StdRng::seed_from_u64(4);
        let structure = Structure::new(vec![3, 2, 2]).unwrap();
        let genome = Genome::random(&structure, GeneRange::default(), &mut rng);
        let nested = genome.to_chromosomes();
        let back = Genome::from_chromosomes(&structure, genome.range(), &nested).unwrap();
        assert_eq!(genome, back);
    }

    #[test]
    fn test_genome_from_chromosomes_shape_mismatch() {
        let structure = Structure::new(vec![2, 1]).unwrap();
        let range = GeneRange::default();

        let short = vec![vec![Chromosome::zeroed(2, range)]];
        assert!(matches!(
            Genome::from_chromosomes(&structure, range, &short),
            Err(Error::Shape {
                expected: 3,
                got: 2,
                ..
            })
        ));

        let extra = vec![vec![
            Chromosome::zeroed(3, range),
            Chromosome::zeroed(3, range),
        ]];
        assert!(Genome::from_chromosomes(&structure, range, &extra).is_err());

        let layers = vec![
            vec![Chromosome::zeroed(3, range)],
            vec![Chromosome::zeroed(2, range)],
        ];
        assert!(Genome::from_chromosomes(&structure, range, &layers).is_err());
    }

    #[test]
    fn test_genome_chromosome_mut_is_isolated() {
        let mut rng = StdRng::seed_from_u64(5);
        let structure = Structure::new(vec![2, 2]).unwrap();
        let parent = Genome::random(&structure, GeneRange::default(), &mut rng);
        let mut child = parent.clone();
        child.chromosome_mut(0, 1)[0] = 0.123;
        assert_eq!(child.chromosome(0, 1)[0], 0.123);
        assert_ne!(parent.chromosome(0, 1)[0], 0.123);
        assert_eq!(parent.chromosome(0, 0), child.chromosome(0, 0));
    }
}
