use crate::{
    chromosome::{GeneRange, Genome},
    codec::{decode, Layer},
    eval::Evaluator,
    structure::Structure,
};
use rand::Rng;

/// One candidate network: its genes, the weights decoded from them, and how fit it was found to
/// be. Weights are only ever derived from the genome, so the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    weights: Vec<Layer>,
    fitness: f64,
    evaluated: bool,
}

impl Individual {
    /// A randomly initialized individual. Its fitness is a random placeholder until
    /// [Individual::evaluate] is called.
    pub fn new(structure: &Structure, range: GeneRange, rng: &mut impl Rng) -> Self {
        let genome = Genome::random(structure, range, rng);
        let mut individual = Self::from_genome(genome);
        individual.fitness = rng.random();
        individual
    }

    pub fn from_genome(genome: Genome) -> Self {
        Self {
            weights: decode(&genome),
            genome,
            fitness: 0.,
            evaluated: false,
        }
    }

    /// Score this individual's weights, and remember the score as its fitness
    pub fn evaluate<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) -> f64 {
        self.fitness = evaluator.evaluate(&self.weights);
        self.evaluated = true;
        self.fitness
    }

    /// A fully independent copy
    #[inline]
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[inline]
    pub fn weights(&self) -> &[Layer] {
        &self.weights
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        self.genome.structure()
    }
}
