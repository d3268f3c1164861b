use crate::{
    error::{Error, Result},
    eval::Evaluator,
    evolution::{Evolution, MutationSchedule, TrainParams},
    individual::Individual,
    population::Stats,
};
use core::ops::ControlFlow;
use rand::RngCore;

/// When to stop evolving
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvolutionTarget {
    /// Some individual scored at least this much
    Fitness(f64),
    /// This many generations have been evaluated
    Generation(usize),
}

impl EvolutionTarget {
    fn satisfied(&self, stats: &Stats, generation: usize) -> bool {
        match self {
            Self::Fitness(t) => stats.best >= *t,
            Self::Generation(t) => *t <= generation,
        }
    }
}

/// What a hook sees after each evaluated generation
pub struct Report<'a> {
    pub generation: usize,
    pub stats: Stats,
    pub mutation_chance: f64,
    pub fittest: &'a Individual,
}

/// The last evaluated generation of a run, and its champion
#[derive(Debug, Clone)]
pub struct Outcome {
    pub generation: usize,
    pub stats: Stats,
    pub champion: Individual,
}

impl<R: RngCore> Evolution<R> {
    /// Evaluate and breed until `target` is met, or until `hook` breaks. `params` is used for
    /// every breeding round, with its mutation chance taken from `schedule` per generation.
    /// The generation that meets the target is not bred from.
    pub fn run<E, H>(
        &mut self,
        evaluator: &mut E,
        params: &TrainParams,
        schedule: &MutationSchedule,
        target: EvolutionTarget,
        mut hook: H,
    ) -> Result<Outcome>
    where
        E: Evaluator + ?Sized,
        H: FnMut(&Report<'_>) -> ControlFlow<()>,
    {
        let mut params = params.clone();
        loop {
            let generation = self.generation();
            params.mutation_chance = schedule.rate(generation);
            let stats = self.evaluate(evaluator);

            let champion = {
                let fittest = self
                    .current()
                    .fittest()
                    .ok_or(Error::PopulationSize(0))?;
                let report = Report {
                    generation,
                    stats,
                    mutation_chance: params.mutation_chance,
                    fittest,
                };
                (hook(&report).is_break() || target.satisfied(&stats, generation))
                    .then(|| fittest.duplicate())
            };

            if let Some(champion) = champion {
                break Ok(Outcome {
                    generation,
                    stats,
                    champion,
                });
            }

            self.breed(&params)?;
        }
    }
}
