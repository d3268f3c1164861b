pub mod breed;
pub mod chromosome;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dump;
pub mod error;
pub mod eval;
pub mod evolution;
pub mod individual;
pub mod macros;
pub mod population;
pub mod random;
pub mod scenario;
pub mod serialize;
pub mod structure;

pub use breed::MutationPolicy;
pub use chromosome::{Chromosome, GeneRange, Genome};
pub use codec::{decode, encode, Layer};
pub use config::Config;
pub use dump::GenerationDump;
pub use error::{Error, Result};
pub use eval::Evaluator;
pub use evolution::{Evolution, Generation, MutationSchedule, Retention, TrainParams};
pub use individual::Individual;
pub use population::{Population, Stats};
pub use scenario::{EvolutionTarget, Outcome, Report};
pub use structure::Structure;
