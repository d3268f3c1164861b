use approx::relative_eq;
use clap::Parser;
use core::ops::ControlFlow;
use neuroga::{Config, EvolutionTarget, Layer, Structure};
use rulinalg::matrix::{BaseMatrixMut, Matrix};
use std::{error::Error, f64::consts::E, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const GENERATIONS: usize = 2_000;
const TARGET: f64 = 3.9;
const CASES: [([f64; 2], f64); 4] = [
    ([0., 0.], 0.),
    ([0., 1.], 1.),
    ([1., 0.], 1.),
    ([1., 1.], 0.),
];

/// Evolve a dense network to fit XOR
#[derive(Parser)]
#[command(version)]
struct Args {
    /// JSON run configuration, defaults apply when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Where to write the final generation
    #[arg(long, short)]
    dump: Option<PathBuf>,
}

fn steep_sigmoid(x: f64) -> f64 {
    1. / (1. + E.powf(-4.9 * x))
}

/// Dense forward pass, sigmoid on every layer
fn forward(layers: &[Layer], input: &[f64]) -> Vec<f64> {
    let mut x = Matrix::new(1, input.len(), input.to_vec());
    for layer in layers {
        let bias = Matrix::new(1, layer.bias.len(), layer.bias.clone());
        x = (x * &layer.weights + bias).apply(&steep_sigmoid);
    }
    x.into_vec()
}

fn xor(layers: &[Layer]) -> f64 {
    CASES.iter().fold(0., |fit, (input, want)| {
        let have = forward(layers, input)[0];
        if relative_eq!(have, *want, epsilon = 0.01) {
            fit + 1.
        } else {
            fit + 1. - (want - have).powi(2)
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut evolution = config.evolution(Structure::new(vec![2, 3, 1])?)?;
    let outcome = evolution.run(
        &mut xor,
        &config.params(0),
        &config.schedule,
        EvolutionTarget::Fitness(TARGET),
        |report| {
            if report.generation % 50 == 0 {
                info!(
                    generation = report.generation,
                    best = report.stats.best,
                    mean = report.stats.mean,
                    mutation = report.mutation_chance,
                    "progress"
                );
            }

            if report.generation >= GENERATIONS {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
    )?;

    info!(
        generation = outcome.generation,
        fitness = outcome.champion.fitness(),
        "done"
    );
    for (input, want) in CASES {
        info!(
            ?input,
            want,
            have = forward(outcome.champion.weights(), &input)[0],
            "champion"
        );
    }

    if let Some(path) = &args.dump {
        evolution.current().dump(outcome.generation).to_file(path)?;
        info!(path = %path.display(), "dumped final generation");
    }

    Ok(())
}
