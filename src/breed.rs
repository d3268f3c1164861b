//! Selection weighting, offspring allocation, crossover and mutation. Everything here is a
//! plain function of its inputs and the random source it's handed.

use crate::{
    chromosome::Genome,
    error::{Error, Result},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a mutated gene gets its new value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPolicy {
    /// Draw a fresh value from the gene range, distinct from the old one unless the range is a
    /// single point
    #[default]
    Redraw,
    /// Flip the sign of the gene, clamped back into range. A gene at 0 is left unchanged
    Negate,
}

/// Every unordered pair of indices below `n`, never pairing an index with itself, in
/// lexicographic order. When indices are ranks, the fittest pair comes first.
pub fn pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|l| (l + 1..n).map(move |r| (l, r)))
        .collect()
}

/// Proportion of offspring each of [pairs] gets, given a weight per parent. A pair scores the
/// product of its parents' weights, so a pair is only favoured when both of its parents are.
///
/// Negative or non-finite weights, or weights whose pair products sum to zero, can't be
/// normalized and fall back to uniform proportions.
pub fn pair_weights(weights: &[f64]) -> Vec<f64> {
    let pairs = pairs(weights.len());
    if pairs.is_empty() {
        return vec![];
    }

    let uniform = || vec![1. / pairs.len() as f64; pairs.len()];
    if weights.iter().any(|w| !w.is_finite() || *w < 0.) {
        warn!(?weights, "negative or non-finite parent weights, weighting pairs uniformly");
        return uniform();
    }

    let products = pairs
        .iter()
        .map(|(l, r)| weights[*l] * weights[*r])
        .collect::<Vec<_>>();
    let total = products.iter().sum::<f64>();
    if !total.is_finite() || total <= 0. {
        warn!(?weights, total, "degenerate parent weights, weighting pairs uniformly");
        return uniform();
    }

    products.into_iter().map(|p| p / total).collect()
}

/// Split `population` offspring between pairs according to their `proportions`, in order. Each
/// pair asks for `ceil(proportion * population)`; the pair whose allocation would reach the
/// target is cut down to land on it exactly, and every pair after it gets none.
pub fn offspring_counts(proportions: &[f64], population: usize) -> Vec<usize> {
    let mut total = 0;
    let mut counts = Vec::with_capacity(proportions.len());
    for p in proportions {
        let want = (p.max(0.) * population as f64).ceil() as usize;
        if total + want >= population {
            counts.push(population - total);
            total = population;
        } else {
            counts.push(want);
            total += want;
        }
    }

    // proportions that sum to a hair under 1 can leave the last few unclaimed
    if total < population {
        if let Some(first) = counts.first_mut() {
            *first += population - total;
        }
    }

    debug!(?counts, population, "allocated offspring");
    counts
}

/// Recombine two parents into `template`. For every chromosome independently, a cut point is
/// drawn in `[0, len)`: genes before it come from `l`, genes from it onward come from `r`.
/// Copied genes are clamped into the template's range.
pub fn crossover(l: &Genome, r: &Genome, template: Genome, rng: &mut impl Rng) -> Result<Genome> {
    for parent in [l, r] {
        if parent.structure() != template.structure() {
            return Err(Error::Structure(format!(
                "cannot cross {:?} into {:?}",
                parent.structure().layers(),
                template.structure().layers()
            )));
        }
    }

    let mut child = template;
    let range = child.range();
    for (layer, neuron) in l.positions() {
        let (l_genes, r_genes) = (l.chromosome(layer, neuron), r.chromosome(layer, neuron));
        let cut = rng.random_range(0..l_genes.len());
        let genes = child.chromosome_mut(layer, neuron);
        for (idx, gene) in genes.iter_mut().enumerate() {
            let src = if idx < cut { l_genes[idx] } else { r_genes[idx] };
            *gene = range.clamp(src);
        }
    }

    Ok(child)
}

/// Give every chromosome a `chance` of having one randomly picked gene replaced according to
/// `policy`. Returns how many chromosomes were picked.
pub fn mutate(genome: &mut Genome, chance: f64, policy: MutationPolicy, rng: &mut impl Rng) -> usize {
    let range = genome.range();
    let mut mutated = 0;
    for (layer, neuron) in genome.positions().collect::<Vec<_>>() {
        if rng.random::<f64>() >= chance {
            continue;
        }

        let genes = genome.chromosome_mut(layer, neuron);
        let idx = rng.random_range(0..genes.len());
        let old = genes[idx];
        genes[idx] = match policy {
            MutationPolicy::Redraw if range.is_degenerate() => old,
            MutationPolicy::Redraw => loop {
                let v = range.sample(rng);
                if v != old {
                    break v;
                }
            },
            MutationPolicy::Negate => range.clamp(-old),
        };
        mutated += 1;
    }

    mutated
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, chromosome::GeneRange, structure::Structure};
    use rand::{rngs::StdRng, SeedableRng};

    fn genome(layers: Vec<usize>, seed: u64) -> Genome {
        let mut rng = StdRng::seed_from_u64(seed);
        Genome::random(&Structure::new(layers).unwrap(), GeneRange::default(), &mut rng)
    }

    #[test]
    fn test_pairs() {
        assert!(pairs(0).is_empty());
        assert!(pairs(1).is_empty());
        assert_eq!(pairs(2), vec![(0, 1)]);
        assert_eq!(pairs(4), vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(pairs(10).len(), 45);
    }

    #[test]
    fn test_pair_weights_two_uniform() {
        assert_eq!(pair_weights(&[1., 1.]), vec![1.]);
    }

    #[test]
    fn test_pair_weights_product() {
        // pairs (0,1) (0,2) (1,2) score 6, 3, 2
        let w = pair_weights(&[3., 2., 1.]);
        assert_f64_approx!(w[0], 6. / 11.);
        assert_f64_approx!(w[1], 3. / 11.);
        assert_f64_approx!(w[2], 2. / 11.);
        assert!((w.iter().sum::<f64>() - 1.).abs() < 1e-12);
    }

    #[test]
    fn test_pair_weights_weak_parent_suppressed() {
        // the best parent paired with a zero-weight parent gets nothing
        let w = pair_weights(&[5., 1., 0.]);
        assert_eq!(w[1], 0.);
        assert_eq!(w[2], 0.);
        assert_f64_approx!(w[0], 1.);
    }

    #[test]
    fn test_pair_weights_degenerate_uniform() {
        for weights in [
            vec![0., 0., 0.],
            vec![-1., -2., -3.],
            vec![1., f64::NAN, 1.],
            vec![1., 0., 0.],
        ] {
            let w = pair_weights(&weights);
            assert_eq!(w.len(), 3);
            for p in w {
                assert_f64_approx!(p, 1. / 3.);
            }
        }
    }

    #[test]
    fn test_offspring_counts_single_pair() {
        assert_eq!(offspring_counts(&[1.], 7), vec![7]);
    }

    #[test]
    fn test_offspring_counts_capped() {
        // ceil(0.5 * 5) = 3, ceil(0.3 * 5) = 2 reaches 5, last pair gets none
        assert_eq!(offspring_counts(&[0.5, 0.3, 0.2], 5), vec![3, 2, 0]);
        // ceil(0.9 * 4) = 4 reaches the target outright
        assert_eq!(offspring_counts(&[0.9, 0.1], 4), vec![4, 0]);
    }

    #[test]
    fn test_offspring_counts_conserved() {
        for n_bests in 2..12 {
            let weights = (0..n_bests).map(|i| (n_bests - i) as f64).collect::<Vec<_>>();
            let proportions = pair_weights(&weights);
            for population in 1..200 {
                let counts = offspring_counts(&proportions, population);
                assert_eq!(counts.len(), proportions.len());
                assert_eq!(counts.iter().sum::<usize>(), population, "{n_bests} {population}");
            }
        }
    }

    #[test]
    fn test_offspring_counts_drift() {
        let third = 1. / 3. - 1e-12;
        assert_eq!(offspring_counts(&[third, third, third], 3).iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_crossover_cut_per_chromosome() {
        let mut rng = StdRng::seed_from_u64(40);
        let structure = Structure::new(vec![6, 5, 3]).unwrap();
        let range = GeneRange::default();
        let l = Genome::from_genes(&structure, range, vec![0.5; structure.gene_count()]).unwrap();
        let r = Genome::from_genes(&structure, range, vec![-0.5; structure.gene_count()]).unwrap();

        let mut cuts = Vec::new();
        for _ in 0..50 {
            let template = Genome::random(&structure, range, &mut rng);
            let child = crossover(&l, &r, template, &mut rng).unwrap();
            for (_, _, genes) in child.chromosomes() {
                let cut = genes.iter().take_while(|g| **g == 0.5).count();
                assert!(genes[cut..].iter().all(|g| *g == -0.5));
                assert!(cut < genes.len(), "last gene always comes from r");
                cuts.push(cut);
            }
        }

        assert!(cuts.contains(&0));
        assert!(cuts.iter().any(|c| *c != cuts[0]));
    }

    #[test]
    fn test_crossover_mismatched_structure() {
        let mut rng = StdRng::seed_from_u64(41);
        let l = genome(vec![2, 2], 1);
        let r = genome(vec![3, 2], 2);
        assert!(matches!(
            crossover(&l, &r, l.clone(), &mut rng),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn test_crossover_does_not_alias_parents() {
        let mut rng = StdRng::seed_from_u64(42);
        let l = genome(vec![3, 3], 3);
        let r = genome(vec![3, 3], 4);
        let (l_before, r_before) = (l.clone(), r.clone());
        let mut child = crossover(&l, &r, l.clone(), &mut rng).unwrap();
        mutate(&mut child, 1., MutationPolicy::Redraw, &mut rng);
        assert_eq!(l, l_before);
        assert_eq!(r, r_before);
    }

    #[test]
    fn test_mutate_never() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut g = genome(vec![4, 3, 2], 5);
        let before = g.clone();
        assert_eq!(mutate(&mut g, 0., MutationPolicy::Redraw, &mut rng), 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_mutate_always_one_gene_per_chromosome() {
        let mut rng = StdRng::seed_from_u64(44);
        for _ in 0..20 {
            let mut g = genome(vec![4, 3, 2], 6);
            let before = g.clone();
            assert_eq!(mutate(&mut g, 1., MutationPolicy::Redraw, &mut rng), 5);
            for (layer, neuron, genes) in g.chromosomes() {
                let changed = genes
                    .iter()
                    .zip(before.chromosome(layer, neuron))
                    .filter(|(a, b)| a != b)
                    .count();
                assert_eq!(changed, 1);
            }
            assert!(g.in_range());
        }
    }

    #[test]
    fn test_mutate_negate() {
        let mut rng = StdRng::seed_from_u64(45);
        let structure = Structure::new(vec![1, 1]).unwrap();
        let range = GeneRange::new(-1., 0.5).unwrap();
        let mut g = Genome::from_genes(&structure, range, vec![-0.25, -0.8]).unwrap();
        mutate(&mut g, 1., MutationPolicy::Negate, &mut rng);
        let genes = g.genes();
        assert!(genes == [0.25, -0.8] || genes == [-0.25, 0.5], "{genes:?}");
    }

    #[test]
    fn test_mutate_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(46);
        let structure = Structure::new(vec![2, 1]).unwrap();
        let range = GeneRange::new(0.5, 0.5).unwrap();
        let mut g = Genome::random(&structure, range, &mut rng);
        assert_eq!(mutate(&mut g, 1., MutationPolicy::Redraw, &mut rng), 1);
        assert_eq!(g.genes(), &[0.5, 0.5, 0.5]);
    }
}
