#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}

/// Assert every gene of a [crate::Genome] lies within its range
#[macro_export]
macro_rules! assert_genes_in_range {
    ($genome:expr) => {{
        let genome = &$genome;
        let range = genome.range();
        for (layer, neuron, genes) in genome.chromosomes() {
            for gene in genes {
                assert!(
                    range.contains(*gene),
                    "gene {} of ({}, {}) outside [{}, {}]",
                    gene,
                    layer,
                    neuron,
                    range.lo(),
                    range.hi()
                );
            }
        }
    }};
}
