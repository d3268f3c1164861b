use crate::codec::Layer;

/// Anything that can score a set of network weights.
///
/// Evaluation takes `&mut self`: an evaluator is assumed to own one reusable, mutable
/// evaluation context that it loads each set of weights into. Evaluating several individuals at
/// once therefore requires one evaluator per concurrent evaluation.
pub trait Evaluator {
    fn evaluate(&mut self, weights: &[Layer]) -> f64;
}

impl<F: FnMut(&[Layer]) -> f64> Evaluator for F {
    fn evaluate(&mut self, weights: &[Layer]) -> f64 {
        self(weights)
    }
}

/// Counts evaluations made through it, useful to assert nothing was skipped
pub struct Counting<E: Evaluator> {
    pub inner: E,
    pub calls: usize,
}

impl<E: Evaluator> Counting<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, calls: 0 }
    }
}

impl<E: Evaluator> Evaluator for Counting<E> {
    fn evaluate(&mut self, weights: &[Layer]) -> f64 {
        self.calls += 1;
        self.inner.evaluate(weights)
    }
}
