//! Solver options for the CG family.
//!
//! Bundles the tolerances a solve is configured with. The defaults follow
//! the classic setup: relative accuracy and maximal attainable accuracy
//! 1e-15, a thousand steps, silent.

/// Tunables for assembling a CG solver.
#[derive(Clone, Debug)]
pub struct SolverOptions<T> {
    /// Relative accuracy of the termination criterion.
    pub relative_accuracy: T,

    /// Absolute accuracy of the termination criterion.
    pub absolute_accuracy: T,

    /// Maximal attainable accuracy ε.
    pub eps: T,

    /// Maximal number of steps.
    pub max_steps: usize,

    /// 1: final statistics, 2: per-iteration output.
    pub verbosity: u32,

    /// Iterative refinements of the preconditioner application.
    pub iterative_refinements: usize,

    /// Lookahead window of the relative-energy criterion.
    pub lookahead: usize,
}

impl<T: num_traits::Float + From<f64>> Default for SolverOptions<T> {
    fn default() -> Self {
        SolverOptions {
            relative_accuracy: <T as From<f64>>::from(1e-15),
            absolute_accuracy: T::epsilon(),
            eps: <T as From<f64>>::from(1e-15),
            max_steps: 1000,
            verbosity: 0,
            iterative_refinements: 0,
            lookahead: 5,
        }
    }
}
