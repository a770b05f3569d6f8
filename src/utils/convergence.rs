//! Terminal classification & stats for iterative solvers.

/// Why a solve stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The termination criterion was satisfied.
    Converged,
    /// A non-positive-curvature direction was detected and the step was
    /// rejected; the iterate is the last accepted one.
    Truncated,
    /// The step budget ran out; the iterate is best-effort.
    MaxIterations,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub reason: StopReason,
    /// Accumulated regularization shift, when the scaling policy regularizes.
    pub regularization_shift: Option<T>,
}

impl<T> SolveStats<T> {
    pub fn converged(&self) -> bool {
        self.reason == StopReason::Converged
    }
}
