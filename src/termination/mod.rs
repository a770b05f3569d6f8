//! Termination criteria for the CG family.
//!
//! Criteria are observers: they read the step interface after each iteration
//! and classify the state. They never mutate the solve.

pub mod energy;
pub mod residual;

pub use energy::RelativeEnergyError;
pub use residual::ResidualBased;

use crate::mixin::{AbsoluteAccuracy, Eps, MaxSteps, RelativeAccuracy};
use crate::step::StepView;
use num_traits::Float;

/// Classification of the solver state after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Converged,
    Failed,
    MaxIterations,
}

/// A pluggable termination criterion.
pub trait TerminationCriterion<T: Float> {
    /// Reset accumulated state at the start of a solve.
    fn init(&mut self);

    /// Observe the step interface and classify the current state.
    fn check(&mut self, view: &StepView<T>) -> Verdict;

    /// Non-positive-curvature observation, queried before the iterate
    /// update. Whether it forces truncation is decided by the step variant.
    fn truncate(&self, view: &StepView<T>) -> bool {
        matches!(view.dx_adx, Some(d) if d <= T::zero())
    }

    fn eps(&self) -> &Eps<T>;
    fn absolute_accuracy(&self) -> &AbsoluteAccuracy<T>;
    fn relative_accuracy(&self) -> &RelativeAccuracy<T>;
    fn max_steps(&self) -> &MaxSteps;
}
