//! Residual-based termination.

use crate::mixin::{AbsoluteAccuracy, Eps, MaxSteps, RelativeAccuracy};
use crate::step::StepView;
use crate::termination::{TerminationCriterion, Verdict};
use num_traits::Float;

/// Converged when ‖r‖ ≤ max(absAccuracy, relAccuracy · ‖r₀‖).
///
/// The initial residual norm is taken from the first query after `init`.
pub struct ResidualBased<T: Copy> {
    pub eps: Eps<T>,
    pub absolute_accuracy: AbsoluteAccuracy<T>,
    pub relative_accuracy: RelativeAccuracy<T>,
    pub max_steps: MaxSteps,
    initial_residual: Option<T>,
    steps: usize,
}

impl<T: Float> ResidualBased<T> {
    pub fn new() -> Self {
        ResidualBased {
            eps: Eps::default(),
            absolute_accuracy: AbsoluteAccuracy::default(),
            relative_accuracy: RelativeAccuracy::default(),
            max_steps: MaxSteps::default(),
            initial_residual: None,
            steps: 0,
        }
    }
}

impl<T: Float> Default for ResidualBased<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> TerminationCriterion<T> for ResidualBased<T> {
    fn init(&mut self) {
        self.initial_residual = None;
        self.steps = 0;
    }

    fn check(&mut self, view: &StepView<T>) -> Verdict {
        let res = view.residual_norm;
        if !res.is_finite() {
            return Verdict::Failed;
        }
        let initial = *self.initial_residual.get_or_insert(res);
        // the priming query carries no scaling yet and is not a step
        if view.alpha.is_some() {
            self.steps += 1;
        }
        let tol = self
            .absolute_accuracy
            .get()
            .max(self.relative_accuracy.get() * initial);
        if res <= tol {
            Verdict::Converged
        } else if self.steps >= self.max_steps.get() {
            Verdict::MaxIterations
        } else {
            Verdict::Continue
        }
    }

    fn eps(&self) -> &Eps<T> {
        &self.eps
    }

    fn absolute_accuracy(&self) -> &AbsoluteAccuracy<T> {
        &self.absolute_accuracy
    }

    fn relative_accuracy(&self) -> &RelativeAccuracy<T> {
        &self.relative_accuracy
    }

    fn max_steps(&self) -> &MaxSteps {
        &self.max_steps
    }
}
