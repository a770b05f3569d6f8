//! Relative-energy-error termination.

use crate::mixin::{AbsoluteAccuracy, Eps, MaxSteps, RelativeAccuracy};
use crate::step::StepView;
use crate::termination::{TerminationCriterion, Verdict};
use num_traits::Float;
use std::collections::VecDeque;

/// Estimate the relative error in the energy norm from a lookahead window.
///
/// Each accepted step contributes τᵢ = αᵢ·σᵢ, the squared energy norm of the
/// i-th step. With Tₙ = Σ τᵢ and a window of the last L contributions, the
/// estimate is Eₙ = √(Σ_window τ / Tₙ); the solve is converged once
/// Eₙ ≤ relAccuracy and at least L steps were taken. With no accumulated
/// energy (zero right-hand side) the criterion falls back to the absolute
/// residual test.
pub struct RelativeEnergyError<T: Copy> {
    pub eps: Eps<T>,
    pub absolute_accuracy: AbsoluteAccuracy<T>,
    pub relative_accuracy: RelativeAccuracy<T>,
    pub max_steps: MaxSteps,
    lookahead: usize,
    window: VecDeque<T>,
    total: T,
    steps: usize,
}

impl<T: Float> RelativeEnergyError<T> {
    pub fn new() -> Self {
        RelativeEnergyError {
            eps: Eps::default(),
            absolute_accuracy: AbsoluteAccuracy::default(),
            relative_accuracy: RelativeAccuracy::default(),
            max_steps: MaxSteps::default(),
            lookahead: 5,
            window: VecDeque::new(),
            total: T::zero(),
            steps: 0,
        }
    }

    /// Length of the trailing window of step energies.
    pub fn set_lookahead(&mut self, lookahead: usize) {
        assert!(lookahead > 0);
        self.lookahead = lookahead;
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }
}

impl<T: Float> Default for RelativeEnergyError<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> TerminationCriterion<T> for RelativeEnergyError<T> {
    fn init(&mut self) {
        self.window.clear();
        self.total = T::zero();
        self.steps = 0;
    }

    fn check(&mut self, view: &StepView<T>) -> Verdict {
        let res = view.residual_norm;
        if !res.is_finite() {
            return Verdict::Failed;
        }
        if let (Some(alpha), Some(sigma)) = (view.alpha, view.sigma) {
            let tau = alpha * sigma;
            if !tau.is_finite() {
                return Verdict::Failed;
            }
            self.steps += 1;
            self.total = self.total + tau;
            self.window.push_back(tau);
            while self.window.len() > self.lookahead {
                self.window.pop_front();
            }
            if self.steps >= self.lookahead && self.total > T::zero() {
                let recent = self.window.iter().fold(T::zero(), |acc, &t| acc + t);
                let estimate = (recent / self.total).sqrt();
                if estimate <= self.relative_accuracy.get() {
                    return Verdict::Converged;
                }
            }
        }
        // zero right-hand side or not enough history: residual fallback
        if res <= self.absolute_accuracy.get() {
            return Verdict::Converged;
        }
        if self.steps >= self.max_steps.get() {
            return Verdict::MaxIterations;
        }
        Verdict::Continue
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
