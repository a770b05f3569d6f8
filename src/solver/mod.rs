//! The generic iterative method and the assembled CG variants.

use crate::error::CgError;
use crate::core::traits::{InnerProduct, LinearOperator};
use crate::mixin::{AbsoluteAccuracy, Eps, MaxSteps, RelativeAccuracy, Verbosity};
use crate::preconditioner::Preconditioner;
use crate::step::{
    CgStep, PlainScaling, RegularizedScaling, Scaling, TruncatedRegularizedScaling,
    TruncatedScaling,
};
use crate::termination::{RelativeEnergyError, TerminationCriterion, Verdict};
use crate::utils::convergence::{SolveStats, StopReason};
use num_traits::Float;

/// Generic iterative method: a step object driven against a termination
/// criterion.
///
/// The driver owns the step and the criterion and keeps the shared
/// tolerances consistent across them through mixin connections.
pub struct GenericIterativeMethod<S, C, T: Copy> {
    pub step: S,
    pub termination: C,
    pub max_steps: MaxSteps,
    pub verbosity: Verbosity,
    pub absolute_accuracy: AbsoluteAccuracy<T>,
    pub relative_accuracy: RelativeAccuracy<T>,
    pub eps: Eps<T>,
    pub monitor: Option<Box<dyn FnMut(usize, T)>>,
    pub residual_history: Vec<T>,
}

/// Conjugate gradient method. Assumes A is positive definite.
pub type CgSolver<'a, M, P, S, T, C = RelativeEnergyError<T>> =
    GenericIterativeMethod<CgStep<'a, M, P, S, PlainScaling, T>, C, T>;

/// Regularized conjugate gradient method: shifts A on weak curvature.
pub type RcgSolver<'a, M, P, S, T, C = RelativeEnergyError<T>> =
    GenericIterativeMethod<CgStep<'a, M, P, S, RegularizedScaling<T>, T>, C, T>;

/// Truncated conjugate gradient method: stops on non-positive curvature.
pub type TcgSolver<'a, M, P, S, T, C = RelativeEnergyError<T>> =
    GenericIterativeMethod<CgStep<'a, M, P, S, TruncatedScaling, T>, C, T>;

/// Truncated-regularized conjugate gradient method.
pub type TrcgSolver<'a, M, P, S, T, C = RelativeEnergyError<T>> =
    GenericIterativeMethod<CgStep<'a, M, P, S, TruncatedRegularizedScaling<T>, T>, C, T>;

impl<'a, M, P, S, SC, C, T> GenericIterativeMethod<CgStep<'a, M, P, S, SC, T>, C, T>
where
    SC: Scaling<T>,
    C: TerminationCriterion<T>,
    T: Float,
{
    /// Wire the shared tolerances and adopt the criterion's current values.
    pub fn new(step: CgStep<'a, M, P, S, SC, T>, termination: C) -> Self {
        let gim = GenericIterativeMethod {
            step,
            termination,
            max_steps: MaxSteps::default(),
            verbosity: Verbosity::default(),
            absolute_accuracy: AbsoluteAccuracy::default(),
            relative_accuracy: RelativeAccuracy::default(),
            eps: Eps::default(),
            monitor: None,
            residual_history: Vec::new(),
        };
        gim.eps.connect(&gim.step.eps);
        gim.eps.connect(gim.termination.eps());
        gim.absolute_accuracy
            .connect(gim.termination.absolute_accuracy());
        gim.relative_accuracy
            .connect(gim.termination.relative_accuracy());
        gim.max_steps.connect(gim.termination.max_steps());
        gim.verbosity.connect(&gim.step.verbosity);

        gim.eps.set(gim.termination.eps().get());
        gim.absolute_accuracy
            .set(gim.termination.absolute_accuracy().get());
        gim.relative_accuracy
            .set(gim.termination.relative_accuracy().get());
        gim.max_steps.set(gim.termination.max_steps().get());
        gim
    }

    pub fn set_max_steps(&self, steps: usize) {
        self.max_steps.set(steps);
    }

    pub fn set_verbosity(&self, level: u32) {
        self.verbosity.set(level);
    }

    pub fn set_relative_accuracy(&self, accuracy: T) {
        self.relative_accuracy.set(accuracy);
    }

    pub fn set_absolute_accuracy(&self, accuracy: T) {
        self.absolute_accuracy.set(accuracy);
    }

    pub fn set_eps(&self, eps: T) {
        self.eps.set(eps);
    }

    pub fn set_iterative_refinements(&self, refinements: usize) {
        self.step.preconditioning.refinements.set(refinements);
    }

    pub fn with_monitor<F>(mut self, monitor: F) -> Self
    where
        F: FnMut(usize, T) + 'static,
    {
        self.monitor = Some(Box::new(monitor));
        self
    }

    pub fn clear_history(&mut self) {
        self.residual_history.clear();
    }

    /// Solve A·x = b.
    ///
    /// `x` carries the initial guess and is mutated to the solution. `b` is
    /// mutated into the residual and keeps that role for the whole solve;
    /// on return it holds the final residual.
    pub fn apply<V>(&mut self, x: &mut V, b: &mut V) -> Result<SolveStats<T>, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        self.termination.init();
        self.step.scaling.reset();
        let mut cache = self.step.init(x, b)?;
        self.step.pre_process(&mut cache)?;

        if let Some(monitor) = self.monitor.as_mut() {
            monitor(0, cache.residual_norm);
        }
        self.residual_history.push(cache.residual_norm);

        let max_steps = self.max_steps.get();
        let mut iterations = 0usize;
        let mut reason = StopReason::MaxIterations;
        let mut failure = None;

        let terminal = match self.termination.check(&cache.view()) {
            Verdict::Converged => {
                reason = StopReason::Converged;
                true
            }
            Verdict::MaxIterations => true,
            Verdict::Failed => {
                failure = Some(CgError::InvalidOperator(
                    "termination criterion failed on the initial residual".into(),
                ));
                true
            }
            Verdict::Continue => false,
        };

        if !terminal {
            for i in 1..=max_steps {
                self.step.apply_preconditioner(&mut cache)?;
                self.step.search_direction(&mut cache)?;
                if self.step.scaling.treat_nonconvexity(&mut cache)?
                    && self.termination.truncate(&cache.view())
                {
                    iterations = i;
                    reason = StopReason::Truncated;
                    break;
                }
                self.step.scaling.scale(&mut cache)?;
                self.step.update_iterate(&mut cache)?;
                iterations = i;

                if let Some(monitor) = self.monitor.as_mut() {
                    monitor(i, cache.residual_norm);
                }
                self.residual_history.push(cache.residual_norm);
                if self.verbosity.iteration() {
                    let sigma = cache.sigma.unwrap_or_else(T::nan);
                    let alpha = cache.alpha.unwrap_or_else(T::nan);
                    println!(
                        "cg iteration {i}: |r| = {:.4e}, (r, Pr) = {:.4e}, alpha = {:.4e}",
                        cache.residual_norm.to_f64().unwrap(),
                        sigma.to_f64().unwrap(),
                        alpha.to_f64().unwrap()
                    );
                }

                match self.termination.check(&cache.view()) {
                    Verdict::Continue => {}
                    Verdict::Converged => {
                        reason = StopReason::Converged;
                        break;
                    }
                    Verdict::MaxIterations => {
                        reason = StopReason::MaxIterations;
                        break;
                    }
                    Verdict::Failed => {
                        failure = Some(CgError::InvalidOperator(
                            "termination criterion failed".into(),
                        ));
                        break;
                    }
                }
            }
        }

        self.step.post_process(&mut cache)?;
        if let Some(error) = failure {
            return Err(error);
        }

        let stats = SolveStats {
            iterations,
            final_residual: cache.residual_norm,
            reason,
            regularization_shift: self.step.scaling.shift(),
        };
        if self.verbosity.summary() {
            println!(
                "cg finished: {:?} after {} iterations, |r| = {:.4e}",
                stats.reason,
                stats.iterations,
                stats.final_residual.to_f64().unwrap()
            );
        }
        Ok(stats)
    }
}

fn assemble<'a, M, P, S, SC, C, T>(
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    scaling: SC,
    accuracy: T,
    max_steps: usize,
    verbosity: u32,
    eps: T,
) -> GenericIterativeMethod<CgStep<'a, M, P, S, SC, T>, C, T>
where
    SC: Scaling<T>,
    C: TerminationCriterion<T> + Default,
    T: Float,
{
    let termination = C::default();
    termination.relative_accuracy().set(accuracy);
    termination.eps().set(eps);
    let solver = GenericIterativeMethod::new(CgStep::with_scaling(a, p, sp, scaling), termination);
    solver.set_max_steps(max_steps);
    solver.set_verbosity(verbosity);
    solver
}

/// Assemble a conjugate gradient solver.
pub fn make_cg<'a, M, P, S, C, T>(
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    accuracy: T,
    max_steps: usize,
    verbosity: u32,
    eps: T,
) -> CgSolver<'a, M, P, S, T, C>
where
    C: TerminationCriterion<T> + Default,
    T: Float,
{
    assemble(a, p, sp, PlainScaling, accuracy, max_steps, verbosity, eps)
}

/// Assemble a regularized conjugate gradient solver.
pub fn make_rcg<'a, M, P, S, C, T>(
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    accuracy: T,
    max_steps: usize,
    verbosity: u32,
    eps: T,
) -> RcgSolver<'a, M, P, S, T, C>
where
    C: TerminationCriterion<T> + Default,
    T: Float,
{
    assemble(
        a,
        p,
        sp,
        RegularizedScaling::new(),
        accuracy,
        max_steps,
        verbosity,
        eps,
    )
}

/// Assemble a truncated conjugate gradient solver.
pub fn make_tcg<'a, M, P, S, C, T>(
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    accuracy: T,
    max_steps: usize,
    verbosity: u32,
    eps: T,
) -> TcgSolver<'a, M, P, S, T, C>
where
    C: TerminationCriterion<T> + Default,
    T: Float,
{
    assemble(
        a,
        p,
        sp,
        TruncatedScaling,
        accuracy,
        max_steps,
        verbosity,
        eps,
    )
}

/// Assemble a truncated-regularized conjugate gradient solver.
pub fn make_trcg<'a, M, P, S, C, T>(
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    accuracy: T,
    max_steps: usize,
    verbosity: u32,
    eps: T,
) -> TrcgSolver<'a, M, P, S, T, C>
where
    C: TerminationCriterion<T> + Default,
    T: Float,
{
    assemble(
        a,
        p,
        sp,
        TruncatedRegularizedScaling::new(),
        accuracy,
        max_steps,
        verbosity,
        eps,
    )
}
