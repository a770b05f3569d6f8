//! Factory for assembled CG variants.
//!
//! [`CgContext`] picks the variant and the termination criterion at runtime
//! and builds the matching solver for each solve, configured from
//! [`SolverOptions`].

use crate::config::SolverOptions;
use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::CgError;
use crate::preconditioner::Preconditioner;
use crate::solver::GenericIterativeMethod;
use crate::step::{
    CgStep, PlainScaling, RegularizedScaling, Scaling, TruncatedRegularizedScaling,
    TruncatedScaling,
};
use crate::termination::{RelativeEnergyError, ResidualBased, TerminationCriterion};
use crate::utils::convergence::SolveStats;
use num_traits::Float;

/// Which CG variant to assemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CgKind {
    Cg,
    Rcg,
    Tcg,
    Trcg,
}

/// Which termination criterion to assemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CriterionKind {
    ResidualBased,
    RelativeEnergyError,
}

pub struct CgContext<'a, M, P, S, T> {
    pub kind: CgKind,
    pub criterion: CriterionKind,
    pub a: &'a M,
    pub p: &'a P,
    pub sp: &'a S,
    pub opts: SolverOptions<T>,
}

impl<'a, M, P, S, T> CgContext<'a, M, P, S, T>
where
    T: Float + From<f64>,
{
    pub fn new(a: &'a M, p: &'a P, sp: &'a S) -> Self {
        CgContext {
            kind: CgKind::Cg,
            criterion: CriterionKind::RelativeEnergyError,
            a,
            p,
            sp,
            opts: SolverOptions::default(),
        }
    }

    pub fn with_kind(mut self, kind: CgKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_criterion(mut self, criterion: CriterionKind) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_options(mut self, opts: SolverOptions<T>) -> Self {
        self.opts = opts;
        self
    }

    /// Assemble the configured solver and run it on (x, b).
    pub fn solve<V>(&self, x: &mut V, b: &mut V) -> Result<SolveStats<T>, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        match self.criterion {
            CriterionKind::ResidualBased => self.dispatch(ResidualBased::default(), x, b),
            CriterionKind::RelativeEnergyError => {
                let mut criterion = RelativeEnergyError::default();
                criterion.set_lookahead(self.opts.lookahead);
                self.dispatch(criterion, x, b)
            }
        }
    }

    fn dispatch<V, C>(&self, criterion: C, x: &mut V, b: &mut V) -> Result<SolveStats<T>, CgError>
    where
        C: TerminationCriterion<T>,
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        match self.kind {
            CgKind::Cg => self.run(PlainScaling, criterion, x, b),
            CgKind::Rcg => self.run(RegularizedScaling::new(), criterion, x, b),
            CgKind::Tcg => self.run(TruncatedScaling, criterion, x, b),
            CgKind::Trcg => self.run(TruncatedRegularizedScaling::new(), criterion, x, b),
        }
    }

    fn run<V, SC, C>(
        &self,
        scaling: SC,
        criterion: C,
        x: &mut V,
        b: &mut V,
    ) -> Result<SolveStats<T>, CgError>
    where
        SC: Scaling<T>,
        C: TerminationCriterion<T>,
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        criterion.relative_accuracy().set(self.opts.relative_accuracy);
        criterion.absolute_accuracy().set(self.opts.absolute_accuracy);
        criterion.eps().set(self.opts.eps);
        let step = CgStep::with_scaling(self.a, self.p, self.sp, scaling);
        let mut solver = GenericIterativeMethod::new(step, criterion);
        solver.set_max_steps(self.opts.max_steps);
        solver.set_verbosity(self.opts.verbosity);
        solver.set_iterative_refinements(self.opts.iterative_refinements);
        solver.apply(x, b)
    }
}
