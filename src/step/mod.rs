//! The generic CG step: policies composed over a shared cache.

pub mod cache;
pub mod policies;
pub mod scaling;

pub use cache::{Cache, StepView};
pub use policies::{ApplyPreconditioner, RhoPolicy, SearchDirection, UpdateIterate};
pub use scaling::{
    PlainScaling, RegularizedScaling, Scaling, TruncatedRegularizedScaling, TruncatedScaling,
};

use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::CgError;
use crate::mixin::{Eps, Verbosity};
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// One step of a CG variant: the operator triple plus the four policies.
///
/// The linear operator, preconditioner and scalar product are borrowed for
/// the lifetime of the step; the variant is chosen by the scaling policy
/// `SC`.
pub struct CgStep<'a, M, P, S, SC, T: Copy> {
    a: &'a M,
    p: &'a P,
    sp: &'a S,
    pub preconditioning: ApplyPreconditioner<T>,
    pub search: SearchDirection<T>,
    pub scaling: SC,
    pub update: UpdateIterate,
    pub eps: Eps<T>,
    pub verbosity: Verbosity,
}

impl<'a, M, P, S, T: Float> CgStep<'a, M, P, S, PlainScaling, T> {
    pub fn new(a: &'a M, p: &'a P, sp: &'a S) -> Self {
        CgStep::with_scaling(a, p, sp, PlainScaling)
    }
}

impl<'a, M, P, S, SC, T> CgStep<'a, M, P, S, SC, T>
where
    SC: Scaling<T>,
    T: Float,
{
    pub fn with_scaling(a: &'a M, p: &'a P, sp: &'a S, scaling: SC) -> Self {
        let step = CgStep {
            a,
            p,
            sp,
            preconditioning: ApplyPreconditioner::default(),
            search: SearchDirection::default(),
            scaling,
            update: UpdateIterate,
            eps: Eps::default(),
            verbosity: Verbosity::default(),
        };
        step.eps.connect(&step.preconditioning.eps);
        step.eps.connect(&step.search.eps);
        if let Some(eps) = step.scaling.eps() {
            step.eps.connect(eps);
        }
        step
    }

    /// Use the same ⟨r, Pr⟩ handling in every consuming policy.
    pub fn with_rho_policy(mut self, policy: RhoPolicy) -> Self {
        self.preconditioning.rho_policy = policy;
        self.search.rho_policy = policy;
        self
    }

    /// Build the per-solve cache: aliases `x` as the iterate and `b` as the
    /// residual carrier, allocates the auxiliary vectors and primes
    /// r = b − A·x, Pr = P·r and the residual norm.
    pub fn init<'c, V>(
        &self,
        x: &'c mut V,
        b: &'c mut V,
    ) -> Result<Cache<'c, M, P, S, V, T>, CgError>
    where
        'a: 'c,
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        Cache::new(self.a, self.p, self.sp, x, b)
    }

    /// Delegate to the preconditioner's pre-solve hook.
    pub fn pre_process<V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        cache.pre_process()
    }

    /// Delegate to the preconditioner's post-solve hook.
    pub fn post_process<V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        cache.post_process()
    }

    pub fn apply_preconditioner<V>(
        &self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        self.preconditioning.apply(cache)
    }

    pub fn search_direction<V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        self.search.apply(cache)
    }

    pub fn update_iterate<V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        self.update.apply(cache)
    }
}
