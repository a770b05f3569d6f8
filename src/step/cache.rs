//! Per-solve scratch state shared by the step policies.

use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::CgError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Snapshot of the quantities a termination criterion may observe.
#[derive(Clone, Copy, Debug)]
pub struct StepView<T> {
    /// Scaling of the search direction, σ / ⟨δx, A·δx⟩.
    pub alpha: Option<T>,
    /// Residual norm induced by the preconditioner, ⟨r, P·r⟩.
    pub sigma: Option<T>,
    /// Energy length of the search direction, ⟨δx, A·δx⟩.
    pub dx_adx: Option<T>,
    /// Residual norm with respect to the employed scalar product, ‖r‖.
    pub residual_norm: T,
}

/// Cache object for the conjugate gradient family.
///
/// The caller's `x` is aliased as the iterate and the caller's `b` as the
/// residual carrier: after `reset`, the b buffer holds r = b − A·x and is
/// updated in place for the rest of the solve. The cache is the sole
/// communication channel between the step policies and lives for one solve.
pub struct Cache<'c, M, P, S, V, T> {
    pub a: &'c M,
    pub p: &'c P,
    pub sp: &'c S,
    pub x: &'c mut V,
    pub r: &'c mut V,
    pub pr: V,
    pub dx: V,
    pub adx: V,
    pub alpha: Option<T>,
    pub beta: Option<T>,
    pub sigma: Option<T>,
    pub dx_adx: Option<T>,
    pub residual_norm: T,
    pub first_step: bool,
}

impl<'c, M, P, S, V, T> Cache<'c, M, P, S, V, T>
where
    M: LinearOperator<V, Scalar = T>,
    P: Preconditioner<M, V>,
    S: InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float,
{
    /// Build the cache and prime it. On entry `b` must hold the right-hand
    /// side; on exit it holds the initial residual.
    pub fn new(
        a: &'c M,
        p: &'c P,
        sp: &'c S,
        x: &'c mut V,
        b: &'c mut V,
    ) -> Result<Self, CgError> {
        let domain = x.as_ref().len();
        let range = b.as_ref().len();
        let mut cache = Cache {
            a,
            p,
            sp,
            pr: V::from(vec![T::zero(); domain]),
            dx: V::from(vec![T::zero(); domain]),
            adx: V::from(vec![T::zero(); range]),
            x,
            r: b,
            alpha: None,
            beta: None,
            sigma: None,
            dx_adx: None,
            residual_norm: T::one(),
            first_step: true,
        };
        cache.reset()?;
        Ok(cache)
    }

    /// Re-prime the cache: r ← b − A·x (the r buffer must hold b), Pr ← P·r,
    /// refresh the residual norm and clear all per-step scalars.
    pub fn reset(&mut self) -> Result<(), CgError> {
        self.a.applyscaleadd(-T::one(), &*self.x, &mut *self.r);
        self.p.apply(&*self.r, &mut self.pr)?;
        self.residual_norm = self.sp.norm(&*self.r);
        self.alpha = None;
        self.beta = None;
        self.sigma = None;
        self.dx_adx = None;
        self.first_step = true;
        Ok(())
    }

    /// Delegate to the preconditioner's pre-solve hook.
    pub fn pre_process(&mut self) -> Result<(), CgError> {
        self.p.pre(&mut *self.x, &mut *self.r)
    }

    /// Delegate to the preconditioner's post-solve hook.
    pub fn post_process(&mut self) -> Result<(), CgError> {
        self.p.post(&mut *self.x)
    }

    /// The interface surface observed by termination criteria.
    pub fn view(&self) -> StepView<T> {
        StepView {
            alpha: self.alpha,
            sigma: self.sigma,
            dx_adx: self.dx_adx,
            residual_norm: self.residual_norm,
        }
    }
}
