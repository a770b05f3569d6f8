//! Step policies shared by all CG variants.
//!
//! A step is the ordered composition ApplyPreconditioner → SearchDirection →
//! Scaling → UpdateIterate over a shared [`Cache`]. The policies here are the
//! variant-independent three; the scaling policies live in
//! [`crate::step::scaling`].

use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::CgError;
use crate::mixin::{Eps, IterativeRefinements};
use crate::preconditioner::Preconditioner;
use crate::step::cache::Cache;
use num_traits::Float;

/// How the preconditioned inner product ⟨r, P·r⟩ is consumed.
///
/// `Magnitude` takes the absolute value, which stabilizes the iteration
/// against inexact preconditioners at the price of masking indefinite ones.
/// `Signed` rejects values below −ε as an operator defect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RhoPolicy {
    #[default]
    Magnitude,
    Signed,
}

pub(crate) fn checked_rho<T: Float>(rho: T, policy: RhoPolicy, eps: T) -> Result<T, CgError> {
    if !rho.is_finite() {
        return Err(CgError::InvalidOperator(
            "preconditioned inner product (r, Pr) is not finite".into(),
        ));
    }
    match policy {
        RhoPolicy::Signed if rho < -eps => Err(CgError::InvalidOperator(
            "preconditioned inner product (r, Pr) is negative beyond eps".into(),
        )),
        _ => Ok(rho.abs()),
    }
}

/// Apply the preconditioner, possibly with iterative refinements.
pub struct ApplyPreconditioner<T: Copy> {
    pub refinements: IterativeRefinements,
    pub eps: Eps<T>,
    pub rho_policy: RhoPolicy,
}

impl<T: Float> Default for ApplyPreconditioner<T> {
    fn default() -> Self {
        ApplyPreconditioner {
            refinements: IterativeRefinements::default(),
            eps: Eps::default(),
            rho_policy: RhoPolicy::default(),
        }
    }
}

impl<T: Float> ApplyPreconditioner<T> {
    /// Pr ← P·r, then k fixed-point refinements r′ ← r − A·Pr, Pr += P·r′.
    /// Sets σ = |⟨r, Pr⟩| when unset and refreshes ‖r‖.
    pub fn apply<M, P, S, V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        cache.p.apply(&*cache.r, &mut cache.pr)?;

        let k = self.refinements.get();
        if k > 0 {
            let mut r2 = (*cache.r).clone();
            let mut dqr = cache.pr.clone();
            for _ in 0..k {
                r2.as_mut().copy_from_slice(cache.r.as_ref());
                cache.a.applyscaleadd(-T::one(), &cache.pr, &mut r2);
                cache.p.apply(&r2, &mut dqr)?;
                for (pri, di) in cache.pr.as_mut().iter_mut().zip(dqr.as_ref()) {
                    *pri = *pri + *di;
                }
            }
        }

        if cache.sigma.is_none() {
            let rho = cache.sp.dot(&*cache.r, &cache.pr);
            cache.sigma = Some(checked_rho(rho, self.rho_policy, self.eps.get())?);
        }
        cache.residual_norm = cache.sp.norm(&*cache.r);
        Ok(())
    }
}

/// Compute the conjugate search direction.
pub struct SearchDirection<T: Copy> {
    pub eps: Eps<T>,
    pub rho_policy: RhoPolicy,
}

impl<T: Float> Default for SearchDirection<T> {
    fn default() -> Self {
        SearchDirection {
            eps: Eps::default(),
            rho_policy: RhoPolicy::default(),
        }
    }
}

impl<T: Float> SearchDirection<T> {
    pub fn apply<M, P, S, V>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        if cache.first_step {
            cache.dx.as_mut().copy_from_slice(cache.pr.as_ref());
            Self::induced_step_length(cache);
            cache.first_step = false;
            return Ok(());
        }

        let sigma = cache.sigma.ok_or_else(|| {
            CgError::ContractViolation("search direction computed before (r, Pr)".into())
        })?;
        let rho = cache.sp.dot(&*cache.r, &cache.pr);
        let new_sigma = checked_rho(rho, self.rho_policy, self.eps.get())?;
        let beta = new_sigma / sigma;
        if !beta.is_finite() {
            return Err(CgError::InvalidOperator(
                "search direction update is not finite".into(),
            ));
        }
        for (di, pri) in cache.dx.as_mut().iter_mut().zip(cache.pr.as_ref()) {
            *di = beta * *di + *pri;
        }
        cache.beta = Some(beta);
        cache.sigma = Some(new_sigma);

        Self::induced_step_length(cache);
        Ok(())
    }

    fn induced_step_length<M, P, S, V>(cache: &mut Cache<'_, M, P, S, V, T>)
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        cache.a.apply(&cache.dx, &mut cache.adx);
        cache.dx_adx = Some(cache.sp.dot(&cache.dx, &cache.adx));
    }
}

/// x ← x + α·δx, r ← r − α·A·δx.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateIterate;

impl UpdateIterate {
    pub fn apply<M, P, S, V, T>(&self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
        T: Float,
    {
        let alpha = cache
            .alpha
            .ok_or_else(|| CgError::ContractViolation("iterate update before scaling".into()))?;
        for (xi, di) in cache.x.as_mut().iter_mut().zip(cache.dx.as_ref()) {
            *xi = *xi + alpha * *di;
        }
        for (ri, ai) in cache.r.as_mut().iter_mut().zip(cache.adx.as_ref()) {
            *ri = *ri - alpha * *ai;
        }
        Ok(())
    }
}
