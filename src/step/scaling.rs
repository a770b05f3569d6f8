//! Variant-specific scaling policies.
//!
//! The CG variants differ only here: how the scaling α is obtained and what
//! happens when the curvature ⟨δx, A·δx⟩ is not safely positive.

use crate::core::traits::{InnerProduct, LinearOperator};
use crate::error::CgError;
use crate::mixin::Eps;
use crate::preconditioner::Preconditioner;
use crate::step::cache::Cache;
use num_traits::Float;

/// Scaling policy of a CG variant.
pub trait Scaling<T: Float> {
    /// Examine curvature after the search-direction update. May repair the
    /// cache through a regularization shift. Returns true when the current
    /// step must be truncated.
    fn treat_nonconvexity<M, P, S, V>(
        &mut self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<bool, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone;

    /// α ← σ / ⟨δx, A·δx⟩.
    fn scale<M, P, S, V>(&mut self, cache: &mut Cache<'_, M, P, S, V, T>) -> Result<(), CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        let sigma = cache
            .sigma
            .ok_or_else(|| CgError::ContractViolation("scaling before (r, Pr)".into()))?;
        let dx_adx = cache
            .dx_adx
            .ok_or_else(|| CgError::ContractViolation("scaling before search direction".into()))?;
        let alpha = sigma / dx_adx;
        if !alpha.is_finite() {
            return Err(CgError::InvalidOperator(
                "step scaling sigma / (dx, A dx) is not finite".into(),
            ));
        }
        cache.alpha = Some(alpha);
        Ok(())
    }

    /// Accumulated regularization shift, when this policy regularizes.
    fn shift(&self) -> Option<T> {
        None
    }

    /// The ε mixin of this policy, when it carries one.
    fn eps(&self) -> Option<&Eps<T>> {
        None
    }

    /// Reset per-solve state.
    fn reset(&mut self) {}
}

/// Plain CG scaling. Assumes the operator is positive definite.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainScaling;

impl<T: Float> Scaling<T> for PlainScaling {
    fn treat_nonconvexity<M, P, S, V>(
        &mut self,
        _cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<bool, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        Ok(false)
    }
}

/// Truncating scaling: reject the step on non-positive curvature.
#[derive(Clone, Copy, Debug, Default)]
pub struct TruncatedScaling;

impl<T: Float> Scaling<T> for TruncatedScaling {
    fn treat_nonconvexity<M, P, S, V>(
        &mut self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<bool, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        let dx_adx = cache.dx_adx.ok_or_else(|| {
            CgError::ContractViolation("nonconvexity check before search direction".into())
        })?;
        Ok(dx_adx <= T::zero())
    }
}

/// Regularizing scaling: restore positive curvature with a shift A + θ·I.
///
/// When ⟨δx, A·δx⟩ < θ·‖δx‖² the curvature is bumped by θ·‖δx‖², the shift
/// is accumulated and θ doubles. The escalation repeats within the step only
/// while curvature remains non-positive, bounded by `max_escalations`.
pub struct RegularizedScaling<T: Copy> {
    pub eps: Eps<T>,
    theta0: Option<T>,
    theta: T,
    shift: T,
    escalation_factor: T,
    max_escalations: usize,
}

impl<T: Float> RegularizedScaling<T> {
    pub fn new() -> Self {
        let eps = Eps::default();
        let two = T::one() + T::one();
        RegularizedScaling {
            theta0: None,
            theta: eps.sqrt(),
            shift: T::zero(),
            escalation_factor: two,
            max_escalations: 10,
            eps,
        }
    }

    /// Override the initial shift θ₀ (defaults to √ε).
    pub fn with_initial_theta(mut self, theta0: T) -> Self {
        assert!(theta0 > T::zero());
        self.theta0 = Some(theta0);
        self.theta = theta0;
        self
    }

    pub fn with_escalation_factor(mut self, factor: T) -> Self {
        assert!(factor > T::one());
        self.escalation_factor = factor;
        self
    }

    pub fn with_max_escalations(mut self, count: usize) -> Self {
        assert!(count > 0);
        self.max_escalations = count;
        self
    }

    /// Regularize the curvature in the cache; returns the repaired value.
    fn regularize<M, P, S, V>(
        &mut self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<T, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        let mut dx_adx = cache.dx_adx.ok_or_else(|| {
            CgError::ContractViolation("nonconvexity check before search direction".into())
        })?;
        if !dx_adx.is_finite() {
            return Err(CgError::InvalidOperator(
                "curvature (dx, A dx) is not finite".into(),
            ));
        }
        let dxdx = cache.sp.dot(&cache.dx, &cache.dx);
        if dx_adx >= self.theta * dxdx {
            return Ok(dx_adx);
        }
        let mut escalations = 0;
        loop {
            dx_adx = dx_adx + self.theta * dxdx;
            self.shift = self.shift + self.theta;
            self.theta = self.theta * self.escalation_factor;
            escalations += 1;
            if dx_adx > T::zero() || escalations >= self.max_escalations {
                break;
            }
        }
        cache.dx_adx = Some(dx_adx);
        Ok(dx_adx)
    }
}

impl<T: Float> Default for RegularizedScaling<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Scaling<T> for RegularizedScaling<T> {
    fn treat_nonconvexity<M, P, S, V>(
        &mut self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<bool, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        let dx_adx = self.regularize(cache)?;
        if dx_adx <= T::zero() {
            return Err(CgError::InvalidOperator(
                "curvature not restored by regularization".into(),
            ));
        }
        Ok(false)
    }

    fn shift(&self) -> Option<T> {
        Some(self.shift)
    }

    fn eps(&self) -> Option<&Eps<T>> {
        Some(&self.eps)
    }

    fn reset(&mut self) {
        self.theta = self.theta0.unwrap_or_else(|| self.eps.sqrt());
        self.shift = T::zero();
    }
}

/// Truncated-regularized scaling: regularize small-positive curvature,
/// truncate when it stays non-positive after the bounded escalations.
pub struct TruncatedRegularizedScaling<T: Copy> {
    inner: RegularizedScaling<T>,
}

impl<T: Float> TruncatedRegularizedScaling<T> {
    pub fn new() -> Self {
        TruncatedRegularizedScaling {
            inner: RegularizedScaling::new(),
        }
    }

    pub fn with_initial_theta(mut self, theta0: T) -> Self {
        self.inner = self.inner.with_initial_theta(theta0);
        self
    }

    pub fn with_escalation_factor(mut self, factor: T) -> Self {
        self.inner = self.inner.with_escalation_factor(factor);
        self
    }

    pub fn with_max_escalations(mut self, count: usize) -> Self {
        self.inner = self.inner.with_max_escalations(count);
        self
    }
}

impl<T: Float> Default for TruncatedRegularizedScaling<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Scaling<T> for TruncatedRegularizedScaling<T> {
    fn treat_nonconvexity<M, P, S, V>(
        &mut self,
        cache: &mut Cache<'_, M, P, S, V, T>,
    ) -> Result<bool, CgError>
    where
        M: LinearOperator<V, Scalar = T>,
        P: Preconditioner<M, V>,
        S: InnerProduct<V, Scalar = T>,
        V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    {
        let dx_adx = self.inner.regularize(cache)?;
        Ok(dx_adx <= T::zero())
    }

    fn shift(&self) -> Option<T> {
        Some(self.inner.shift)
    }

    fn eps(&self) -> Option<&Eps<T>> {
        Some(&self.inner.eps)
    }

    fn reset(&mut self) {
        <RegularizedScaling<T> as Scaling<T>>::reset(&mut self.inner);
    }
}
