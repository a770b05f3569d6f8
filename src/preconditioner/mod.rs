//! Preconditioners for the CG family.

use crate::error::CgError;

/// A preconditioner P ≈ A⁻¹.
///
/// `pre` and `post` bracket a solve; most preconditioners leave them as
/// no-ops. `apply` writes z = P · r.
pub trait Preconditioner<M, V> {
    /// Optional pre-solve hook; may mutate the iterate and the residual.
    fn pre(&self, _x: &mut V, _b: &mut V) -> Result<(), CgError> {
        Ok(())
    }
    /// Apply P to r, writing z = P · r.
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError>;
    /// Optional post-solve hook.
    fn post(&self, _x: &mut V) -> Result<(), CgError> {
        Ok(())
    }
    /// Optionally: setup/factorize from A.
    fn setup(&mut self, _a: &M) -> Result<(), CgError> {
        Ok(())
    }
}

pub mod jacobi;
pub use jacobi::Jacobi;

/// The trivial preconditioner P = I.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<M, V: Clone> Preconditioner<M, V> for Identity {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        z.clone_from(r);
        Ok(())
    }
}
