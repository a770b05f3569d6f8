//! Core linear-algebra traits for cgkit.

/// Linear operator A acting on vectors of type `V`.
pub trait LinearOperator<V> {
    /// Associated scalar type.
    type Scalar: Copy;
    /// Compute y = A · x.
    fn apply(&self, x: &V, y: &mut V);
    /// Compute y = y + α · A · x.
    fn applyscaleadd(&self, alpha: Self::Scalar, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Uniform indexing into vectors (dense or sparse).
pub trait Indexing {
    /// Number of rows (or length for a vector).
    fn nrows(&self) -> usize;
}
