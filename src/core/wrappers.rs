// Wrappers for faer::Mat, faer::MatRef and plain Vec storage

use crate::core::traits::{Indexing, InnerProduct, LinearOperator};
use faer::{Mat, MatRef};
use num_traits::Float;

impl<T: Float> LinearOperator<Vec<T>> for Mat<T> {
    type Scalar = T;

    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len());
        assert_eq!(self.ncols(), x.len());
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }

    fn applyscaleadd(&self, alpha: T, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len());
        assert_eq!(self.ncols(), x.len());
        for i in 0..self.nrows() {
            let mut acc = T::zero();
            for j in 0..self.ncols() {
                acc = acc + self[(i, j)] * x[j];
            }
            y[i] = y[i] + alpha * acc;
        }
    }
}

impl<'a, T: Float> LinearOperator<Vec<T>> for MatRef<'a, T> {
    type Scalar = T;

    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len());
        assert_eq!(self.ncols(), x.len());
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }

    fn applyscaleadd(&self, alpha: T, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len());
        assert_eq!(self.ncols(), x.len());
        for i in 0..self.nrows() {
            let mut acc = T::zero();
            for j in 0..self.ncols() {
                acc = acc + self[(i, j)] * x[j];
            }
            y[i] = y[i] + alpha * acc;
        }
    }
}

/// The Euclidean scalar product ⟨x, y⟩ = Σ xᵢ yᵢ.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanProduct;

impl<T: Float + From<f64>> InnerProduct<Vec<T>> for EuclideanProduct {
    type Scalar = T;

    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len());
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| *xi * *yi)
            .fold(T::zero(), |acc, v| acc + v)
    }

    fn norm(&self, x: &Vec<T>) -> T {
        x.iter()
            .map(|xi| *xi * *xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }
}

impl<T> Indexing for Vec<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}

impl<T> Indexing for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
}
