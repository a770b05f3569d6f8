// Diagonal (Jacobi) preconditioner
//
// P·r divides the residual by the diagonal of A. For the SPD operators the
// CG family targets, every diagonal entry must be strictly positive; setup
// and apply enforce that instead of silently skipping bad entries.

use crate::core::traits::{Indexing, LinearOperator};
use crate::error::CgError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: P = D⁻¹ with D = diag(A).
pub struct Jacobi<T> {
    diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// Create an unconfigured Jacobi preconditioner; call `setup` before use.
    pub fn new() -> Self {
        Self { diag: Vec::new() }
    }

    /// Build directly from a known diagonal. Rejects entries that are not
    /// strictly positive (NaN included).
    pub fn from_diagonal(diag: Vec<T>) -> Result<Self, CgError> {
        if let Some(i) = diag.iter().position(|d| !(*d > T::zero())) {
            return Err(CgError::Preconditioner(format!(
                "jacobi: diagonal entry {i} is not positive"
            )));
        }
        Ok(Self { diag })
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: LinearOperator<V, Scalar = T> + Indexing,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>>,
    T: Float + Send + Sync,
{
    /// Probe the diagonal through the operator interface.
    ///
    /// A single basis vector is walked along the axes; only the touched
    /// entry is reset between probes. Non-positive diagonal entries are a
    /// defect of the supplied operator, not something to paper over.
    fn setup(&mut self, a: &M) -> Result<(), CgError> {
        let n = a.nrows();
        let mut probe = V::from(vec![T::zero(); n]);
        let mut image = V::from(vec![T::zero(); n]);
        let mut diag = Vec::with_capacity(n);
        for i in 0..n {
            probe.as_mut()[i] = T::one();
            a.apply(&probe, &mut image);
            probe.as_mut()[i] = T::zero();
            let d = image.as_ref()[i];
            if !(d > T::zero()) {
                return Err(CgError::Preconditioner(format!(
                    "jacobi: diagonal entry {i} is not positive"
                )));
            }
            diag.push(d);
        }
        self.diag = diag;
        Ok(())
    }

    /// z[i] = r[i] / diag[i]
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        let r_ref = r.as_ref();
        let z_mut = z.as_mut();
        if self.diag.len() != r_ref.len() {
            return Err(CgError::Preconditioner(format!(
                "jacobi: diagonal of length {} applied to residual of length {}",
                self.diag.len(),
                r_ref.len()
            )));
        }
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            z_mut
                .par_iter_mut()
                .zip(r_ref.par_iter())
                .zip(self.diag.par_iter())
                .for_each(|((zi, ri), di)| *zi = *ri / *di);
        }
        #[cfg(not(feature = "rayon"))]
        {
            for ((zi, ri), di) in z_mut.iter_mut().zip(r_ref).zip(&self.diag) {
                *zi = *ri / *di;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    #[test]
    fn setup_probes_the_diagonal() {
        let a = Mat::from_fn(3, 3, |i, j| if i == j { (i + 2) as f64 } else { 0.5 });
        let mut pc = Jacobi::<f64>::new();
        <Jacobi<f64> as Preconditioner<Mat<f64>, Vec<f64>>>::setup(&mut pc, &a).unwrap();
        assert_eq!(pc.diag, vec![2.0, 3.0, 4.0]);

        let r = vec![2.0, 3.0, 4.0];
        let mut z = vec![0.0; 3];
        <Jacobi<f64> as Preconditioner<Mat<f64>, Vec<f64>>>::apply(&pc, &r, &mut z).unwrap();
        assert_eq!(z, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn setup_rejects_a_nonpositive_diagonal() {
        let a = Mat::from_fn(2, 2, |i, j| if i == j { if i == 0 { 1.0 } else { -1.0 } } else { 0.0 });
        let mut pc = Jacobi::<f64>::new();
        let err = <Jacobi<f64> as Preconditioner<Mat<f64>, Vec<f64>>>::setup(&mut pc, &a)
            .unwrap_err();
        assert!(matches!(err, CgError::Preconditioner(_)));
    }

    #[test]
    fn from_diagonal_validates_and_applies() {
        let pc = Jacobi::from_diagonal(vec![4.0, 0.5]).unwrap();
        let r = vec![8.0, 1.0];
        let mut z = vec![0.0; 2];
        <Jacobi<f64> as Preconditioner<Mat<f64>, Vec<f64>>>::apply(&pc, &r, &mut z).unwrap();
        assert_eq!(z, vec![2.0, 2.0]);

        assert!(Jacobi::from_diagonal(vec![1.0, 0.0]).is_err());
        assert!(Jacobi::from_diagonal(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn apply_rejects_mismatched_lengths() {
        let pc = Jacobi::from_diagonal(vec![1.0, 2.0]).unwrap();
        let r = vec![1.0, 2.0, 3.0];
        let mut z = vec![0.0; 3];
        let err =
            <Jacobi<f64> as Preconditioner<Mat<f64>, Vec<f64>>>::apply(&pc, &r, &mut z).unwrap_err();
        assert!(matches!(err, CgError::Preconditioner(_)));
    }
}
