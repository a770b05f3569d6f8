//! Maximal attainable accuracy ε.

use crate::mixin::connection::Shared;
use num_traits::Float;

/// Mixin for the maximal attainable accuracy ε.
///
/// ε bounds what any termination criterion may sensibly demand and seeds the
/// regularization shift θ₀ = √ε.
pub struct Eps<T: Copy> {
    node: Shared<T>,
}

impl<T: Float> Eps<T> {
    pub fn new(eps: T) -> Self {
        assert!(eps > T::zero());
        Eps {
            node: Shared::new(eps),
        }
    }

    pub fn get(&self) -> T {
        self.node.get()
    }

    pub fn set(&self, eps: T) {
        assert!(eps > T::zero());
        self.node.set(eps);
    }

    /// √ε
    pub fn sqrt(&self) -> T {
        self.get().sqrt()
    }

    /// ε^(1/3)
    pub fn cbrt(&self) -> T {
        self.get().cbrt()
    }

    pub fn connect(&self, other: &Eps<T>) {
        self.node.connect(&other.node);
    }
}

impl<T: Float> Default for Eps<T> {
    fn default() -> Self {
        Eps::new(T::epsilon())
    }
}
