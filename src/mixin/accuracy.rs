//! Absolute and relative accuracy mixins.

use crate::mixin::connection::Shared;
use num_traits::Float;

/// Mixin for absolute accuracy.
pub struct AbsoluteAccuracy<T: Copy> {
    node: Shared<T>,
}

impl<T: Float> AbsoluteAccuracy<T> {
    pub fn new(accuracy: T) -> Self {
        assert!(accuracy >= T::zero());
        AbsoluteAccuracy {
            node: Shared::new(accuracy),
        }
    }

    pub fn get(&self) -> T {
        self.node.get()
    }

    pub fn set(&self, accuracy: T) {
        assert!(accuracy >= T::zero());
        self.node.set(accuracy);
    }

    pub fn connect(&self, other: &AbsoluteAccuracy<T>) {
        self.node.connect(&other.node);
    }
}

impl<T: Float> Default for AbsoluteAccuracy<T> {
    fn default() -> Self {
        AbsoluteAccuracy::new(T::epsilon())
    }
}

/// Mixin for relative accuracy.
pub struct RelativeAccuracy<T: Copy> {
    node: Shared<T>,
}

impl<T: Float> RelativeAccuracy<T> {
    pub fn new(accuracy: T) -> Self {
        assert!(accuracy >= T::zero());
        RelativeAccuracy {
            node: Shared::new(accuracy),
        }
    }

    pub fn get(&self) -> T {
        self.node.get()
    }

    pub fn set(&self, accuracy: T) {
        assert!(accuracy >= T::zero());
        self.node.set(accuracy);
    }

    pub fn connect(&self, other: &RelativeAccuracy<T>) {
        self.node.connect(&other.node);
    }
}

impl<T: Float> Default for RelativeAccuracy<T> {
    fn default() -> Self {
        RelativeAccuracy::new(T::epsilon())
    }
}
