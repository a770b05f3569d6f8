//! Step-count, refinement-count and verbosity mixins.

use crate::mixin::connection::Shared;

/// Mixin for the maximal number of solver steps.
pub struct MaxSteps {
    node: Shared<usize>,
}

impl MaxSteps {
    pub fn new(steps: usize) -> Self {
        MaxSteps {
            node: Shared::new(steps),
        }
    }

    pub fn get(&self) -> usize {
        self.node.get()
    }

    pub fn set(&self, steps: usize) {
        self.node.set(steps);
    }

    pub fn connect(&self, other: &MaxSteps) {
        self.node.connect(&other.node);
    }
}

impl Default for MaxSteps {
    fn default() -> Self {
        MaxSteps::new(1000)
    }
}

/// Mixin for the number of iterative refinements of the preconditioner apply.
pub struct IterativeRefinements {
    node: Shared<usize>,
}

impl IterativeRefinements {
    pub fn new(refinements: usize) -> Self {
        IterativeRefinements {
            node: Shared::new(refinements),
        }
    }

    pub fn get(&self) -> usize {
        self.node.get()
    }

    pub fn set(&self, refinements: usize) {
        self.node.set(refinements);
    }

    pub fn connect(&self, other: &IterativeRefinements) {
        self.node.connect(&other.node);
    }
}

impl Default for IterativeRefinements {
    fn default() -> Self {
        IterativeRefinements::new(0)
    }
}

/// Mixin for the verbosity level.
///
/// Level 1 prints a final summary, level 2 additionally prints one line per
/// iteration.
pub struct Verbosity {
    node: Shared<u32>,
}

impl Verbosity {
    pub fn new(level: u32) -> Self {
        Verbosity {
            node: Shared::new(level),
        }
    }

    pub fn get(&self) -> u32 {
        self.node.get()
    }

    pub fn set(&self, level: u32) {
        self.node.set(level);
    }

    /// Print the final summary?
    pub fn summary(&self) -> bool {
        self.get() >= 1
    }

    /// Print per-iteration output?
    pub fn iteration(&self) -> bool {
        self.get() >= 2
    }

    pub fn connect(&self, other: &Verbosity) {
        self.node.connect(&other.node);
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::new(0)
    }
}
