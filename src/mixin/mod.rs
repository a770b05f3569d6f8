//! Connected tolerance carriers shared between solver components.
//!
//! Each carrier wraps a [`connection::Shared`] node. Nodes of the same kind
//! can be connected so that setting a value on any of them propagates to all
//! transitively connected peers before the setter returns. Connections are
//! single-threaded by design; wire them on the thread that runs the solve.

pub mod accuracy;
pub mod connection;
pub mod eps;
pub mod limits;

pub use accuracy::{AbsoluteAccuracy, RelativeAccuracy};
pub use connection::Shared;
pub use eps::Eps;
pub use limits::{IterativeRefinements, MaxSteps, Verbosity};
