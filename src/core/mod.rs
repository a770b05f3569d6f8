//! Operator abstractions and faer interop.

pub mod traits;
pub mod wrappers;

pub use traits::{Indexing, InnerProduct, LinearOperator};
pub use wrappers::EuclideanProduct;
