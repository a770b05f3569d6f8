use thiserror::Error;

// Unified error type for cgkit

#[derive(Error, Debug)]
pub enum CgError {
    #[error("invalid operator: {0}")]
    InvalidOperator(String),
    #[error("preconditioner error: {0}")]
    Preconditioner(String),
    #[error("contract violation: {0}")]
    ContractViolation(String),
}
