// econorm-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum EconormError {
    // --- DOMAIN (units, FX, quality) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, parsing, config) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Invalid batch options: {0}")]
    #[diagnostic(code(econorm::options))]
    InvalidOptions(String),

    #[error("Batch cancelled")]
    #[diagnostic(code(econorm::cancelled))]
    Cancelled,

    #[error("Internal Error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for EconormError {
    fn from(err: std::io::Error) -> Self {
        EconormError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl EconormError {
    /// Domain error behind this one, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}
