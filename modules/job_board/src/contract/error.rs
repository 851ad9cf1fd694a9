use thiserror::Error;

/// Errors that are safe to expose outside the module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobBoardError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid email or password")]
    Unauthenticated,

    #[error("Internal error")]
    Internal,
}

impl JobBoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for JobBoardError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { message, .. } => Self::validation(message),
            e @ (EmailTaken { .. } | UsernameTaken { .. }) => Self::conflict(e.to_string()),
            InvalidCredentials => Self::Unauthenticated,
            PasswordHash { .. } | Database { .. } => Self::Internal,
        }
    }
}
