use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// The display strings of the user-facing variants are shown verbatim on the
/// rendered forms.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("An account with this email already exists.")]
    EmailTaken { email: String },

    #[error("This username is already taken.")]
    UsernameTaken { username: String },

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    pub fn password_hash(message: impl Into<String>) -> Self {
        Self::PasswordHash {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Store or hashing failure; the client only ever sees a generic retry message.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::PasswordHash { .. } | Self::Database { .. })
    }
}
