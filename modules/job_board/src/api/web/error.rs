use axum::http::StatusCode;
use tracing::error;

use crate::domain::error::DomainError;

pub const MSG_REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
pub const MSG_LOGIN_FAILED: &str = "Login failed. Please try again.";

/// The form a failure is reported on; picks the generic retry message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Register,
    Login,
}

impl FormKind {
    fn retry_message(self) -> &'static str {
        match self {
            FormKind::Register => MSG_REGISTRATION_FAILED,
            FormKind::Login => MSG_LOGIN_FAILED,
        }
    }
}

/// Map a domain error to the status and inline message of the re-rendered form.
pub fn map_domain_error(e: &DomainError, form: FormKind) -> (StatusCode, String) {
    if e.is_internal() {
        // Log the internal error details but don't expose them to the client
        error!(error = ?e, form = ?form, "Internal error while handling form");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            form.retry_message().to_string(),
        );
    }
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_bad_requests_with_their_message() {
        let (status, msg) =
            map_domain_error(&DomainError::email_taken("a@b.co"), FormKind::Register);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "An account with this email already exists.");

        let (status, msg) = map_domain_error(&DomainError::InvalidCredentials, FormKind::Login);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid email or password.");
    }

    #[test]
    fn internal_errors_hide_details() {
        let e = DomainError::database("disk I/O error");
        let (status, msg) = map_domain_error(&e, FormKind::Register);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, MSG_REGISTRATION_FAILED);

        let (_, msg) = map_domain_error(&DomainError::password_hash("oom"), FormKind::Login);
        assert_eq!(msg, MSG_LOGIN_FAILED);
    }
}
