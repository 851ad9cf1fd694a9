use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Credentials, NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::password::PasswordHasher;
use crate::domain::repo::{InsertUserError, UsersRepository};

pub const MSG_REGISTER_FIELDS_REQUIRED: &str = "All fields are required!";
pub const MSG_LOGIN_FIELDS_REQUIRED: &str = "Both fields are required!";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

/// Trim and lowercase, the form emails are stored and looked up in.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Registration and credential checks.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UsersRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    #[instrument(
        name = "job_board.service.register",
        skip(self, new_user),
        fields(username = %new_user.username.trim(), email = %normalize_email(&new_user.email))
    )]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        let username = new_user.username.trim().to_string();
        let email = normalize_email(&new_user.email);
        if username.is_empty() || email.is_empty() || new_user.password.is_empty() {
            return Err(DomainError::validation("form", MSG_REGISTER_FIELDS_REQUIRED));
        }
        if !is_valid_email(&email) {
            return Err(DomainError::validation("email", MSG_INVALID_EMAIL));
        }
        if new_user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation("password", MSG_PASSWORD_TOO_SHORT));
        }

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .is_some()
        {
            return Err(DomainError::email_taken(email));
        }
        if self
            .users
            .find_by_username(&username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .is_some()
        {
            return Err(DomainError::username_taken(username));
        }

        let password_hash = self.hasher.hash(&new_user.password).await?;
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        };

        self.users.insert(user.clone()).await.map_err(|e| match e {
            InsertUserError::EmailTaken => DomainError::email_taken(user.email.clone()),
            InsertUserError::UsernameTaken => DomainError::username_taken(user.username.clone()),
            InsertUserError::Other(e) => DomainError::database(e.to_string()),
        })?;

        info!("Successfully registered user with id={}", user.id);
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(
        name = "job_board.service.authenticate",
        skip(self, credentials),
        fields(email = %normalize_email(&credentials.email))
    )]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<User, DomainError> {
        let email = normalize_email(&credentials.email);
        if email.is_empty() || credentials.password.is_empty() {
            return Err(DomainError::validation("form", MSG_LOGIN_FIELDS_REQUIRED));
        }

        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        else {
            debug!("No account for email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(&credentials.password, &user.password_hash)
            .await
        {
            debug!("Password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        info!("User authenticated: {}", user.username);
        Ok(user)
    }
}
