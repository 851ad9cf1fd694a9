use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use sha2::{Digest, Sha512};

use crate::domain::{accounts::AccountService, jobs::JobService, sessions::SessionService};

/// Attributes of the session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    /// Adds the `Secure` attribute; on in production.
    pub secure: bool,
    pub max_age_days: i64,
}

impl CookieSettings {
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(self.max_age_days))
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

/// Signing key for the cookie jar, stretched from the configured secret so
/// that secrets of any length yield the 64 bytes `Key` requires.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Router state: the services plus everything the handlers need to render.
#[derive(Clone)]
pub struct WebState {
    pub accounts: Arc<AccountService>,
    pub sessions: Arc<SessionService>,
    pub jobs: Arc<JobService>,
    pub cookie: CookieSettings,
    pub key: Key,
    pub dashboard_limit: u32,
}

impl FromRef<WebState> for Key {
    fn from_ref(state: &WebState) -> Self {
        state.key.clone()
    }
}
