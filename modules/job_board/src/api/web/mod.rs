//! Server-rendered HTML surface: forms, session cookie handling and the
//! authentication guard.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

pub use routes::router;
pub use state::{CookieSettings, WebState};
