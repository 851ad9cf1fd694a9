//! Job board: user accounts, server-side sessions and job postings behind a
//! server-rendered web UI.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

pub mod config;
pub mod module;
pub use module::JobBoardModule;

// === INTERNAL MODULES ===
// Public so integration tests and the server binary can reach them.
pub mod api;
pub mod domain;
pub mod gateways;
pub mod infra;
