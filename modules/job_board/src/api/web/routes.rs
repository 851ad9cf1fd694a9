use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};

use crate::api::web::{
    handlers,
    session::{require_login, session_middleware},
    state::WebState,
};

/// All job board pages. Every route, the fallback included, runs inside the
/// session middleware; protected routes additionally pass the login guard.
pub fn router(state: WebState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route_layer(from_fn(require_login));

    Router::new()
        .route("/", get(handlers::home))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/logout", get(handlers::logout))
        .route(
            "/forgot-password",
            get(handlers::forgot_password_form).post(handlers::forgot_password),
        )
        .route(
            "/reset-password",
            get(handlers::reset_password_form).post(handlers::reset_password),
        )
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}
