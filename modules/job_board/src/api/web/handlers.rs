use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Form,
};
use tracing::{error, info, warn};

use crate::api::web::dto::{
    ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm, ResetPasswordQuery,
};
use crate::api::web::error::{map_domain_error, FormKind};
use crate::api::web::session::SessionHandle;
use crate::api::web::state::WebState;
use crate::api::web::views;
use crate::domain::accounts::{MIN_PASSWORD_LEN, MSG_PASSWORD_TOO_SHORT};

pub const MSG_RESET_LINK_SENT: &str =
    "If an account with that email exists, a password reset link has been sent.";
pub const MSG_RESET_FIELDS_REQUIRED: &str = "Please fill in both password fields.";
pub const MSG_PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match.";
pub const MSG_PASSWORD_RESET: &str = "Your password has been reset. You can now log in.";
pub const MSG_JOBS_UNAVAILABLE: &str = "Jobs could not be loaded right now.";

/// 302 Found to `location`.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

pub async fn home(Extension(session): Extension<SessionHandle>) -> Response {
    views::home(&session.view_context()).into_response()
}

pub async fn login_form(Extension(session): Extension<SessionHandle>) -> Response {
    views::login(&session.view_context(), None).into_response()
}

pub async fn register_form(Extension(session): Extension<SessionHandle>) -> Response {
    views::register(&session.view_context(), None).into_response()
}

/// Create an account, then send the visitor to the login page
pub async fn register(
    State(state): State<WebState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<RegisterForm>,
) -> Response {
    info!("Registration attempt: {:?}", form);

    match state.accounts.register(form.into()).await {
        Ok(user) => {
            info!("User registered: {} ({})", user.username, user.email);
            found("/login")
        }
        Err(e) => {
            warn!("Registration rejected: {}", e);
            let (status, message) = map_domain_error(&e, FormKind::Register);
            (status, views::register(&session.view_context(), Some(&message))).into_response()
        }
    }
}

/// Check credentials and mark the session as authenticated
pub async fn login(
    State(state): State<WebState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<LoginForm>,
) -> Response {
    info!("Login attempt: {:?}", form);

    let user = match state.accounts.authenticate(form.into()).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Login rejected: {}", e);
            let (status, message) = map_domain_error(&e, FormKind::Login);
            return (status, views::login(&session.view_context(), Some(&message)))
                .into_response();
        }
    };

    let previous = session.current();
    match state
        .sessions
        .log_in(previous.as_ref().map(|s| s.id.as_str()), &user)
        .await
    {
        Ok(authenticated) => {
            session.replace(authenticated);
            info!("User logged in: {}", user.username);
            found("/dashboard")
        }
        Err(e) => {
            let (status, message) = map_domain_error(&e, FormKind::Login);
            (status, views::login(&session.view_context(), Some(&message))).into_response()
        }
    }
}

/// Destroy the session and clear the cookie; a store failure leaves both in place
pub async fn logout(
    State(state): State<WebState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    if let Some(current) = session.current() {
        if let Err(e) = state.sessions.destroy(&current.id).await {
            error!("Failed to destroy session: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::server_error(&session.view_context()),
            )
                .into_response();
        }
        if let Some(username) = current.username {
            info!("User logged out: {}", username);
        }
    }
    session.clear();
    found("/")
}

/// Protected landing page with the most recent job postings
pub async fn dashboard(
    State(state): State<WebState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let ctx = session.view_context();
    match state.jobs.recent_jobs(state.dashboard_limit).await {
        Ok(jobs) => views::dashboard(&ctx, &jobs, None).into_response(),
        Err(e) => {
            error!("Failed to load jobs for dashboard: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::dashboard(&ctx, &[], Some(MSG_JOBS_UNAVAILABLE)),
            )
                .into_response()
        }
    }
}

pub async fn forgot_password_form(Extension(session): Extension<SessionHandle>) -> Response {
    views::forgot_password(&session.view_context(), None, None).into_response()
}

/// Always answers with the same message so account existence is not revealed.
/// No token is issued and no email is sent.
pub async fn forgot_password(
    Extension(session): Extension<SessionHandle>,
    Form(_form): Form<ForgotPasswordForm>,
) -> Response {
    info!("Password reset requested");
    views::forgot_password(&session.view_context(), Some(MSG_RESET_LINK_SENT), None)
        .into_response()
}

pub async fn reset_password_form(
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<ResetPasswordQuery>,
) -> Response {
    views::reset_password(&session.view_context(), &query.token, None, None).into_response()
}

fn check_new_password(form: &ResetPasswordForm) -> Result<(), &'static str> {
    if form.password.is_empty() || form.confirm_password.is_empty() {
        return Err(MSG_RESET_FIELDS_REQUIRED);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MSG_PASSWORD_TOO_SHORT);
    }
    if form.password != form.confirm_password {
        return Err(MSG_PASSWORDS_DO_NOT_MATCH);
    }
    Ok(())
}

/// Validates the form and reports success; no stored password is changed.
pub async fn reset_password(
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let ctx = session.view_context();
    match check_new_password(&form) {
        Ok(()) => {
            info!("Password reset submitted (simulated)");
            views::reset_password(&ctx, &form.token, Some(MSG_PASSWORD_RESET), None)
                .into_response()
        }
        Err(message) => (
            StatusCode::BAD_REQUEST,
            views::reset_password(&ctx, &form.token, None, Some(message)),
        )
            .into_response(),
    }
}

pub async fn not_found(Extension(session): Extension<SessionHandle>, uri: Uri) -> Response {
    info!("Route not found: {}", uri.path());
    (StatusCode::NOT_FOUND, views::not_found(&session.view_context())).into_response()
}
