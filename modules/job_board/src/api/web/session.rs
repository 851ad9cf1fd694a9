use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::SignedCookieJar;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::api::web::{handlers::found, state::WebState, views};
use crate::contract::model::Session;
use crate::domain::sessions::{require_authenticated, Access};

#[derive(Debug)]
struct Slot {
    current: Option<Session>,
    cookie: CookieChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieChange {
    Keep,
    Issue(String),
    Remove,
}

/// The client's session for the duration of one request, shared between the
/// session middleware and the handlers through request extensions.
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<Mutex<Slot>>);

impl SessionHandle {
    fn new(session: Session, issued: bool) -> Self {
        let cookie = if issued {
            CookieChange::Issue(session.id.clone())
        } else {
            CookieChange::Keep
        };
        Self(Arc::new(Mutex::new(Slot {
            current: Some(session),
            cookie,
        })))
    }

    pub fn current(&self) -> Option<Session> {
        self.0.lock().current.clone()
    }

    pub fn view_context(&self) -> views::ViewContext {
        views::ViewContext::from_session(self.0.lock().current.as_ref())
    }

    /// Swap in a new session record and send its token to the client.
    pub fn replace(&self, session: Session) {
        let mut slot = self.0.lock();
        slot.cookie = CookieChange::Issue(session.id.clone());
        slot.current = Some(session);
    }

    /// Forget the session and clear the client's cookie.
    pub fn clear(&self) {
        let mut slot = self.0.lock();
        slot.current = None;
        slot.cookie = CookieChange::Remove;
    }

    fn cookie_change(&self) -> CookieChange {
        self.0.lock().cookie.clone()
    }
}

/// Resolve (or start) the session named by the signed cookie, expose it to
/// the handlers and write back any cookie change.
pub async fn session_middleware(
    State(state): State<WebState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = jar.get(&state.cookie.name).map(|c| c.value().to_owned());

    let session = match state.sessions.load_or_start(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load session: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::server_error(&views::ViewContext::anonymous()),
            )
                .into_response();
        }
    };

    let issued = token.as_deref() != Some(session.id.as_str());
    let handle = SessionHandle::new(session, issued);
    req.extensions_mut().insert(handle.clone());

    let response = next.run(req).await;

    let jar = match handle.cookie_change() {
        CookieChange::Keep => jar,
        CookieChange::Issue(token) => jar.add(state.cookie.session_cookie(token)),
        CookieChange::Remove => jar.remove(state.cookie.removal_cookie()),
    };
    (jar, response).into_response()
}

/// Guard for protected routes: anonymous visitors are sent to the login page.
pub async fn require_login(
    Extension(session): Extension<SessionHandle>,
    req: Request,
    next: Next,
) -> Response {
    match require_authenticated(session.current().as_ref()) {
        Access::Allow => next.run(req).await,
        Access::RedirectToLogin => {
            debug!(path = %req.uri().path(), "Anonymous request to protected route");
            found("/login")
        }
    }
}
