//! Shared helpers for the job_board integration tests.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

use job_board::config::{JobBoardConfig, PasswordConfig};
use job_board::infra::storage::db::connect_in_memory;
use job_board::JobBoardModule;
use runtime::SessionConfig;

pub const COOKIE_NAME: &str = "job_board.sid";

/// Cheap Argon2 parameters so tests stay fast.
pub fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: "integration-test-secret".to_string(),
        cookie_name: COOKIE_NAME.to_string(),
        ttl_days: 14,
    }
}

/// Module over a fresh in-memory database.
pub async fn test_module(dashboard_limit: u32) -> (JobBoardModule, SqlitePool) {
    let pool = connect_in_memory().await.expect("in-memory database");
    let cfg = JobBoardConfig {
        dashboard_limit,
        password: fast_password_config(),
    };
    let module =
        JobBoardModule::new(pool.clone(), &session_config(), &cfg, false).expect("module init");
    (module, pool)
}

/// Minimal browser: remembers the session cookie between requests.
pub struct Browser {
    router: Router,
    cookie: Option<String>,
}

pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl Browser {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        let req = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={}", form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> Page {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let page = read_page(resp).await;
        if let Some(set) = &page.set_cookie {
            let pair = set.split(';').next().unwrap_or_default().to_string();
            // A removal cookie carries an empty value.
            if pair.ends_with('=') {
                self.cookie = None;
            } else {
                self.cookie = Some(pair);
            }
        }
        page
    }
}

async fn read_page(resp: Response<Body>) -> Page {
    let status = resp.status();
    let header_str = |name: header::HeaderName| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let location = header_str(header::LOCATION);
    let set_cookie = header_str(header::SET_COOKIE);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    Page {
        status,
        location,
        set_cookie,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn form_encode(value: &str) -> String {
    let mut out = String::new();
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub async fn register(browser: &mut Browser, username: &str, email: &str, password: &str) -> Page {
    browser
        .post_form(
            "/register",
            &[("username", username), ("email", email), ("password", password)],
        )
        .await
}

pub async fn login(browser: &mut Browser, email: &str, password: &str) -> Page {
    browser
        .post_form("/login", &[("email", email), ("password", password)])
        .await
}
