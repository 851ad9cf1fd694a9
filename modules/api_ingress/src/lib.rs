//! HTTP edge of the job board server: global middleware, health endpoint,
//! embedded static assets and the serve loop.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use runtime::{AppConfig, ServerConfig};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod assets;
mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Name of this module's entry in the `modules` config bag.
pub const MODULE_NAME: &str = "api_ingress";

#[derive(Debug, Clone, Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let mut config: ApiIngressConfig = app.module_config(MODULE_NAME)?;
        if app.server.timeout_sec > 0 {
            config.request_timeout_secs = app.server.timeout_sec;
        }
        tracing::debug!(
            module = "api_ingress",
            "Loaded config: timeout={}s, body_limit={}B",
            config.request_timeout_secs,
            config.body_limit_bytes
        );
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap the application routes with `/health`, `/static/*` and the global
    /// middleware stack.
    ///
    /// Request order, outermost first:
    /// SetRequestId -> Trace -> push_req_id_to_extensions -> PropagateRequestId -> Timeout -> BodyLimit
    pub fn build_router(&self, app: Router) -> Router {
        let x_request_id = request_id::header();

        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .route("/static/{*file}", get(assets::serve_static_asset))
            .merge(app);

        // Router::layer wraps what is already there, so innermost goes first.
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        router = router.layer(TimeoutLayer::new(self.config.request_timeout()));
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        router
    }

    /// Bind and serve until SIGINT/SIGTERM, letting in-flight requests finish.
    pub async fn serve(&self, router: Router, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                runtime::shutdown::shutdown_signal().await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

/// Socket address from `server.host` and `server.port`.
pub fn bind_addr(server: &ServerConfig) -> Result<SocketAddr> {
    let raw = format!("{}:{}", server.host, server.port);
    raw.parse()
        .with_context(|| format!("Invalid bind address '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_server_config() {
        let server = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(bind_addr(&server).unwrap().to_string(), "0.0.0.0:8080");

        let bad = ServerConfig {
            host: "not a host".into(),
            ..ServerConfig::default()
        };
        assert!(bind_addr(&bad).is_err());
    }
}
