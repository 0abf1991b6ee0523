use crate::handlers::*;
use crate::tls::{install_crypto_provider, resolve_tls, TlsMode};
use crate::AppState;
use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use miette::{Context, IntoDiagnostic};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};
use uuid::Uuid;

/// Grace period for in-flight TLS connections on shutdown
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Extender server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on
    pub listen_addr: SocketAddr,

    /// Path prefix the orchestrator's `urlPrefix` points at
    pub url_prefix: String,

    pub tls: TlsMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
            url_prefix: String::new(),
            tls: TlsMode::Disabled,
        }
    }
}

/// Reduce a configured prefix to `""` or `/segment[/segment...]`
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Scheduler extender HTTP server
pub struct ApiServer {
    config: Config,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        let extender_routes = Router::new()
            .route("/filter", get(filter).post(filter))
            .route("/prioritize", get(prioritize).post(prioritize));

        let prefix = normalize_prefix(&self.config.url_prefix);
        let router = Router::new()
            .route("/", get(index))
            // Health checks
            .route("/healthz", get(healthz))
            .route("/livez", get(livez))
            .route("/readyz", get(readyz));

        let router = if prefix.is_empty() {
            router.merge(extender_routes)
        } else {
            router.nest(&prefix, extender_routes)
        };

        router
            .fallback(not_found)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    info_span!(
                        "request",
                        id = %Uuid::new_v4(),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> miette::Result<()> {
        let app = self.build_router();
        let addr = self.config.listen_addr;
        let prefix = normalize_prefix(&self.config.url_prefix);

        match resolve_tls(&self.config.tls)? {
            None => {
                let listener = TcpListener::bind(addr)
                    .await
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to bind {}", addr))?;

                info!("Extender listening on http://{}{}", addr, prefix);

                axum::serve(listener, app)
                    .with_graceful_shutdown(async move { shutdown.cancelled().await })
                    .await
                    .into_diagnostic()
                    .wrap_err("extender server failed")?;
            }
            Some(material) => {
                install_crypto_provider();
                let rustls_config = RustlsConfig::from_pem(material.cert_pem, material.key_pem)
                    .await
                    .into_diagnostic()
                    .wrap_err("failed to build TLS configuration")?;

                let handle = axum_server::Handle::new();
                let drain = handle.clone();
                tokio::spawn(async move {
                    shutdown.cancelled().await;
                    drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
                });

                info!("Extender listening on https://{}{}", addr, prefix);

                axum_server::bind_rustls(addr, rustls_config)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
                    .into_diagnostic()
                    .wrap_err("extender server failed")?;
            }
        }

        info!("Extender stopped");
        Ok(())
    }
}
