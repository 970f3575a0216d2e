use crate::api::handlers::{get_history, health_check, receive_uplink, reset_history, AppState};
use crate::api::middleware::api_headers;
use crate::config::ApiConfig;
use crate::engine::pipeline::LocationPipeline;
use crate::resolver::CoordinateResolver;
use crate::storage::HistoryLog;
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// HTTP/HTTPS API server
pub struct HttpServer {
    app_state: AppState,
    bind_addr: SocketAddr,
    enable_tls: bool,
    tls_cert_path: Option<String>,
    tls_key_path: Option<String>,
    cors_allowed_origins: Vec<String>,
}

impl HttpServer {
    pub fn new(
        resolver: Arc<dyn CoordinateResolver>,
        history: Arc<HistoryLog>,
        config: ApiConfig,
    ) -> Self {
        let pipeline = LocationPipeline::new(resolver, history);

        Self {
            app_state: AppState::new(pipeline),
            bind_addr: config.bind_addr,
            enable_tls: config.enable_tls,
            tls_cert_path: config.tls_cert.map(|p| p.to_string_lossy().to_string()),
            tls_key_path: config.tls_key.map(|p| p.to_string_lossy().to_string()),
            cors_allowed_origins: config.cors_allowed_origins,
        }
    }

    /// Build the Axum router with all routes and middleware
    pub fn build_router(&self) -> Router {
        // The webhook reads its own body with a 1 MiB cap, so oversized
        // uploads get a JSON `error` reply instead of axum's 413.
        let routes = Router::new()
            .route("/health", get(health_check))
            .route("/webhook", post(receive_uplink))
            .route("/history", get(get_history))
            .route("/reset", post(reset_history));

        let cors = if self.cors_allowed_origins.iter().any(|o| o == "*") {
            // Dashboards may be served from anywhere
            info!("CORS configured to allow all origins");
            CorsLayer::permissive()
        } else {
            let origins: Vec<_> = self
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
        };

        routes
            .layer(cors)
            .layer(middleware::from_fn(api_headers))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Start the HTTP/HTTPS server
    pub async fn serve(self) -> Result<()> {
        let app = self.build_router();

        if self.enable_tls {
            info!("Starting HTTPS server on {} with TLS", self.bind_addr);

            let cert_path = self.tls_cert_path.as_ref().ok_or_else(|| {
                anyhow::anyhow!("TLS enabled but cert path not configured")
            })?;
            let key_path = self.tls_key_path.as_ref().ok_or_else(|| {
                anyhow::anyhow!("TLS enabled but key path not configured")
            })?;

            let config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;

            axum_server::bind_rustls(self.bind_addr, config)
                .serve(app.into_make_service())
                .await?;
        } else {
            info!("Starting HTTP server on {}", self.bind_addr);

            axum_server::bind(self.bind_addr)
                .serve(app.into_make_service())
                .await?;
        }

        Ok(())
    }
}
