//! # HTTP API Module
//!
//! Stateless request/response handlers over the `NlpService`. Every endpoint
//! validates its input, calls the service and maps the outcome onto the JSON
//! envelope the API speaks; nothing here calls back into the service layer's
//! internals.

pub mod routes;
pub mod types;

use std::error::Error;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::nlp::NlpService;

/// API server for the NLP endpoints
pub struct ApiServer {
    service: Arc<NlpService>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(service: Arc<NlpService>, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self {
            service,
            host,
            port,
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = router(Arc::clone(&self.service));

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Builds the application router.
///
/// Split out from `ApiServer::start` so integration tests can drive the exact
/// production routing table without binding a socket.
pub fn router(service: Arc<NlpService>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/status", get(routes::status))
        .route("/api/modelo", get(routes::model_info))
        .route("/api/sentimento", post(routes::analyze_sentiment))
        .route("/api/gerar", post(routes::generate_text))
        .route("/api/resumir", post(routes::summarize_text))
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        // The web page may be served from another origin during development
        .layer(CorsLayer::permissive())
        .with_state(service)
}
