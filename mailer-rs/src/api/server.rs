//! API Server - HTTP server for the email API

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::handlers::{self, ApiError, AppState};
use crate::config::Config;
use crate::service::EmailService;

/// Header carrying the client API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: &Config, service: Arc<EmailService>) -> Self {
        if config.security.api_key.is_empty() {
            warn!("No API key configured: every /api/emails request will be rejected");
        }

        let state = Arc::new(AppState {
            service,
            api_key: config.security.api_key.clone(),
        });

        Self {
            state,
            addr: config.server.listen_addr.clone(),
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        // Protected routes (API key required)
        let email_routes = Router::new()
            .route("/welcome", post(handlers::send_welcome))
            .route("/password-reset", post(handlers::send_password_reset))
            .route("/notification", post(handlers::send_notification))
            .route("/alert", post(handlers::send_alert))
            .route("/order-confirmation", post(handlers::send_order_confirmation))
            .route("/batch", post(handlers::send_batch))
            .route("/preview", post(handlers::preview))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                api_key_middleware,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .nest("/api/emails", email_routes)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Start the API server, stopping on Ctrl-C
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        info!("Starting API server on {}", listener.local_addr()?);

        self.serve(listener, shutdown_signal()).await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Authentication middleware - checks the `X-API-Key` header
async fn api_key_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if !state.api_key.is_empty() && key == state.api_key => next.run(req).await,
        Some(_) => {
            warn!("Request with invalid API key: {}", req.uri().path());
            (StatusCode::FORBIDDEN, Json(ApiError::new("Invalid API key"))).into_response()
        }
        None => {
            warn!("Request without API key: {}", req.uri().path());
            (StatusCode::FORBIDDEN, Json(ApiError::new("Missing API key"))).into_response()
        }
    }
}
