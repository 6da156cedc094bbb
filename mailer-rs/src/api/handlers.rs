//! API request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::api::types::{
    AlertRequest, BatchRequest, BatchResponse, HealthResponse, NotificationRequest,
    OrderConfirmationRequest, PasswordResetRequest, SendResponse, UserInput, WelcomeRequest,
};
use crate::email::{Company, Email, EmailContent};
use crate::error::MailerError;
use crate::service::{EmailService, RenderedEmail};

/// Shared application state
pub struct AppState {
    pub service: Arc<EmailService>,
    /// Expected `X-API-Key` value
    pub api_key: String,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn service_error(err: MailerError) -> (StatusCode, Json<ApiError>) {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Email request failed: {}", err);
    } else {
        warn!("Email request rejected: {}", err);
    }
    (status, Json(ApiError::new(&err.to_string())))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, (StatusCode, Json<ApiError>)> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Invalid request body: {}", rejection.body_text());
        (
            rejection.status(),
            Json(ApiError::new(&rejection.body_text())),
        )
    })
}

/// Send one message for a single-send request
async fn send_to_user(
    state: &AppState,
    company: Company,
    user: &UserInput,
    content: EmailContent,
) -> ApiResult<SendResponse> {
    let (primary, to) = user.recipients().map_err(service_error)?;
    let email = Email::new(company, primary, content);

    let receipt = state
        .service
        .send(&email, &to, None, None, Vec::new(), Vec::new())
        .await
        .map_err(service_error)?;

    Ok(Json(SendResponse {
        status: "success".to_string(),
        message_id: receipt.id,
    }))
}

/// GET /health - Service status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.service.provider_name().to_string(),
    })
}

/// POST /api/emails/welcome
pub async fn send_welcome(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WelcomeRequest>, JsonRejection>,
) -> ApiResult<SendResponse> {
    let req = body(payload)?;
    let content = EmailContent::Welcome {
        dashboard_url: req.query.dashboard_url,
    };
    send_to_user(&state, req.company, &req.user, content).await
}

/// POST /api/emails/password-reset
pub async fn send_password_reset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> ApiResult<SendResponse> {
    let req = body(payload)?;
    let content = EmailContent::PasswordReset {
        reset_url: req.query.reset_url,
        expires_in: req.query.expires_in,
    };
    send_to_user(&state, req.company, &req.user, content).await
}

/// POST /api/emails/notification
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> ApiResult<SendResponse> {
    let req = body(payload)?;
    let content = EmailContent::Notification {
        notification: req.notification,
        preferences_url: req
            .query
            .and_then(|q| q.preferences_url)
            .filter(|url| !url.is_empty()),
    };
    send_to_user(&state, req.company, &req.user, content).await
}

/// POST /api/emails/alert
pub async fn send_alert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AlertRequest>, JsonRejection>,
) -> ApiResult<SendResponse> {
    let req = body(payload)?;
    let content = EmailContent::Alert { alert: req.alert };
    send_to_user(&state, req.company, &req.user, content).await
}

/// POST /api/emails/order-confirmation
pub async fn send_order_confirmation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderConfirmationRequest>, JsonRejection>,
) -> ApiResult<SendResponse> {
    let req = body(payload)?;
    let content = EmailContent::OrderConfirmation { order: req.order };
    send_to_user(&state, req.company, &req.user, content).await
}

/// POST /api/emails/batch - Personalized message per recipient
pub async fn send_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<BatchResponse> {
    let req = body(payload)?;
    let email = req.to_email().map_err(service_error)?;

    let report = state
        .service
        .send_batch(&email, &req.recipients, req.subject.as_deref())
        .await
        .map_err(service_error)?;

    Ok(Json(BatchResponse {
        status: "success".to_string(),
        sent: report.sent,
        failed: report.failed,
        total: report.total,
        results: report.results,
    }))
}

/// POST /api/emails/preview - Render for the first recipient without sending
pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<RenderedEmail> {
    let req = body(payload)?;
    let email = req.to_email().map_err(service_error)?;

    state
        .service
        .preview(&email, req.subject.as_deref())
        .map(Json)
        .map_err(service_error)
}
