// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact mailer service.
//!
//! `POST /api/send-email` runs the submission pipeline: derive the client
//! identifier, check admission, validate the form, dispatch both
//! notifications. Every failure becomes a JSON body; nothing here panics.

use crate::config::{Config, CorsConfig};
use crate::limiter::{AdmissionControl, RateLimitResult};
use crate::locale::Language;
use crate::mailer::NotificationSaga;
use crate::metrics::{outcome, Metrics};
use crate::validator::{validate, ContactSubmission, ValidationResult};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        ConnectInfo, DefaultBodyLimit, FromRequest, Request, State,
    },
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "portfolio-email-server";
const ALLOWED_METHODS: &str = "GET,POST,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// Browser hardening headers added to every response that lacks them.
const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
    (header::CONTENT_SECURITY_POLICY, "default-src 'none'"),
];

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<dyn AdmissionControl>,
    pub saga: NotificationSaga,
    pub metrics: Metrics,
    pub config: Config,
}

/// Submission response body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl SubmitResponse {
    fn success(message: &'static str) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
            code: None,
        }
    }

    fn failure(error: &'static str, code: Option<&'static str>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
            code,
        }
    }
}

/// Error body for non-submission endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Unknown route body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub available_endpoints: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}

/// Smoke test response.
#[derive(Debug, Serialize)]
pub struct SmokeTestResponse {
    pub message: &'static str,
    pub timestamp: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let cors = cors_layer(&state.config.cors);
    let fallback_origin = fallback_origin(&state.config.cors);
    let metrics_path = state
        .config
        .metrics
        .enabled
        .then(|| state.config.metrics.path.clone());

    let mut app = Router::new()
        .route(
            "/api/health",
            get(health).fallback(health_method_not_allowed),
        )
        .route("/api/test", get(smoke_test))
        .route(
            "/api/send-email",
            post(send_email).fallback(send_email_method_not_allowed),
        );

    if let Some(path) = metrics_path {
        app = app.route(&path, get(metrics));
    }

    let mut app = app
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        // Requests without an Origin header get no CORS headers from the
        // layer above.
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            fallback_origin,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ));

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// CORS policy. Credentials are allowed, so a wildcard origin is served by
/// echoing the caller's origin back.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        match HeaderValue::from_str(config.frontend_url.trim_end_matches('/')) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin = %config.frontend_url, "Unusable FRONTEND_URL, mirroring request origin");
                AllowOrigin::mirror_request()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Origin advertised when the caller sent none.
fn fallback_origin(config: &CorsConfig) -> HeaderValue {
    HeaderValue::from_str(config.frontend_url.trim_end_matches('/'))
        .unwrap_or_else(|_| HeaderValue::from_static("*"))
}

/// Body that could not be read as a contact submission.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Form(#[from] FormRejection),
}

/// Read the submission as a URL-encoded form when the content type says
/// so, and as JSON otherwise.
async fn read_submission(request: Request) -> Result<ContactSubmission, PayloadError> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false);

    if is_form {
        let Form(submission) = Form::<ContactSubmission>::from_request(request, &()).await?;
        Ok(submission)
    } else {
        let Json(submission) = Json::<ContactSubmission>::from_request(request, &()).await?;
        Ok(submission)
    }
}

/// Rate limit key: the forwarded-for header when present, otherwise the
/// peer address. The header is used verbatim, so every client behind one
/// forwarding chain shares a key.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: now_rfc3339(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health_method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: Language::default().method_not_allowed(),
        }),
    )
}

/// Smoke test endpoint.
pub async fn smoke_test() -> Json<SmokeTestResponse> {
    Json(SmokeTestResponse {
        message: "Servidor funcionando correctamente",
        timestamp: now_rfc3339(),
    })
}

/// Contact form submission endpoint.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
) -> Response {
    let identifier = client_identifier(request.headers(), peer.map(|ConnectInfo(addr)| addr));
    let payload = read_submission(request).await;
    let language = payload
        .as_ref()
        .map(ContactSubmission::language)
        .unwrap_or_default();

    let limits = &state.config.rate_limit;
    let admission = state
        .limiter
        .admit(&identifier, limits.max_requests, limits.window())
        .await;

    if let RateLimitResult::Limited { retry_after } = admission {
        warn!(
            identifier = %identifier,
            retry_after_secs = retry_after.as_secs(),
            "Submission rate limited"
        );
        state.metrics.record(outcome::RATE_LIMITED);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs(retry_after).to_string())],
            Json(SubmitResponse::failure(language.rate_limited(), None)),
        )
            .into_response();
    }

    let submission = match payload {
        Ok(submission) => submission,
        Err(rejection) => {
            info!(identifier = %identifier, error = %rejection, "Malformed submission body");
            state.metrics.record(outcome::MALFORMED);
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::failure(
                    language.malformed_body(),
                    Some("malformed_body"),
                )),
            )
                .into_response();
        }
    };

    let validated = match validate(&submission) {
        ValidationResult::Accepted(validated) => validated,
        ValidationResult::Rejected(err) => {
            info!(identifier = %identifier, reason = err.code(), "Submission rejected");
            state.metrics.record(err.code());
            return (
                err.status(),
                Json(SubmitResponse::failure(err.message(language), Some(err.code()))),
            )
                .into_response();
        }
    };

    debug!(identifier = %identifier, email = %validated.email, "Dispatching notifications");
    let timer = state.metrics.dispatch_duration.start_timer();
    let result = state.saga.run(&validated, Utc::now()).await;
    timer.observe_duration();

    match result {
        Ok(receipt) => {
            info!(
                identifier = %identifier,
                email = %receipt.submitter,
                elapsed_ms = receipt.elapsed_ms,
                "Contact notifications sent"
            );
            state.metrics.record(outcome::ACCEPTED);
            (
                StatusCode::OK,
                Json(SubmitResponse::success(language.submission_accepted())),
            )
                .into_response()
        }
        Err(err) => {
            error!(
                identifier = %identifier,
                step = %err.step,
                error = %err.source,
                "Notification dispatch failed"
            );
            state
                .metrics
                .dispatch_failures
                .with_label_values(&[err.step.as_str()])
                .inc();
            state.metrics.record(outcome::DISPATCH_FAILED);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::failure(language.dispatch_failed(), None)),
            )
                .into_response()
        }
    }
}

async fn send_email_method_not_allowed() -> (StatusCode, Json<SubmitResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(SubmitResponse::failure(
            Language::default().method_not_allowed(),
            None,
        )),
    )
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found(State(state): State<Arc<AppState>>) -> (StatusCode, Json<NotFoundResponse>) {
    let mut available_endpoints = vec![
        "POST /api/send-email".to_string(),
        "GET /api/health".to_string(),
        "GET /api/test".to_string(),
    ];
    if state.config.metrics.enabled {
        available_endpoints.push(format!("GET {}", state.config.metrics.path));
    }

    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint no encontrado",
            available_endpoints,
        }),
    )
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole seconds, rounded up so clients never retry early.
fn retry_after_secs(retry_after: Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}
