//! API Middleware
//!
//! Authentication, CSRF validation and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub api_key_id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub permissions: Vec<String>,
    pub csrf_token: String,
}

fn correlation_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

// =========================================================================
// API Key Authentication Middleware
// =========================================================================

/// Resolve `X-API-Key` to a user and attach an `OperationContext`
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    let record = state
        .access
        .find_api_key(api_key)
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    if !record.is_active {
        tracing::warn!(api_key_id = %record.id, "Disabled API key used");
        return Err(AppError::InvalidApiKey);
    }

    let correlation_id = correlation_id(&headers).unwrap_or_else(Uuid::new_v4);

    let context = OperationContext::new()
        .with_api_key(record.id)
        .with_user(record.user_id)
        .with_permissions(record.permissions.clone())
        .with_correlation_id(correlation_id);

    request.extensions_mut().insert(AuthenticatedUser {
        api_key_id: record.id,
        user_id: record.user_id,
        username: record.username,
        permissions: record.permissions,
        csrf_token: record.csrf_token,
    });
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

// =========================================================================
// CSRF Middleware
// =========================================================================

/// Require `X-CSRF-Token` to match the authenticated user's token.
/// Must run after `auth_middleware`.
pub async fn csrf_middleware(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let expected = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.csrf_token.as_str())
        .ok_or_else(|| AppError::Internal("Auth middleware must run first".to_string()))?;

    let presented = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented != Some(expected) || expected.is_empty() {
        tracing::warn!(uri = %request.uri(), "CSRF token mismatch");
        return Err(AppError::InvalidCsrfToken);
    }

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "x-api-key",
    "x-csrf-token",
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = correlation_id(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
