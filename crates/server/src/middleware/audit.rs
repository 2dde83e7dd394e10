//! Audit trail for patient data writes and AI requests

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};
use healthsync_core::Identity;

use super::request_id::RequestId;

/// Audit category of a request, `None` for requests that are not audited
fn audit_event(method: &Method, path: &str) -> Option<&'static str> {
    if !matches!(*method, Method::POST | Method::PUT | Method::DELETE) {
        return None;
    }
    if path.starts_with("/api/ai/") {
        Some("ai_request")
    } else if path.starts_with("/api/patients") {
        Some("patient_write")
    } else {
        Some("mutation")
    }
}

/// Log who touched what once the response is known.
///
/// The caller's identity is read from the response, where the auth layer and
/// the chat handler leave it; rejected callers are logged as `anonymous`.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let Some(event) = audit_event(&method, &path) else {
        return next.run(request).await;
    };

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let identity = response
        .extensions()
        .get::<Identity>()
        .map(|i| i.as_str().to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    tracing::info!(
        target: "audit",
        event,
        request_id = %request_id,
        identity = %identity,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Audited request"
    );

    response
}
