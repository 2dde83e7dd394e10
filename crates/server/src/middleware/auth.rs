//! Bearer token authentication middleware

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use healthsync_core::{TokenVerifier, bearer_token};

use crate::error::AppError;

/// Bearer token authentication state
#[derive(Clone)]
pub struct JwtAuth {
    verifier: TokenVerifier,
}

impl JwtAuth {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

/// Token from the `Authorization: Bearer` header, if any
pub fn request_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )
}

/// Verify the bearer token and attach the caller's `Identity` to the request.
///
/// The identity is also copied onto the response so outer layers (audit) can
/// see who made the call.
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Response {
    let Some(auth) = request.extensions().get::<JwtAuth>().cloned() else {
        tracing::error!("JwtAuth extension missing; rejecting request");
        return AppError::Internal("Internal server error".to_string()).into_response();
    };

    let identity = match auth.verifier.verify(request_token(request.headers())) {
        Ok(identity) => identity,
        Err(err) => return AppError::from(err).into_response(),
    };

    request.extensions_mut().insert(identity.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(identity);
    response
}
