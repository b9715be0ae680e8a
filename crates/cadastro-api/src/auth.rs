//! # Authentication Middleware
//!
//! Bearer-token authentication for the customer API. A small method+path
//! allowlist stays public (credential validation and existence checks must
//! work before a client holds a token); every other route behind the
//! middleware requires a token that verifies under [`crate::token::decode`].
//! Auth failures short-circuit with 401 before the handler runs.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::error::AppError;
use crate::token;

/// Routes reachable without a bearer token, keyed by method and exact path.
const PUBLIC_ROUTES: &[(&str, &str)] = &[
    ("POST", "/customer/credentials"),
    ("POST", "/customer/exists"),
];

/// A secret that redacts itself from `Debug` output.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the underlying secret bytes.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(****)")
    }
}

/// Shared authentication configuration, injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: SecretString,
}

fn is_public(method: &str, path: &str) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|(m, p)| *m == method && *p == path)
}

/// Axum middleware enforcing bearer-token authentication.
pub async fn auth_middleware(
    Extension(config): Extension<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if is_public(request.method().as_str(), request.uri().path()) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(bearer) = header.strip_prefix("Bearer ") else {
        return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    match token::decode(bearer, config.secret.expose().as_bytes()) {
        Ok(_claims) => next.run(request).await,
        Err(e) => AppError::Unauthorized(format!("Unauthorized: {e}")).into_response(),
    }
}
