//! # cadastro-api — Customer Registry REST Service
//!
//! Axum service for the Cadastro customer registry.
//!
//! ## API Surface
//!
//! | Route                        | Module                 | Auth    |
//! |------------------------------|------------------------|---------|
//! | `POST/GET /customer`         | [`routes::customers`]  | bearer  |
//! | `PUT/DELETE /customer/{id}`  | [`routes::customers`]  | bearer  |
//! | `POST /customer/credentials` | [`routes::customers`]  | public  |
//! | `POST /customer/exists`      | [`routes::customers`]  | public  |
//! | `* /customer/{id}/address`   | [`routes::addresses`]  | bearer  |
//! | `/`, `/health/*`             | [`app`]                | public  |
//! | `/metrics`, `/openapi.json`  | [`app`]                | public  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Health probes, `/metrics`, and `/openapi.json` are mounted outside the
//! auth middleware so they stay reachable without credentials; the
//! credential and existence endpoints bypass auth through the middleware's
//! method+path allowlist.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod service;
pub mod state;
pub mod token;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::error::{ErrorsBody, MessageBody};
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        secret: state.config.jwt_secret.clone(),
    };
    let metrics = ApiMetrics::new();
    let cors = build_cors(&state.config.cors_origin);

    // Authenticated customer API. Layer order (outermost → innermost):
    // MetricsMiddleware → AuthMiddleware → Handler, so rejected requests
    // still show up in the metrics.
    let api = Router::new()
        .merge(routes::customers::router())
        .merge(routes::addresses::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(auth_config))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics.clone()))
        .with_state(state);

    let metrics_handle = metrics.clone();

    Router::new()
        .route("/", get(root))
        .route("/health/liveness", get(|| async { "ok" }))
        .route("/health/readiness", get(|| async { "ready" }))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .merge(openapi::router())
        .merge(api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn root() -> Json<MessageBody> {
    Json(MessageBody::new("Application is Running"))
}

async fn route_not_found() -> (StatusCode, Json<ErrorsBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorsBody {
            errors: vec!["Route Not Found".to_string()],
        }),
    )
}

/// CORS for the single configured front-end origin.
fn build_cors(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS origin; cross-origin requests will be rejected");
            cors
        }
    }
}
