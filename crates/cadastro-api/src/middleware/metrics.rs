//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) recorded in
//! middleware and rendered at `/metrics`. Route templates, not raw paths,
//! label the series so path parameters do not explode cardinality.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,
}

impl ApiMetrics {
    /// Create a metrics instance with a fresh registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("valid metric definition");
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "path"],
        )
        .expect("valid metric definition");
        let http_errors_total = IntCounterVec::new(
            Opts::new("http_errors_total", "HTTP responses with 4xx/5xx status"),
            &["method", "path", "status"],
        )
        .expect("valid metric definition");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric registers once");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric registers once");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric registers once");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
            }),
        }
    }

    fn record(&self, method: &str, path: &str, status: StatusCode, elapsed: Duration) {
        let status = status.as_u16().to_string();

        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status])
            .inc();
        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(elapsed.as_secs_f64());

        if status.starts_with('4') || status.starts_with('5') {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status])
                .inc();
        }
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.inner.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Axum middleware recording per-request metrics.
pub async fn metrics_middleware(
    Extension(metrics): Extension<ApiMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record(&method, &path, response.status(), start.elapsed());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_counted_separately() {
        let metrics = ApiMetrics::new();
        metrics.record("GET", "/customer", StatusCode::OK, Duration::from_millis(3));
        metrics.record(
            "GET",
            "/customer",
            StatusCode::NOT_FOUND,
            Duration::from_millis(1),
        );

        let rendered = metrics.render();
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("http_errors_total"));
        assert!(rendered.contains("status=\"404\""));
    }
}
