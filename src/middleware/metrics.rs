//! Process-wide request metrics.
//!
//! The registry is built once at startup and handed to the middleware layer
//! through state; it is the only shared mutable state in the request path.
//! Plain relaxed atomics: these are independent counters, not synchronization.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ErrorCause;

/// Sample cadence for the in-flight gauge.
const INFLIGHT_SAMPLE_EVERY: u64 = 100;

#[derive(Debug, Default)]
pub struct Metrics {
    requests: AtomicU64,
    errors: AtomicU64,
    inflight: AtomicI64,
    inflight_sample: AtomicI64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests seen since process start. Never reset.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Requests whose handler produced an error response.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Concurrency level as of the last sample (every 100th request).
    pub fn inflight_sample(&self) -> i64 {
        self.inflight_sample.load(Ordering::Relaxed)
    }

    fn record_request(&self) {
        let n = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        if n % INFLIGHT_SAMPLE_EVERY == 0 {
            self.inflight_sample
                .store(self.inflight.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }
}

// Keeps the in-flight gauge balanced even when the handler future unwinds
// (the panic-recovery layer sits outside this one).
struct InflightGuard(Arc<Metrics>);

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.0.inflight.fetch_sub(1, Ordering::Relaxed);
    }
}

pub async fn track(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    metrics.inflight.fetch_add(1, Ordering::Relaxed);
    let _inflight = InflightGuard(Arc::clone(&metrics));

    // Counted up front so aborted requests still show in the totals.
    metrics.record_request();

    let res = next.run(req).await;

    if res.extensions().get::<ErrorCause>().is_some() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
    }

    res
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::error::AppError;

    fn app(metrics: Arc<Metrics>) -> Router {
        Router::new()
            .route("/ok", get(|| async { StatusCode::OK }))
            .route(
                "/fail",
                get(|| async { Err::<(), AppError>(AppError::bad_request("boom")) }),
            )
            .layer(axum::middleware::from_fn_with_state(metrics, track))
    }

    #[tokio::test]
    async fn counts_concurrent_requests_exactly() {
        let metrics = Arc::new(Metrics::new());
        let app = app(metrics.clone());

        let mut handles = Vec::new();
        for i in 0..40 {
            let app = app.clone();
            let path = if i % 4 == 0 { "/fail" } else { "/ok" };
            handles.push(tokio::spawn(async move {
                app.oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(metrics.requests(), 40);
        assert_eq!(metrics.errors(), 10);
    }

    #[tokio::test]
    async fn samples_inflight_every_100th_request() {
        let metrics = Arc::new(Metrics::new());
        let app = app(metrics.clone());

        for _ in 0..100 {
            app.clone()
                .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
                .await
                .unwrap();
        }

        // Sequential requests: exactly one in flight at sample time.
        assert_eq!(metrics.inflight_sample(), 1);
    }
}
