//! Panic recovery.
//!
//! Outermost application layer (only the request context sits outside it): a
//! panic anywhere below, in a handler or another middleware, becomes a
//! generic 500 envelope instead of tearing down the connection task. Used
//! with `tower_http::catch_panic::CatchPanicLayer::custom` in `app.rs`.

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    // The inner layers were unwound, so log here as well as attaching the
    // cause for anything still outside us.
    tracing::error!(panic = %detail, "request handler panicked");

    AppError::internal(format!("panic: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    use super::*;

    async fn boom() -> &'static str {
        panic!("sale quantity went negative")
    }

    #[tokio::test]
    async fn panic_becomes_generic_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let res = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }
}
