//! Per-request context: trace id + start time.
//!
//! `attach` is the entry point of the request pipeline. It must sit outside
//! every other application middleware so that the context is present wherever
//! it is read (logging, error reporting). The trace id reuses the id minted by
//! the request-id layer when one is present, so logs and the `x-request-id`
//! response header correlate.

use std::time::Instant;

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: Uuid,
    pub start: Instant,
}

impl RequestContext {
    fn from_headers(headers: &HeaderMap) -> Self {
        let trace_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::new_v4);

        Self {
            trace_id,
            start: Instant::now(),
        }
    }
}

pub async fn attach(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(req.headers());
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
