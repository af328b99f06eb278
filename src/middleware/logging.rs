//! Per-request access log.
//!
//! Requires the request context attached by `request_context::attach`; its
//! absence means the pipeline is mis-wired, which is surfaced as a 500 rather
//! than silently skipping the log line.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::middleware::request_context::RequestContext;

pub async fn log_requests(req: Request, next: Next) -> Result<Response, AppError> {
    let Some(ctx) = req.extensions().get::<RequestContext>().cloned() else {
        return Err(AppError::internal("request context missing"));
    };

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    let res = next.run(req).await;

    tracing::info!(
        trace_id = %ctx.trace_id,
        status = res.status().as_u16(),
        method = %method,
        path = %path,
        remote_addr = remote_addr.as_deref().unwrap_or("-"),
        elapsed_ms = ctx.start.elapsed().as_millis() as u64,
        "request completed"
    );

    Ok(res)
}
