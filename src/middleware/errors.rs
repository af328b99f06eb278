//! Error reporting.
//!
//! `AppError::into_response` already wrote the client-facing envelope; this
//! layer is where the hidden cause gets logged, and where the distinguished
//! shutdown kind turns into a signal on the process shutdown channel. Sits
//! directly inside panic recovery so nothing below can fail unreported.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::mpsc;

use crate::error::ErrorCause;
use crate::middleware::request_context::RequestContext;

pub async fn report(
    State(shutdown): State<mpsc::Sender<()>>,
    req: Request,
    next: Next,
) -> Response {
    let trace_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.trace_id.to_string());

    let res = next.run(req).await;

    if let Some(cause) = res.extensions().get::<ErrorCause>() {
        tracing::error!(
            trace_id = trace_id.as_deref().unwrap_or("-"),
            status = res.status().as_u16(),
            error = %cause.message,
            "request failed"
        );

        if cause.shutdown {
            // Capacity-1 channel: one signal is all the owner needs, extra
            // requests racing in during an ongoing shutdown are dropped.
            let _ = shutdown.try_send(());
        }
    }

    res
}
