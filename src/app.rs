/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の合成順序の契約はここに集約
 * - axum::serve() + graceful shutdown (シグナル or handler からの要求)
 */
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, metrics::Metrics};
use crate::services::auth::{Authenticator, SingleKeyLookup};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,sales_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload)
    // and surface the panic via tracing so it doesn't get "lost". The request
    // recovery layer needs the process to stay up, so no fail-fast abort here.
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");
        default_hook(info);
    }));
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    // Handler が shutdown 要求を投げるためのチャネル (capacity 1)
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    let state = build_state(&config, shutdown_tx).await?;
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;

    serve(
        listener,
        app,
        shutdown_rx,
        Duration::from_secs(config.shutdown_timeout_seconds),
    )
    .await
}

async fn build_state(config: &Config, shutdown: mpsc::Sender<()>) -> Result<AppState> {
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    let key_lookup = Arc::new(SingleKeyLookup::from_rsa_pem(
        &config.auth_key_id,
        config.auth_public_key_pem.as_bytes(),
    )?);

    let auth = Arc::new(Authenticator::new(
        config.auth_private_key_pem.as_bytes(),
        &config.auth_key_id,
        &config.auth_algorithm,
        key_lookup,
    )?);

    Ok(AppState::new(db, auth, Arc::new(Metrics::new()), shutdown))
}

/// Middleware composition, outermost first:
///
///   request context -> panic recovery -> error reporting -> access log
///   -> metrics -> (per-route: authenticate -> require_admin) -> handler
///
/// Panic recovery must also cover error reporting, logging and metrics; only
/// the context entry point sits outside it. Transport infra (request-id,
/// limits, trace, CORS, security headers) wraps everything in http::apply.
fn build_router(state: AppState, config: &Config) -> Router {
    let chain = ServiceBuilder::new()
        .layer(axum::middleware::from_fn(
            middleware::request_context::attach,
        ))
        .layer(CatchPanicLayer::custom(middleware::panics::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.shutdown.clone(),
            middleware::errors::report,
        ))
        .layer(axum::middleware::from_fn(middleware::logging::log_requests))
        .layer(axum::middleware::from_fn_with_state(
            state.metrics.clone(),
            middleware::metrics::track,
        ));

    let router = Router::new()
        .nest("/v1", api::v1::routes(state.clone()))
        .layer(chain)
        .with_state(state);

    middleware::http::apply(router, config)
}

async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown_rx: mpsc::Receiver<()>,
    drain_timeout: Duration,
) -> Result<()> {
    // Fires when shutdown starts, so the drain deadline starts counting then.
    let (draining_tx, draining_rx) = oneshot::channel::<()>();

    let graceful = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal(shutdown_rx).await;
        let _ = draining_tx.send(());
    })
    .into_future();

    tokio::select! {
        res = graceful => {
            res.context("server error")?;
            tracing::info!("drained in-flight requests, bye");
            Ok(())
        }
        _ = async {
            draining_rx.await.ok();
            tokio::time::sleep(drain_timeout).await;
        } => {
            anyhow::bail!("could not drain in-flight requests within {drain_timeout:?}, forcing stop")
        }
    }
}

async fn shutdown_signal(mut shutdown_rx: mpsc::Receiver<()>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("interrupt received, starting graceful shutdown"),
        _ = terminate => tracing::info!("terminate received, starting graceful shutdown"),
        _ = shutdown_rx.recv() => tracing::info!("shutdown requested by handler, starting graceful shutdown"),
    }
}
