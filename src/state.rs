/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, auth: Authenticator, metrics: Metrics, shutdown sender
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::middleware::metrics::Metrics;
use crate::services::auth::Authenticator;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<Authenticator>,
    pub metrics: Arc<Metrics>,
    pub shutdown: mpsc::Sender<()>,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        auth: Arc<Authenticator>,
        metrics: Arc<Metrics>,
        shutdown: mpsc::Sender<()>,
    ) -> Self {
        Self {
            db,
            auth,
            metrics,
            shutdown,
        }
    }
}
