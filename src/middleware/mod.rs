/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - 合成順序の契約は app.rs / routes.rs 側に記載
 */
pub mod auth;
pub mod errors;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod panics;
pub mod request_context;
pub mod roles;
