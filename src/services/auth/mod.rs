/*
 * Responsibility
 * - auth サービスの公開ポイント (re-export)
 */
pub mod authenticator;
pub mod claims;
pub mod keys;

pub use authenticator::{AuthError, Authenticator};
pub use claims::{Claims, ROLE_ADMIN, ROLE_USER};
pub use keys::{KeyLookup, SingleKeyLookup};
