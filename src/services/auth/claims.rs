//! Token claims: who the caller is and what roles they carry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";

/// Signed assertion of identity and roles with a validity window.
///
/// Immutable once signed into a token. Tokens issued by this service always
/// carry at least one role; externally crafted tokens may not, and then fail
/// every role check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, roles: Vec<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            sub: sub.into(),
            roles,
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }

    /// True iff the claims hold at least one of the required roles.
    pub fn has_role(&self, required: &[&str]) -> bool {
        self.roles
            .iter()
            .any(|held| required.iter().any(|want| held == want))
    }
}
