//! Verification-key resolution by key id.
//!
//! The `Authenticator` only sees the `KeyLookup` trait, so rotating to a
//! multi-key registry later does not touch the token code.

use jsonwebtoken::DecodingKey;

use super::authenticator::AuthError;

pub trait KeyLookup: Send + Sync {
    /// Resolve the verification key for a token's `kid` header.
    fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

/// Single-active-key strategy: exactly one kid is ever recognized.
pub struct SingleKeyLookup {
    active_kid: String,
    key: DecodingKey,
}

impl SingleKeyLookup {
    pub fn from_rsa_pem(active_kid: &str, public_key_pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| AuthError::Configuration(format!("invalid rsa public key pem: {e}")))?;

        Ok(Self {
            active_kid: active_kid.to_string(),
            key,
        })
    }
}

impl KeyLookup for SingleKeyLookup {
    fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if kid != self.active_kid {
            return Err(AuthError::UnknownKey(kid.to_string()));
        }
        Ok(self.key.clone())
    }
}
