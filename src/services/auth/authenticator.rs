//! Token issuance and verification.
//!
//! The authenticator is built once at startup and shared read-only across
//! request tasks. The accepted algorithm set is pinned to the configured
//! algorithm, so a token whose header names anything else is rejected before
//! signature verification.

use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation};
use thiserror::Error;

use super::claims::Claims;
use super::keys::KeyLookup;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth configuration: {0}")]
    Configuration(String),

    #[error("signing token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("expected token header to carry a key id")]
    MalformedToken,

    #[error("unrecognized key id: {0}")]
    UnknownKey(String),

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

pub struct Authenticator {
    signing_key: EncodingKey,
    active_kid: String,
    algorithm: Algorithm,
    key_lookup: Arc<dyn KeyLookup>,
    validation: Validation,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // do not print key material
        f.debug_struct("Authenticator")
            .field("active_kid", &self.active_kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Authenticator {
    /// `private_key_pem` must be an RSA private key in PKCS#8 or PKCS#1 PEM.
    pub fn new(
        private_key_pem: &[u8],
        active_kid: &str,
        algorithm: &str,
        key_lookup: Arc<dyn KeyLookup>,
    ) -> Result<Self, AuthError> {
        if active_kid.is_empty() {
            return Err(AuthError::Configuration(
                "active key id cannot be empty".to_string(),
            ));
        }

        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            AuthError::Configuration(format!("unsupported signing algorithm: {algorithm}"))
        })?;

        let signing_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| AuthError::Configuration(format!("invalid rsa private key pem: {e}")))?;

        // Pinning the algorithm here is what rejects cross-algorithm tokens.
        let validation = Validation::new(algorithm);

        Ok(Self {
            signing_key,
            active_kid: active_kid.to_string(),
            algorithm,
            key_lookup,
            validation,
        })
    }

    /// Sign `claims` into a compact token carrying the active kid in its header.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.active_kid.clone());

        jsonwebtoken::encode(&header, claims, &self.signing_key).map_err(AuthError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// The kid is read from the unverified header first; resolution through
    /// the key lookup decides which key the signature is checked against.
    pub fn parse_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let key = self.key_lookup.resolve(&kid)?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::services::auth::claims::ROLE_USER;
    use crate::services::auth::keys::SingleKeyLookup;

    const PRIVATE_PEM: &str = include_str!("../../../testdata/test_signing_key.pem");
    const PUBLIC_PEM: &str = include_str!("../../../testdata/test_signing_key.pub.pem");

    fn authenticator() -> Authenticator {
        let lookup =
            Arc::new(SingleKeyLookup::from_rsa_pem("k1", PUBLIC_PEM.as_bytes()).unwrap());
        Authenticator::new(PRIVATE_PEM.as_bytes(), "k1", "RS256", lookup).unwrap()
    }

    fn valid_claims() -> Claims {
        Claims::new("u1", vec![ROLE_USER.to_string()], Utc::now(), Duration::hours(1))
    }

    #[test]
    fn construction_rejects_empty_kid() {
        let lookup =
            Arc::new(SingleKeyLookup::from_rsa_pem("k1", PUBLIC_PEM.as_bytes()).unwrap());
        let err = Authenticator::new(PRIVATE_PEM.as_bytes(), "", "RS256", lookup).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn construction_rejects_unknown_algorithm() {
        let lookup =
            Arc::new(SingleKeyLookup::from_rsa_pem("k1", PUBLIC_PEM.as_bytes()).unwrap());
        let err = Authenticator::new(PRIVATE_PEM.as_bytes(), "k1", "RS257", lookup).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn construction_rejects_garbage_private_key() {
        let lookup =
            Arc::new(SingleKeyLookup::from_rsa_pem("k1", PUBLIC_PEM.as_bytes()).unwrap());
        let err = Authenticator::new(b"not a pem", "k1", "RS256", lookup).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn claims_round_trip() {
        let auth = authenticator();
        let claims = valid_claims();

        let token = auth.generate_token(&claims).unwrap();
        let parsed = auth.parse_claims(&token).unwrap();

        assert_eq!(parsed, claims);
    }

    #[test]
    fn rejects_token_signed_with_other_algorithm() {
        let auth = authenticator();

        // Well-formed in every respect except the algorithm: HS256 with an
        // arbitrary shared secret, correct kid, valid expiry.
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("k1".to_string());
        let token = jsonwebtoken::encode(
            &header,
            &valid_claims(),
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let err = auth.parse_claims(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn rejects_unknown_key_id() {
        let auth = authenticator();

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("k2".to_string());
        let token = jsonwebtoken::encode(
            &header,
            &valid_claims(),
            &EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap(),
        )
        .unwrap();

        match auth.parse_claims(&token).unwrap_err() {
            AuthError::UnknownKey(kid) => assert_eq!(kid, "k2"),
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn rejects_token_without_key_id() {
        let auth = authenticator();

        let header = Header::new(Algorithm::RS256);
        let token = jsonwebtoken::encode(
            &header,
            &valid_claims(),
            &EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            auth.parse_claims(&token).unwrap_err(),
            AuthError::MalformedToken
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let auth = authenticator();

        // Expired well past the default leeway.
        let expired = Claims::new(
            "u1",
            vec![ROLE_USER.to_string()],
            Utc::now() - Duration::hours(3),
            Duration::hours(1),
        );
        let token = auth.generate_token(&expired).unwrap();

        assert!(matches!(
            auth.parse_claims(&token).unwrap_err(),
            AuthError::InvalidToken(_)
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        let auth = authenticator();
        assert!(matches!(
            auth.parse_claims("not.a.token").unwrap_err(),
            AuthError::MalformedToken
        ));
    }
}
