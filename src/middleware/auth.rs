//! Bearer-token authentication (route-scoped, not global).
//!
//! Verifies `Authorization: Bearer <token>` against the Authenticator and
//! puts the resulting `Claims` into the request extensions for downstream
//! consumers (role middleware, handlers).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::Authenticator;

pub async fn authenticate(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::unauthorized(
            "expected authorization header format: bearer <token>",
        ));
    }

    let claims = auth.parse_claims(token).map_err(|err| {
        tracing::warn!(error = %err, "token verification failed");
        AppError::unauthorized(err.to_string())
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, body::Body, http::Request, http::StatusCode, routing::get};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::{Claims, ROLE_USER, SingleKeyLookup};

    const PRIVATE_PEM: &str = include_str!("../../testdata/test_signing_key.pem");
    const PUBLIC_PEM: &str = include_str!("../../testdata/test_signing_key.pub.pem");

    fn authenticator() -> Arc<Authenticator> {
        let lookup =
            Arc::new(SingleKeyLookup::from_rsa_pem("k1", PUBLIC_PEM.as_bytes()).unwrap());
        Arc::new(Authenticator::new(PRIVATE_PEM.as_bytes(), "k1", "RS256", lookup).unwrap())
    }

    fn app(auth: Arc<Authenticator>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|claims: Claims| async move { Json(claims.sub) }),
            )
            .layer(axum::middleware::from_fn_with_state(auth, authenticate))
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_401_with_fixed_message() {
        let res = app(authenticator())
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(
            body["error"],
            "expected authorization header format: bearer <token>"
        );
    }

    #[tokio::test]
    async fn wrong_scheme_is_401() {
        let res = app(authenticator())
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Basic dTE6cHc=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unverifiable_token_is_401() {
        let res = app(authenticator())
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_claims() {
        let auth = authenticator();
        let claims = Claims::new(
            "u1",
            vec![ROLE_USER.to_string()],
            Utc::now(),
            Duration::hours(1),
        );
        let token = auth.generate_token(&claims).unwrap();

        let res = app(auth)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, "u1");
    }
}
