//! Role authorization (route-scoped).
//!
//! Must run inside `auth::authenticate`: missing claims here means the route
//! was wired without authentication. That is a bug and reports as 500; a 401
//! would wrongly tell the caller their credentials were bad.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::services::auth::{Claims, ROLE_ADMIN};

fn check_roles(req: &Request, required: &[&str]) -> Result<(), AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::internal("claims missing from request context"))?;

    if !claims.has_role(required) {
        return Err(AppError::Forbidden);
    }

    Ok(())
}

/// Restrict a route to administrators.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    check_roles(&req, &[ROLE_ADMIN])?;
    Ok(next.run(req).await)
}
