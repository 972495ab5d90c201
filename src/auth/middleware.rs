//! Authentication Middleware
//! Mission: Protect API endpoints with access-token validation

use crate::auth::models::TokenKind;
use crate::auth::service::{AuthError, AuthService};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Middleware guarding protected routes: extracts the bearer token,
/// runs the full authorize check (signature, expiry, kind, revocation),
/// and exposes the claims to handlers through request extensions.
pub async fn auth_middleware(
    State(auth): State<AuthService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthenticated)?;

    let claims = auth.authorize(&token, TokenKind::Access)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract a bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}
