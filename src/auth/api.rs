//! Authentication API Endpoints
//! Mission: Map auth flows to HTTP routes and statuses

use crate::auth::{
    middleware::bearer_token,
    models::{
        Claims, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, TokenKind,
        UserResponse, UserRole,
    },
    service::{AuthError, AuthService},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, *msg),
            // Surfaced as 400 to match the historical client contract
            AuthError::DuplicateUsername => (StatusCode::BAD_REQUEST, "Username already exists."),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials."),
            AuthError::InvalidToken | AuthError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Invalid or missing token.")
            }
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired."),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions."),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            AuthError::Internal(err) => {
                error!("Auth internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Register endpoint - POST /auth/register
pub async fn register(
    State(auth): State<AuthService>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AuthError> {
    let user = auth.register(&payload.username, &payload.password)?;

    info!("📝 Registered user: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully.",
            "user": UserResponse::from_user(&user),
        })),
    ))
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(auth): State<AuthService>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AuthError::Validation("username and password are required."));
    }

    let (access_token, refresh_token, user) = auth.login(&payload.username, &payload.password)?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: UserResponse::from_user(&user),
    }))
}

/// Refresh endpoint - POST /auth/refresh (bearer = refresh token)
pub async fn refresh(
    State(auth): State<AuthService>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;
    let access_token = auth.refresh(&token)?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Access-token logout - POST /auth/logout/access (bearer = access token)
pub async fn logout_access(
    State(auth): State<AuthService>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;
    auth.logout(&token, TokenKind::Access)?;

    Ok(Json(json!({ "message": "Access token revoked." })))
}

/// Refresh-token logout - POST /auth/logout/refresh (bearer = refresh token)
pub async fn logout_refresh(
    State(auth): State<AuthService>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;
    auth.logout(&token, TokenKind::Refresh)?;

    Ok(Json(json!({ "message": "Refresh token revoked." })))
}

/// Current user info - GET /auth/me
///
/// Reads the store so the response reflects the current role, not the
/// snapshot inside the token.
pub async fn me(
    State(auth): State<AuthService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = auth.current_user(&claims)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// List all users - GET /admin/users (admin only)
pub async fn list_users(
    State(auth): State<AuthService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    if claims.role != UserRole::Admin {
        return Err(AuthError::Forbidden);
    }

    let users = auth.users().list_users()?;
    let response: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();

    Ok(Json(response))
}

/// Promote a user to admin - POST /admin/promote/:user_id (admin only)
pub async fn promote(
    State(auth): State<AuthService>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AuthError> {
    let user = auth.promote(&claims, &user_id)?;

    Ok(Json(json!({
        "message": format!("User {} promoted to admin.", user.username),
        "user": UserResponse::from_user(&user),
    })))
}
