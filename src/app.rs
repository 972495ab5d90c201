//! Router assembly
//! Mission: Wire auth and inventory handlers into one application

use crate::auth::{api as auth_api, auth_middleware, AuthService};
use crate::inventory::{api as drug_api, InventoryState};
use crate::middleware::request_logging;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// Three groups: auth flows that carry their own token or none
/// (register/login/refresh/logouts), public inventory reads, and the
/// protected routes behind the access-token guard.
pub fn build_router(auth: AuthService, inventory: InventoryState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .route("/auth/refresh", post(auth_api::refresh))
        .route("/auth/logout/access", post(auth_api::logout_access))
        .route("/auth/logout/refresh", post(auth_api::logout_refresh))
        .with_state(auth.clone());

    let protected_auth_routes = Router::new()
        .route("/auth/me", get(auth_api::me))
        .route("/admin/users", get(auth_api::list_users))
        .route("/admin/promote/:user_id", post(auth_api::promote))
        .route_layer(from_fn_with_state(auth.clone(), auth_middleware))
        .with_state(auth.clone());

    let public_drug_routes = Router::new()
        .route("/drugs", get(drug_api::list_drugs))
        .route("/drugs/low_stock", get(drug_api::low_stock))
        .route("/drugs/search", get(drug_api::search))
        .route("/drugs/:drug_id", get(drug_api::get_drug))
        .with_state(inventory.clone());

    let protected_drug_routes = Router::new()
        .route("/drugs", post(drug_api::create_drug))
        .route("/drugs/mine", get(drug_api::my_drugs))
        .route("/drugs/:drug_id", put(drug_api::update_drug))
        .route("/drugs/:drug_id", delete(drug_api::delete_drug))
        .route_layer(from_fn_with_state(auth, auth_middleware))
        .with_state(inventory);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(protected_auth_routes)
        .merge(public_drug_routes)
        .merge(protected_drug_routes)
        .layer(from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
