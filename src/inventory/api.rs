//! Inventory API Endpoints
//! Mission: CRUD over drug records with owner-or-admin enforcement

use crate::auth::models::Claims;
use crate::auth::service::authorize_owner_or_admin;
use crate::auth::user_store::is_unique_violation;
use crate::inventory::models::{CreateDrugRequest, DrugResponse, UpdateDrugRequest};
use crate::inventory::store::DrugStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Shared inventory state
#[derive(Clone)]
pub struct InventoryState {
    pub drugs: Arc<DrugStore>,
}

/// Inventory API errors
#[derive(Debug)]
pub enum DrugApiError {
    Validation(&'static str),
    DuplicateName,
    NotFound,
    Forbidden,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for DrugApiError {
    fn from(err: anyhow::Error) -> Self {
        DrugApiError::Internal(err)
    }
}

impl IntoResponse for DrugApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DrugApiError::Validation(msg) => (StatusCode::BAD_REQUEST, *msg),
            DrugApiError::DuplicateName => (
                StatusCode::BAD_REQUEST,
                "You already have a drug with that name.",
            ),
            DrugApiError::NotFound => (StatusCode::NOT_FOUND, "Drug not found."),
            DrugApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only the owner or an admin can modify this drug.",
            ),
            DrugApiError::Internal(err) => {
                error!("Inventory internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// List all records - GET /drugs
pub async fn list_drugs(
    State(state): State<InventoryState>,
) -> Result<Json<Vec<DrugResponse>>, DrugApiError> {
    let drugs = state.drugs.list_all()?;
    Ok(Json(drugs.iter().map(DrugResponse::from_drug).collect()))
}

/// Single record - GET /drugs/:drug_id
pub async fn get_drug(
    State(state): State<InventoryState>,
    Path(drug_id): Path<Uuid>,
) -> Result<Json<DrugResponse>, DrugApiError> {
    let drug = state.drugs.get(&drug_id)?.ok_or(DrugApiError::NotFound)?;
    Ok(Json(DrugResponse::from_drug(&drug)))
}

/// Records below threshold - GET /drugs/low_stock
pub async fn low_stock(
    State(state): State<InventoryState>,
) -> Result<Json<Vec<DrugResponse>>, DrugApiError> {
    let drugs = state.drugs.low_stock()?;
    Ok(Json(drugs.iter().map(DrugResponse::from_drug).collect()))
}

/// Name substring search - GET /drugs/search?q=
pub async fn search(
    State(state): State<InventoryState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<DrugResponse>>, DrugApiError> {
    let drugs = state.drugs.search(params.q.as_deref().unwrap_or(""))?;
    Ok(Json(drugs.iter().map(DrugResponse::from_drug).collect()))
}

/// Caller's records - GET /drugs/mine
pub async fn my_drugs(
    State(state): State<InventoryState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DrugResponse>>, DrugApiError> {
    let subject = subject_id(&claims)?;
    let drugs = state.drugs.list_by_owner(&subject)?;
    Ok(Json(drugs.iter().map(DrugResponse::from_drug).collect()))
}

/// Add a record - POST /drugs
pub async fn create_drug(
    State(state): State<InventoryState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDrugRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), DrugApiError> {
    if payload.name.trim().is_empty() {
        return Err(DrugApiError::Validation("Drug name is required."));
    }

    let subject = subject_id(&claims)?;
    let quantity = payload.quantity.unwrap_or(0);
    let min_threshold = payload.min_threshold.unwrap_or(10);

    let drug = match state
        .drugs
        .create(&payload.name, quantity, min_threshold, &subject)
    {
        Ok(drug) => drug,
        Err(e) if is_unique_violation(&e) => return Err(DrugApiError::DuplicateName),
        Err(e) => return Err(DrugApiError::Internal(e)),
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Drug added successfully.",
            "drug": DrugResponse::from_drug(&drug),
        })),
    ))
}

/// Update a record - PUT /drugs/:drug_id (owner or admin)
pub async fn update_drug(
    State(state): State<InventoryState>,
    Extension(claims): Extension<Claims>,
    Path(drug_id): Path<Uuid>,
    Json(payload): Json<UpdateDrugRequest>,
) -> Result<Json<serde_json::Value>, DrugApiError> {
    let drug = state.drugs.get(&drug_id)?.ok_or(DrugApiError::NotFound)?;

    authorize_owner_or_admin(&claims, &drug.user_id).map_err(|_| DrugApiError::Forbidden)?;

    if matches!(payload.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(DrugApiError::Validation("Drug name is required."));
    }

    let updated = state
        .drugs
        .update(
            &drug_id,
            payload.name.as_deref(),
            payload.quantity,
            payload.min_threshold,
        )?
        .ok_or(DrugApiError::NotFound)?;

    Ok(Json(json!({
        "message": "Drug updated.",
        "drug": DrugResponse::from_drug(&updated),
    })))
}

/// Delete a record - DELETE /drugs/:drug_id (owner or admin)
pub async fn delete_drug(
    State(state): State<InventoryState>,
    Extension(claims): Extension<Claims>,
    Path(drug_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, DrugApiError> {
    let drug = state.drugs.get(&drug_id)?.ok_or(DrugApiError::NotFound)?;

    authorize_owner_or_admin(&claims, &drug.user_id).map_err(|_| DrugApiError::Forbidden)?;

    if !state.drugs.delete(&drug_id)? {
        return Err(DrugApiError::NotFound);
    }

    Ok(Json(json!({ "message": "Drug deleted." })))
}

fn subject_id(claims: &Claims) -> Result<Uuid, DrugApiError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|e| DrugApiError::Internal(anyhow::anyhow!("Malformed token subject: {e}")))
}
