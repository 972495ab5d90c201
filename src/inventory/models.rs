//! Inventory Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Drug inventory record
#[derive(Debug, Clone, Serialize)]
pub struct Drug {
    pub id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub min_threshold: i64,
    pub user_id: Uuid,
    pub created_at: String,
    /// Owner username, joined at read time (not a stored column)
    pub owner: Option<String>,
}

impl Drug {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.min_threshold
    }
}

/// Serialized drug record with the computed low-stock flag
#[derive(Debug, Serialize)]
pub struct DrugResponse {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub min_threshold: i64,
    pub low_stock: bool,
    pub owner: Option<String>,
}

impl DrugResponse {
    pub fn from_drug(drug: &Drug) -> Self {
        Self {
            id: drug.id.to_string(),
            name: drug.name.clone(),
            quantity: drug.quantity,
            min_threshold: drug.min_threshold,
            low_stock: drug.is_low_stock(),
            owner: drug.owner.clone(),
        }
    }
}

/// Create request body
#[derive(Debug, Deserialize)]
pub struct CreateDrugRequest {
    pub name: String,
    pub quantity: Option<i64>,
    pub min_threshold: Option<i64>,
}

/// Partial update request body; missing fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateDrugRequest {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub min_threshold: Option<i64>,
}
