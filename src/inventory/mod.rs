//! Inventory Module
//! Mission: Drug inventory CRUD, search, and low-stock reporting

pub mod api;
pub mod models;
pub mod store;

pub use api::InventoryState;
pub use store::DrugStore;
