//! PharmStock Backend Library
//!
//! Exposes core modules for use by the server binary and integration tests.

pub mod app;
pub mod auth;
pub mod inventory;
pub mod middleware;
