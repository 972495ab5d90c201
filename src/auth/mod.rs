//! Authentication Module
//! Mission: Credential verification, stateless JWT issuance, and
//! revocation tracking

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod revocation;
pub mod service;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
pub use revocation::RevocationLedger;
pub use service::{authorize_owner_or_admin, AuthError, AuthService};
pub use user_store::UserStore;
