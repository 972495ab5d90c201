//! PharmStock Inventory Service
//! Mission: Single-tenant drug inventory tracking over REST with JWT auth

use anyhow::{Context, Result};
use dotenv::dotenv;
use pharmstock_backend::app::build_router;
use pharmstock_backend::auth::{AuthService, JwtHandler, RevocationLedger, UserStore};
use pharmstock_backend::inventory::{DrugStore, InventoryState};
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    info!("🚀 PharmStock inventory service starting");

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "pharmstock.db".to_string());
    let jwt_secret = env::var("JWT_SECRET")
        .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

    let access_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MIN")
        .unwrap_or_else(|_| "30".to_string())
        .parse::<i64>()
        .context("Invalid ACCESS_TOKEN_TTL_MIN")?;
    let refresh_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
        .unwrap_or_else(|_| "7".to_string())
        .parse::<i64>()
        .context("Invalid REFRESH_TOKEN_TTL_DAYS")?;

    // Users table first: the drug store joins against it for owner names
    let users = Arc::new(UserStore::new(&db_path)?);
    let ledger = Arc::new(RevocationLedger::new(&db_path)?);
    let drugs = Arc::new(DrugStore::new(&db_path)?);
    let codec = Arc::new(JwtHandler::with_ttls(
        jwt_secret,
        access_ttl_minutes,
        refresh_ttl_days,
    ));

    let auth = AuthService::new(users, codec, ledger);
    let inventory = InventoryState { drugs };

    info!("🔐 Authentication initialized at: {}", db_path);
    info!(
        "⏱️  Token TTLs: access {}min, refresh {}d",
        access_ttl_minutes, refresh_ttl_days
    );

    let app = build_router(auth, inventory);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with an env-filter override
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmstock=debug,pharmstock_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
