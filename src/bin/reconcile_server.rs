//! Reconciliation HTTP server
//!
//! Wires the engine to its collaborators: the configured field catalog,
//! a Postgres canonical-record store, and the axum router.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use id_reconcile::api::{create_router, AppState};
use id_reconcile::catalog::FieldCatalog;
use id_reconcile::persistence::PgIdentityCardStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "id_reconcile=info,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let catalog = load_catalog()?;
    info!(fields = catalog.len(), "field catalog loaded");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/identity".to_string());
    info!("connecting to database");
    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .context("connecting to postgres")?;
    let store = Arc::new(PgIdentityCardStore::new(pool));

    let app = create_router(AppState::new(catalog, store));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);
    let addr = format!("0.0.0.0:{port}");
    info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("binding listener")?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

/// The catalog must be identical across consolidate calls and the
/// rendering layer's expectations, so it is loaded once at startup:
/// either the built-in identity-card catalog or a JSON file named by
/// `RECONCILE_CATALOG`.
fn load_catalog() -> Result<FieldCatalog> {
    match std::env::var("RECONCILE_CATALOG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading catalog config {path}"))?;
            let catalog: FieldCatalog =
                serde_json::from_str(&raw).with_context(|| format!("parsing catalog {path}"))?;
            Ok(catalog)
        }
        Err(_) => Ok(FieldCatalog::identity_card()),
    }
}
