// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe Box API Server
//!
//! Serves the recipe catalog, search, accounts and per-user favorites.

use recipe_box::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::RecipeCatalog,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting Recipe Box API"
    );

    let db: Arc<dyn Database> = match config.storage_backend {
        StorageBackend::Firestore => {
            if config.recipes_path.is_some() {
                tracing::warn!("RECIPES_PATH is only used with the memory backend, ignoring");
            }
            Arc::new(
                FirestoreDb::new(&config.gcp_project_id)
                    .await
                    .expect("Failed to connect to Firestore"),
            )
        }
        StorageBackend::Memory => {
            let db = match &config.recipes_path {
                Some(path) => {
                    tracing::info!(path = %path, "Loading recipe catalog");
                    let catalog =
                        RecipeCatalog::load_from_file(path).expect("Failed to load recipe catalog");
                    tracing::info!(count = catalog.recipes().len(), "Recipe catalog loaded");
                    MemoryDb::with_recipes(catalog.into_recipes())
                }
                None => MemoryDb::new(),
            };
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Arc::new(db)
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Build router
    let app = recipe_box::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("recipe_box=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
