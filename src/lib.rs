// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe Box: browse recipes, search, and keep favorites.
//!
//! The crate holds both halves of the application: the HTTP API server
//! (`routes`, `middleware`, `db`, `services`) and the favorites client
//! (`client`) that keeps a session's favorites in sync with either the server
//! or local storage.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::password::DummyHash;
use services::RecipeQueryService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub recipes: RecipeQueryService,
    /// Verified against on logins for unknown emails.
    pub dummy_hash: DummyHash,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn Database>) -> Self {
        Self {
            dummy_hash: DummyHash::new(config.bcrypt_cost),
            config,
            recipes: RecipeQueryService::new(db.clone()),
            db,
        }
    }
}
