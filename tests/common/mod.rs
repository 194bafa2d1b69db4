// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response},
};
use recipe_box::config::Config;
use recipe_box::db::{FirestoreDb, MemoryDb};
use recipe_box::middleware::auth::create_jwt;
use recipe_box::models::User;
use recipe_box::routes::create_router;
use recipe_box::services::RecipeCatalog;
use recipe_box::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Recipes shipped with the repo for local development.
#[allow(dead_code)]
pub const CATALOG_JSON: &str = include_str!("../../data/recipes.json");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory database seeded with the sample catalog.
#[allow(dead_code)]
pub fn seeded_db() -> Arc<MemoryDb> {
    let catalog = RecipeCatalog::load_from_json(CATALOG_JSON).expect("sample catalog parses");
    Arc::new(MemoryDb::with_recipes(catalog.into_recipes()))
}

/// Create a test app over a seeded in-memory database.
/// Returns the router, the shared state and the database.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    let db = seeded_db();
    let state = Arc::new(AppState::new(config, db.clone()));
    (create_router(state.clone()), state, db)
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    let (app, state, _) = create_test_app_with_config(config);
    (app, state)
}

/// Test app whose store is an offline Firestore client: every query fails.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(FirestoreDb::new_mock()),
    ));
    create_router(state)
}

/// Session JWT for a user ID.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, state: &AppState) -> String {
    create_jwt(user_id, &state.config.jwt_signing_key).expect("JWT creation")
}

/// Insert an active user directly into the store.
#[allow(dead_code)]
pub async fn insert_user(db: &MemoryDb, id: &str, email: &str, username: &str) -> User {
    use recipe_box::db::Database;

    let now = User::timestamp_now();
    let user = User {
        id: id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        first_name: "Test".to_string(),
        last_name: "Cook".to_string(),
        is_active: true,
        avatar: None,
        bio: None,
        created_at: now.clone(),
        updated_at: now,
    };
    db.create_user(&user).await.expect("insert user");
    user
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Serve the test app on an ephemeral local port. Returns its base URL.
#[allow(dead_code)]
pub async fn spawn_test_server() -> (String, Arc<AppState>, Arc<MemoryDb>) {
    let (app, state, db) = create_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    (format!("http://{}", addr), state, db)
}
