// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites routes. Each request names its `userId`, which must match the
//! authenticated caller.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Favorite, NewFavorite};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/favorites", get(list_favorites).post(create_favorite))
        .route("/api/favorites/{favorite_id}", delete(delete_favorite))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerQuery {
    user_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Resolve the `userId` a request acts for and check it is the caller.
fn require_owner(requested: Option<&str>, caller: &AuthUser) -> Result<String> {
    let user_id = requested
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    if user_id != caller.user_id {
        tracing::warn!(
            caller = %caller.user_id,
            requested = %user_id,
            "Favorites request for another user"
        );
        return Err(AppError::Forbidden(
            "Cannot access another user's favorites".to_string(),
        ));
    }

    Ok(user_id.to_string())
}

/// List the caller's favorites, newest first.
async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<Favorite>>> {
    let user_id = require_owner(params.user_id.as_deref(), &caller)?;
    let favorites = state.db.list_favorites(&user_id).await?;
    Ok(Json(favorites))
}

/// Favorite a recipe. A second favorite for the same recipe is a 409.
async fn create_favorite(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<NewFavorite>,
) -> Result<(StatusCode, Json<Favorite>)> {
    req.validate()?;
    require_owner(Some(&req.user_id), &caller)?;

    if state.db.get_user(&req.user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    let favorite = Favorite::from_request(req, chrono::Utc::now());
    let created = state.db.create_favorite(&favorite).await?;

    tracing::info!(
        user_id = %created.user_id,
        recipe_id = %created.recipe_id,
        "Favorite added"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// Remove one of the caller's favorites by its own ID.
async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(favorite_id): Path<String>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<DeleteResponse>> {
    let user_id = require_owner(params.user_id.as_deref(), &caller)?;

    if !state.db.delete_favorite(&favorite_id, &user_id).await? {
        return Err(AppError::NotFound(format!(
            "Favorite {} not found",
            favorite_id
        )));
    }

    tracing::info!(user_id = %user_id, favorite_id = %favorite_id, "Favorite removed");
    Ok(Json(DeleteResponse { success: true }))
}
