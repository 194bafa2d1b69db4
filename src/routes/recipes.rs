// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public recipe routes: search, listing and detail.

use crate::error::{AppError, Result};
use crate::models::{Recipe, RecipeSearchResult};
use crate::services::RecipeFilter;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_PER_PAGE: u32 = 100;
/// Longest search term or filter value. Longer search terms match nothing;
/// longer filter values are rejected.
const MAX_QUERY_LEN: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/recipes", get(list_recipes))
        .route("/api/recipes/{recipe_id}", get(get_recipe))
}

// ─── Search ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SearchResponse {
    pub results: Vec<RecipeSearchResult>,
}

/// Free-text recipe search. Store failures and overlong terms come back as
/// an empty list.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse> {
    if params.q.len() > MAX_QUERY_LEN {
        tracing::debug!(len = params.q.len(), "Search term too long, no results");
        return Json(SearchResponse { results: vec![] });
    }

    let results = state
        .recipes
        .search_recipes(&params.q)
        .await
        .iter()
        .map(RecipeSearchResult::from)
        .collect();

    Json(SearchResponse { results })
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipesQuery {
    cuisine: Option<String>,
    meal_type: Option<String>,
    /// Comma-separated recipe IDs
    ids: Option<String>,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecipesResponse {
    pub recipes: Vec<Recipe>,
    pub page: u32,
    pub per_page: u32,
    /// Number of recipes matching the filter across all pages
    pub total: u32,
}

fn non_blank(value: Option<String>) -> Result<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.len() > MAX_QUERY_LEN => {
            Err(AppError::BadRequest("Filter value is too long".to_string()))
        }
        other => Ok(other),
    }
}

fn parse_ids(raw: Option<&str>) -> Vec<String> {
    raw.map(|ids| {
        ids.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// List recipes ordered by title, filtered by cuisine, meal type and/or IDs.
async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecipesQuery>,
) -> Result<Json<RecipesResponse>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let per_page = params.per_page.clamp(1, MAX_PER_PAGE);

    let filter = RecipeFilter {
        cuisine: non_blank(params.cuisine)?,
        meal_type: non_blank(params.meal_type)?,
    };
    let ids = parse_ids(params.ids.as_deref());

    tracing::debug!(?filter, ids = ids.len(), page = params.page, "Listing recipes");

    let recipes = if params.ids.is_some() {
        state
            .recipes
            .get_recipes_by_ids(&ids)
            .await
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect()
    } else {
        state.recipes.get_recipes_by_filter(&filter).await
    };

    let total = recipes.len() as u32;

    // Use checked multiplication to prevent overflow
    let start = (params.page as usize - 1)
        .checked_mul(per_page as usize)
        .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))?;

    let page_items = if start < recipes.len() {
        let end = start.saturating_add(per_page as usize).min(recipes.len());
        recipes[start..end].to_vec()
    } else {
        vec![]
    };

    Ok(Json(RecipesResponse {
        recipes: page_items,
        page: params.page,
        per_page,
        total,
    }))
}

// ─── Detail ──────────────────────────────────────────────────

async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<String>,
) -> Result<Json<Recipe>> {
    state
        .recipes
        .get_recipe(&recipe_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", recipe_id)))
}
