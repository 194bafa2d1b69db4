// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites store abstraction shared by the remote and local stores.

use crate::client::local::StorageError;
use crate::client::session::Session;
use crate::models::{Favorite, Recipe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Local storage key holding the anonymous favorites list.
pub const FAVORITES_KEY: &str = "favoriteRecipes";

/// A favorite as the client sees it, whichever store it came from.
///
/// This is also the element format of the JSON array stored under
/// [`FAVORITES_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoriteItem {
    /// Recipe ID
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub added_at: DateTime<Utc>,
}

impl FavoriteItem {
    pub fn new(recipe: &RecipeSummary, added_at: DateTime<Utc>) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image: recipe.image.clone(),
            cuisine: recipe.cuisine.clone(),
            meal_type: recipe.meal_type.clone(),
            added_at,
        }
    }
}

impl From<Favorite> for FavoriteItem {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.recipe_id,
            title: favorite.recipe_title,
            description: favorite.recipe_description,
            image: favorite.recipe_image,
            cuisine: favorite.recipe_cuisine,
            meal_type: None,
            added_at: favorite.added_at,
        }
    }
}

/// The recipe fields needed to favorite a recipe.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct RecipeSummary {
    #[validate(length(min = 1, message = "recipe id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image: recipe.image.clone(),
            cuisine: Some(recipe.cuisine.clone()).filter(|c| !c.is_empty()),
            meal_type: Some(recipe.meal_type.clone()).filter(|m| !m.is_empty()),
        }
    }
}

/// Which kind of store is backing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// The server, for authenticated sessions
    Persistent,
    /// Client-local storage, for anonymous sessions
    Local,
}

/// Why a favorites operation failed.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("Recipe {0} is already a favorite")]
    AlreadyFavorited(String),

    #[error("Recipe {0} is not a favorite")]
    NotFavorited(String),

    /// The favorite was found but gone by the time it was deleted.
    #[error("Favorite for recipe {0} disappeared during removal")]
    Vanished(String),

    #[error("Unknown user {0}")]
    UnknownUser(String),

    #[error("Invalid recipe: {0}")]
    Invalid(String),

    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<validator::ValidationErrors> for FavoritesError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FavoritesError::Invalid(errors.to_string())
    }
}

/// A place favorites are kept.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// All favorites in the store.
    async fn list(&self) -> Result<Vec<FavoriteItem>, FavoritesError>;

    /// Add a recipe, returning the stored item.
    async fn add(&self, recipe: &RecipeSummary) -> Result<FavoriteItem, FavoritesError>;

    /// Remove the favorite for a recipe.
    async fn remove(&self, recipe_id: &str) -> Result<(), FavoritesError>;
}

/// Builds the persistent store for an authenticated session.
pub trait PersistentStoreFactory: Send + Sync {
    fn for_session(&self, user_id: &str, session: &Session) -> Arc<dyn FavoritesStore>;
}

/// Sort favorites by `added_at`, newest first.
pub fn sort_newest_first(items: &mut [FavoriteItem]) {
    items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
}
