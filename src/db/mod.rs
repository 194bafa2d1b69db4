// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to [`Database`]; [`FirestoreDb`] backs production and
//! [`MemoryDb`] backs local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Favorite, Recipe, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email uniqueness claims (keyed by normalized email)
    pub const USER_EMAILS: &str = "user_emails";
    /// Username uniqueness claims (keyed by normalized username)
    pub const USERNAMES: &str = "usernames";
    pub const RECIPES: &str = "recipes";
    /// Favorites, keyed by `Favorite::document_id(user_id, recipe_id)`
    pub const FAVORITES: &str = "favorites";
}

/// Storage operations used by the HTTP layer and services.
#[async_trait]
pub trait Database: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Create a user. Fails with `AppError::Conflict` if the email or
    /// username is already registered.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Look up a user by (normalized) email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Overwrite an existing user. Email and username are not changed here.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    // ─── Recipes ─────────────────────────────────────────────────

    /// All recipes, in no particular order.
    async fn list_recipes(&self) -> Result<Vec<Recipe>, AppError>;

    async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>, AppError>;

    /// Fetch recipes by ID, skipping unknown IDs. Order is unspecified.
    async fn get_recipes_by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, AppError>;

    /// Create or replace a recipe. The API never writes recipes; this serves
    /// external catalog management and tests.
    async fn upsert_recipe(&self, recipe: &Recipe) -> Result<(), AppError>;

    // ─── Favorites ───────────────────────────────────────────────

    /// Favorites for a user, most recently added first.
    async fn list_favorites(&self, user_id: &str) -> Result<Vec<Favorite>, AppError>;

    /// Create a favorite. Fails with `AppError::Conflict` if the user has
    /// already favorited the recipe.
    async fn create_favorite(&self, favorite: &Favorite) -> Result<Favorite, AppError>;

    async fn get_favorite(&self, favorite_id: &str) -> Result<Option<Favorite>, AppError>;

    /// Delete a favorite owned by `user_id`.
    ///
    /// Returns `false` if it does not exist or belongs to someone else.
    async fn delete_favorite(&self, favorite_id: &str, user_id: &str) -> Result<bool, AppError>;
}

/// Sort favorites by `added_at`, newest first.
pub(crate) fn sort_newest_first(favorites: &mut [Favorite]) {
    favorites.sort_by(|a, b| b.added_at.cmp(&a.added_at));
}
