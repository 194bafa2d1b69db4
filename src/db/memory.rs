// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process database for local development and tests.
//!
//! Uniqueness (email, username, favorite pairs) goes through the `DashMap`
//! entry API, so concurrent writers see the same conflicts Firestore reports.

use crate::db::{sort_newest_first, Database};
use crate::error::AppError;
use crate::models::{Favorite, Recipe, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    /// normalized email -> user id
    emails: DashMap<String, String>,
    /// normalized username -> user id
    usernames: DashMap<String, String>,
    recipes: DashMap<String, Recipe>,
    favorites: DashMap<String, Favorite>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with recipes.
    pub fn with_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let db = Self::new();
        for recipe in recipes {
            db.recipes.insert(recipe.id.clone(), recipe);
        }
        db
    }

    /// Number of stored favorites across all users.
    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let email = User::normalize_email(&user.email);
        let username = User::normalize_username(&user.username);

        match self.emails.entry(email.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("Email is already registered".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }

        match self.usernames.entry(username) {
            Entry::Occupied(_) => {
                self.emails.remove(&email);
                return Err(AppError::Conflict(
                    "Username is already registered".to_string(),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }

        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user_id = match self.emails.get(&User::normalize_email(email)) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        self.get_user(&user_id).await
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match self.users.get_mut(&user.id) {
            Some(mut existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("User {} not found", user.id))),
        }
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, AppError> {
        Ok(self.recipes.iter().map(|r| r.value().clone()).collect())
    }

    async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>, AppError> {
        Ok(self.recipes.get(recipe_id).map(|r| r.clone()))
    }

    async fn get_recipes_by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.recipes.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn upsert_recipe(&self, recipe: &Recipe) -> Result<(), AppError> {
        self.recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(())
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<Favorite>, AppError> {
        let mut favorites: Vec<Favorite> = self
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.value().clone())
            .collect();
        sort_newest_first(&mut favorites);
        Ok(favorites)
    }

    async fn create_favorite(&self, favorite: &Favorite) -> Result<Favorite, AppError> {
        match self.favorites.entry(favorite.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Recipe {} is already a favorite",
                favorite.recipe_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(favorite.clone());
                Ok(favorite.clone())
            }
        }
    }

    async fn get_favorite(&self, favorite_id: &str) -> Result<Option<Favorite>, AppError> {
        Ok(self.favorites.get(favorite_id).map(|f| f.clone()))
    }

    async fn delete_favorite(&self, favorite_id: &str, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .favorites
            .remove_if(favorite_id, |_, f| f.user_id == user_id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_user(id: &str, email: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            is_active: true,
            avatar: None,
            bio: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn test_favorite(user_id: &str, recipe_id: &str, minute: u32) -> Favorite {
        Favorite {
            id: Favorite::document_id(user_id, recipe_id),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            recipe_title: recipe_id.to_string(),
            recipe_description: "desc".to_string(),
            recipe_image: "/img.jpg".to_string(),
            recipe_cuisine: None,
            added_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let db = MemoryDb::new();
        db.create_user(&test_user("u1", "cook@example.com", "cook"))
            .await
            .unwrap();

        let err = db
            .create_user(&test_user("u2", "COOK@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_username_conflict_releases_email_claim() {
        let db = MemoryDb::new();
        db.create_user(&test_user("u1", "a@example.com", "cook"))
            .await
            .unwrap();

        let err = db
            .create_user(&test_user("u2", "b@example.com", "Cook"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // b@example.com must still be available
        db.create_user(&test_user("u3", "b@example.com", "baker"))
            .await
            .unwrap();
        assert!(db.get_user_by_email("b@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_favorite_pair_is_unique() {
        let db = MemoryDb::new();
        db.create_favorite(&test_favorite("u1", "tacos", 0))
            .await
            .unwrap();

        let err = db
            .create_favorite(&test_favorite("u1", "tacos", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(db.favorite_count(), 1);
    }

    #[tokio::test]
    async fn test_list_favorites_newest_first() {
        let db = MemoryDb::new();
        db.create_favorite(&test_favorite("u1", "a", 10)).await.unwrap();
        db.create_favorite(&test_favorite("u1", "b", 30)).await.unwrap();
        db.create_favorite(&test_favorite("u1", "c", 20)).await.unwrap();
        db.create_favorite(&test_favorite("u2", "d", 40)).await.unwrap();

        let ids: Vec<String> = db
            .list_favorites("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.recipe_id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_delete_favorite_requires_owner() {
        let db = MemoryDb::new();
        let favorite = test_favorite("u1", "tacos", 0);
        db.create_favorite(&favorite).await.unwrap();

        assert!(!db.delete_favorite(&favorite.id, "u2").await.unwrap());
        assert!(db.delete_favorite(&favorite.id, "u1").await.unwrap());
        assert!(!db.delete_favorite(&favorite.id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_recipe_creates_then_replaces() {
        let db = MemoryDb::new();
        let mut recipe: Recipe = serde_json::from_value(serde_json::json!({
            "id": "tacos",
            "title": "Tacos",
            "description": "Weeknight tacos",
            "image": "/images/tacos.jpg",
            "cuisine": "Mexican",
            "mealType": "Dinner",
            "prepTime": 10,
            "cookTime": 15,
            "servings": 4,
            "difficulty": "easy",
            "dietaryTags": [],
            "ingredients": [],
            "steps": []
        }))
        .unwrap();

        db.upsert_recipe(&recipe).await.unwrap();
        assert_eq!(db.get_recipe("tacos").await.unwrap().unwrap().title, "Tacos");

        recipe.title = "Fish Tacos".to_string();
        db.upsert_recipe(&recipe).await.unwrap();
        assert_eq!(db.list_recipes().await.unwrap().len(), 1);
        assert_eq!(db.get_recipe("tacos").await.unwrap().unwrap().title, "Fish Tacos");
    }
}
