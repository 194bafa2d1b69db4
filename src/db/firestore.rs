// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles plus email/username uniqueness claims)
//! - Recipes (read-mostly catalog)
//! - Favorites (one document per user/recipe pair)

use crate::db::{collections, sort_newest_first, Database};
use crate::error::AppError;
use crate::models::{Favorite, Recipe, User};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Uniqueness claim document: the ID is the claimed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claim {
    user_id: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Create a uniqueness claim document; fails with `Conflict` if taken.
    async fn claim(
        &self,
        collection: &str,
        key: &str,
        user_id: &str,
        what: &str,
    ) -> Result<(), AppError> {
        let claim = Claim {
            user_id: user_id.to_string(),
        };

        let result: Result<Claim, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(key)
            .object(&claim)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => {
                Err(AppError::Conflict(format!("{} is already registered", what)))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Best-effort removal of a claim after a failed registration.
    async fn release_claim(&self, collection: &str, key: &str) {
        let result = match self.get_client() {
            Ok(client) => client
                .fluent()
                .delete()
                .from(collection)
                .document_id(key)
                .execute()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(collection, key, error = %e, "Failed to release uniqueness claim");
        }
    }
}

fn email_key(email: &str) -> String {
    urlencoding::encode(&User::normalize_email(email)).into_owned()
}

fn username_key(username: &str) -> String {
    urlencoding::encode(&User::normalize_username(username)).into_owned()
}

#[async_trait]
impl Database for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let email_key = email_key(&user.email);
        let username_key = username_key(&user.username);

        self.claim(collections::USER_EMAILS, &email_key, &user.id, "Email")
            .await?;

        if let Err(e) = self
            .claim(collections::USERNAMES, &username_key, &user.id, "Username")
            .await
        {
            self.release_claim(collections::USER_EMAILS, &email_key).await;
            return Err(e);
        }

        let created: Result<User, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await;

        if let Err(e) = created {
            self.release_claim(collections::USER_EMAILS, &email_key).await;
            self.release_claim(collections::USERNAMES, &username_key).await;
            return Err(AppError::Database(e.to_string()));
        }

        tracing::debug!(user_id = %user.id, "User document created");
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let claim: Option<Claim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_EMAILS)
            .obj()
            .one(&email_key(email))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_user(&claim.user_id).await,
            None => Ok(None),
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Recipe Operations ───────────────────────────────────────

    async fn list_recipes(&self) -> Result<Vec<Recipe>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RECIPES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RECIPES)
            .obj()
            .one(recipe_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch recipes by ID with bounded concurrency.
    async fn get_recipes_by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, AppError> {
        let found = stream::iter(ids.to_vec())
            .map(|id| async move { self.get_recipe(&id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<Recipe>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<Recipe>>, AppError>>()?;

        Ok(found.into_iter().flatten().collect())
    }

    async fn upsert_recipe(&self, recipe: &Recipe) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RECIPES)
            .document_id(&recipe.id)
            .object(recipe)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Favorite Operations ─────────────────────────────────────

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<Favorite>, AppError> {
        let mut favorites: Vec<Favorite> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FAVORITES)
            .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Timestamps are stored as strings with variable precision, so order here
        // rather than in the query.
        sort_newest_first(&mut favorites);
        Ok(favorites)
    }

    /// Create-if-absent write; Firestore rejects a second create of the
    /// same document ID.
    async fn create_favorite(&self, favorite: &Favorite) -> Result<Favorite, AppError> {
        let result: Result<Favorite, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::FAVORITES)
            .document_id(&favorite.id)
            .object(favorite)
            .execute()
            .await;

        match result {
            Ok(created) => Ok(created),
            Err(FirestoreError::DataConflictError(_)) => Err(AppError::Conflict(format!(
                "Recipe {} is already a favorite",
                favorite.recipe_id
            ))),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn get_favorite(&self, favorite_id: &str) -> Result<Option<Favorite>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FAVORITES)
            .obj()
            .one(favorite_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_favorite(&self, favorite_id: &str, user_id: &str) -> Result<bool, AppError> {
        // Ownership check and delete are two round trips; a concurrent delete in
        // between is harmless since deleting a missing document succeeds.
        match self.get_favorite(favorite_id).await? {
            Some(favorite) if favorite.user_id == user_id => {}
            _ => return Ok(false),
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::FAVORITES)
            .document_id(favorite_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(favorite_id, user_id, "Favorite deleted");
        Ok(true)
    }
}
