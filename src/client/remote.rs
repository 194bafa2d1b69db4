// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites kept on the server, for one authenticated user.

use crate::client::session::Session;
use crate::client::store::{
    FavoriteItem, FavoritesError, FavoritesStore, PersistentStoreFactory, RecipeSummary,
    StoreKind,
};
use crate::models::{Favorite, NewFavorite};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Error body returned by the API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

pub struct RemoteFavoritesStore {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    token: Option<String>,
}

impl RemoteFavoritesStore {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        user_id: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Server records for this user, newest first.
    async fn fetch(&self) -> Result<Vec<Favorite>, FavoritesError> {
        let response = self
            .request(Method::GET, "/api/favorites")
            .query(&[("userId", &self.user_id)])
            .send()
            .await?;
        parse_json(ensure_success(response).await?).await
    }
}

/// Turn a non-2xx response into `FavoritesError::Rejected`.
async fn ensure_success(response: Response) -> Result<Response, FavoritesError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.details.unwrap_or(body.error),
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
    };
    Err(FavoritesError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, FavoritesError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FavoritesError::Malformed(e.to_string()))
}

#[async_trait]
impl FavoritesStore for RemoteFavoritesStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Persistent
    }

    async fn list(&self) -> Result<Vec<FavoriteItem>, FavoritesError> {
        Ok(self
            .fetch()
            .await?
            .into_iter()
            .map(FavoriteItem::from)
            .collect())
    }

    async fn add(&self, recipe: &RecipeSummary) -> Result<FavoriteItem, FavoritesError> {
        recipe.validate()?;

        let body = NewFavorite {
            user_id: self.user_id.clone(),
            recipe_id: recipe.id.clone(),
            recipe_title: recipe.title.clone(),
            recipe_description: recipe.description.clone(),
            recipe_image: recipe.image.clone(),
            recipe_cuisine: recipe.cuisine.clone(),
        };

        let response = self
            .request(Method::POST, "/api/favorites")
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(FavoritesError::AlreadyFavorited(recipe.id.clone())),
            StatusCode::NOT_FOUND => Err(FavoritesError::UnknownUser(self.user_id.clone())),
            _ => {
                let created: Favorite = parse_json(ensure_success(response).await?).await?;
                // The server does not keep the meal type
                let mut item = FavoriteItem::from(created);
                item.meal_type = recipe.meal_type.clone();
                Ok(item)
            }
        }
    }

    async fn remove(&self, recipe_id: &str) -> Result<(), FavoritesError> {
        // Deletes go by the favorite's own ID, so look it up first
        let favorite_id = self
            .fetch()
            .await?
            .into_iter()
            .find(|f| f.recipe_id == recipe_id)
            .map(|f| f.id)
            .ok_or_else(|| FavoritesError::NotFavorited(recipe_id.to_string()))?;

        let path = format!("/api/favorites/{}", urlencoding::encode(&favorite_id));
        let response = self
            .request(Method::DELETE, &path)
            .query(&[("userId", &self.user_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FavoritesError::Vanished(recipe_id.to_string()));
        }
        ensure_success(response).await?;
        Ok(())
    }
}

/// Builds a [`RemoteFavoritesStore`] per authenticated session, sharing one
/// HTTP client.
#[derive(Clone)]
pub struct RemoteStoreFactory {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStoreFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl PersistentStoreFactory for RemoteStoreFactory {
    fn for_session(&self, user_id: &str, session: &Session) -> Arc<dyn FavoritesStore> {
        Arc::new(RemoteFavoritesStore::new(
            self.client.clone(),
            &self.base_url,
            user_id,
            session.token.clone(),
        ))
    }
}
