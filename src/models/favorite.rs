// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorite join record (user -> recipe snapshot).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored favorite. Holds a denormalized copy of the recipe fields shown in
/// favorites lists; it does not follow later recipe edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Favorite {
    /// Document ID, derived from (user_id, recipe_id)
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    pub recipe_title: String,
    pub recipe_description: String,
    pub recipe_image: String,
    #[serde(default)]
    pub recipe_cuisine: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    /// Document ID for a (user, recipe) pair.
    ///
    /// One ID per pair is what makes a second create for the same pair fail.
    pub fn document_id(user_id: &str, recipe_id: &str) -> String {
        format!(
            "{}:{}",
            urlencoding::encode(user_id),
            urlencoding::encode(recipe_id)
        )
    }

    /// Build a favorite from a create request.
    pub fn from_request(request: NewFavorite, added_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::document_id(&request.user_id, &request.recipe_id),
            user_id: request.user_id,
            recipe_id: request.recipe_id,
            recipe_title: request.recipe_title,
            recipe_description: request.recipe_description,
            recipe_image: request.recipe_image,
            recipe_cuisine: request.recipe_cuisine.filter(|c| !c.trim().is_empty()),
            added_at,
        }
    }
}

/// Body of `POST /api/favorites`.
///
/// Missing fields deserialize as empty strings so they fail validation
/// with a 400 instead of a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewFavorite {
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "recipeId is required"))]
    pub recipe_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "recipeTitle is required"))]
    pub recipe_title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "recipeDescription is required"))]
    pub recipe_description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "recipeImage is required"))]
    pub recipe_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_cuisine: Option<String>,
}
