// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{User, UserProfile};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me).put(update_me))
}

/// Partial profile update. Absent fields are left alone; an empty avatar or
/// bio clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "firstName must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "lastName must be 1-100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 2048, message = "avatar URL is too long"))]
    pub avatar: Option<String>,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    /// Trim every present field. Validation runs on the trimmed values, so a
    /// whitespace-only name is rejected.
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            avatar: trim(self.avatar),
            bio: trim(self.bio),
        }
    }

    fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar).filter(|a| !a.is_empty());
        }
        if let Some(bio) = self.bio {
            user.bio = Some(bio).filter(|b| !b.is_empty());
        }
    }
}

async fn load_user(state: &AppState, user: &AuthUser) -> Result<User> {
    state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = load_user(&state, &user).await?;
    Ok(Json(UserProfile::from(&profile)))
}

/// Edit the current user's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let req = req.trimmed();
    req.validate()?;

    let mut profile = load_user(&state, &user).await?;
    req.apply(&mut profile);
    profile.updated_at = User::timestamp_now();
    state.db.update_user(&profile).await?;

    tracing::info!(user_id = %profile.id, "Profile updated");
    Ok(Json(UserProfile::from(&profile)))
}
