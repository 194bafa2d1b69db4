// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account credential routes: register, login, logout, password reset.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, LOGGED_IN_COOKIE, SESSION_TTL_SECS, TOKEN_COOKIE};
use crate::models::{User, UserProfile};
use crate::services::password::{hash_password, verify_password};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/reset-password", post(reset_password))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "firstName is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "lastName is required"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "currentPassword is required"))]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "newPassword must be at least 8 characters"))]
    pub new_password: String,
}

/// Successful register/login response.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub user: UserProfile,
    /// Session JWT, also set as a cookie. Non-browser clients send it as a
    /// bearer token.
    pub token: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;
    if !valid_username(&req.username) {
        return Err(AppError::BadRequest(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost).await?;
    let now = User::timestamp_now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: User::normalize_email(&req.email),
        username: req.username.trim().to_string(),
        password_hash,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        is_active: true,
        avatar: None,
        bio: None,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.create_user(&user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// Exchange email and password for a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    // Unknown email and wrong password look the same to the caller, in
    // status and in timing
    let Some(user) = state.db.get_user_by_email(&req.email).await? else {
        state.dummy_hash.verify(&req.password).await?;
        return Err(AppError::Unauthorized);
    };

    if !verify_password(&req.password, &user.password_hash).await? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Login blocked for inactive account");
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, jar, &user)
}

/// Clear the session cookies. The JWT itself stays valid until it expires.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let secure = state.config.secure_cookies();
    let jar = jar
        .remove(token_cookie(String::new(), secure))
        .remove(logged_in_cookie(secure));
    (StatusCode::NO_CONTENT, jar)
}

/// Replace a password after checking the current one.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;

    let Some(mut user) = state.db.get_user_by_email(&req.email).await? else {
        state.dummy_hash.verify(&req.current_password).await?;
        return Err(AppError::Unauthorized);
    };

    if !verify_password(&req.current_password, &user.password_hash).await? {
        tracing::warn!(user_id = %user.id, "Password reset rejected: wrong current password");
        return Err(AppError::Unauthorized);
    }

    user.password_hash = hash_password(&req.new_password, state.config.bcrypt_cost).await?;
    user.updated_at = User::timestamp_now();
    state.db.update_user(&user).await?;

    tracing::info!(user_id = %user.id, "Password reset");
    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated".to_string(),
    }))
}

/// Issue a JWT and attach the session cookies.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let secure = state.config.secure_cookies();
    let jar = jar
        .add(token_cookie(token.clone(), secure))
        .add(logged_in_cookie(secure));

    Ok((
        jar,
        Json(AuthResponse {
            user: UserProfile::from(user),
            token,
        }),
    ))
}

fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

fn logged_in_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((LOGGED_IN_COOKIE, "1"))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}
