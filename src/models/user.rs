// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID (also used as document ID)
    pub id: String,
    /// Email address, lower-cased
    pub email: String,
    pub username: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    /// Avatar image URL
    pub avatar: Option<String>,
    pub bio: Option<String>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last profile or password change (RFC 3339)
    pub updated_at: String,
}

impl User {
    /// Normalize an email address for storage and lookup.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Current time in the format stored in `created_at`/`updated_at`.
    pub fn timestamp_now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Normalize a username for uniqueness checks.
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at.clone(),
        }
    }
}
