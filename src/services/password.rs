// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing (bcrypt) on the blocking thread pool.

use crate::error::AppError;
use tokio::sync::OnceCell;

/// Hash a password with the given bcrypt cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Check a password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Password verification task failed: {}", e))
        })?;

    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be verified");
        false
    }))
}

/// A throwaway hash checked when a login names no account, so the response
/// takes as long as a wrong-password attempt at the configured cost.
pub struct DummyHash {
    cost: u32,
    hash: OnceCell<String>,
}

impl DummyHash {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            hash: OnceCell::new(),
        }
    }

    /// Run a full bcrypt verification against the dummy hash. The result is
    /// always discarded.
    pub async fn verify(&self, password: &str) -> Result<(), AppError> {
        let hash = self
            .hash
            .get_or_try_init(|| hash_password("recipe-box-dummy-password", self.cost))
            .await?;
        verify_password(password, hash).await?;
        Ok(())
    }
}
