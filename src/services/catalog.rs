// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe catalog loading for the in-memory backend.

use crate::models::Recipe;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Recipes read from a JSON array.
#[derive(Debug, Default, Clone)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Load recipes from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load recipes from a JSON string. Duplicate IDs are rejected.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json_data)
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let mut seen = HashSet::new();
        for recipe in &recipes {
            if recipe.id.trim().is_empty() {
                return Err(CatalogError::MissingId(recipe.title.clone()));
            }
            if !seen.insert(recipe.id.as_str()) {
                return Err(CatalogError::DuplicateId(recipe.id.clone()));
            }
        }

        tracing::info!(count = recipes.len(), "Loaded recipe catalog");
        Ok(Self { recipes })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn into_recipes(self) -> Vec<Recipe> {
        self.recipes
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse recipe JSON: {0}")]
    ParseError(String),

    #[error("Recipe '{0}' has no id")]
    MissingId(String),

    #[error("Duplicate recipe id: {0}")]
    DuplicateId(String),
}
