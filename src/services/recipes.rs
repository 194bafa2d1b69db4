// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe search and listing.
//!
//! Firestore has no substring or case-insensitive matching, so the store hands
//! back recipes and the matching happens here. Every list operation has a
//! `try_` form that reports store errors and a plain form that logs them and
//! returns an empty list.

use crate::db::Database;
use crate::error::AppError;
use crate::models::Recipe;
use std::cmp::Ordering;
use std::sync::Arc;

/// Maximum number of search results.
pub const SEARCH_LIMIT: usize = 10;

/// Structured listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let eq = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .map(|w| w.trim().eq_ignore_ascii_case(actual.trim()))
                .unwrap_or(true)
        };
        eq(&self.cuisine, &recipe.cuisine) && eq(&self.meal_type, &recipe.meal_type)
    }
}

/// Query service over the recipe collection.
#[derive(Clone)]
pub struct RecipeQueryService {
    db: Arc<dyn Database>,
}

impl RecipeQueryService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Free-text search. Blank terms return nothing without touching the store.
    pub async fn search_recipes(&self, term: &str) -> Vec<Recipe> {
        degrade("search_recipes", self.try_search_recipes(term).await)
    }

    pub async fn try_search_recipes(&self, term: &str) -> Result<Vec<Recipe>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let recipes = self.db.list_recipes().await?;
        let results = search_in(&recipes, term);
        tracing::debug!(term, count = results.len(), "Recipe search");
        Ok(results)
    }

    /// Bulk fetch by ID, ordered by title (not input order).
    pub async fn get_recipes_by_ids(&self, ids: &[String]) -> Vec<Recipe> {
        degrade("get_recipes_by_ids", self.try_get_recipes_by_ids(ids).await)
    }

    pub async fn try_get_recipes_by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut recipes = self.db.get_recipes_by_ids(ids).await?;
        sort_by_title(&mut recipes);
        Ok(recipes)
    }

    pub async fn get_recipes_by_cuisine(&self, cuisine: &str) -> Vec<Recipe> {
        self.get_recipes_by_filter(&RecipeFilter {
            cuisine: Some(cuisine.to_string()),
            meal_type: None,
        })
        .await
    }

    pub async fn get_recipes_by_meal_type(&self, meal_type: &str) -> Vec<Recipe> {
        self.get_recipes_by_filter(&RecipeFilter {
            cuisine: None,
            meal_type: Some(meal_type.to_string()),
        })
        .await
    }

    /// Case-insensitive equality on cuisine and/or meal type, ordered by title.
    pub async fn get_recipes_by_filter(&self, filter: &RecipeFilter) -> Vec<Recipe> {
        degrade(
            "get_recipes_by_filter",
            self.try_get_recipes_by_filter(filter).await,
        )
    }

    pub async fn try_get_recipes_by_filter(
        &self,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, AppError> {
        let mut recipes: Vec<Recipe> = self
            .db
            .list_recipes()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        sort_by_title(&mut recipes);
        Ok(recipes)
    }

    /// Single recipe lookup. Unlike the list operations this reports errors.
    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>, AppError> {
        self.db.get_recipe(recipe_id).await
    }
}

/// Log a failed query and fall back to an empty list.
fn degrade(operation: &str, result: Result<Vec<Recipe>, AppError>) -> Vec<Recipe> {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation, error = %e, "Recipe query failed, returning empty result");
        Vec::new()
    })
}

/// Whether a recipe matches a search term.
///
/// Substring on title, description, cuisine and meal type. Dietary tags match
/// only as a whole tag, ignoring case: "gluten-free" finds a "Gluten-Free" tag
/// but "gluten" does not. `term_lower` must already be trimmed and lower-cased.
pub fn matches_term(recipe: &Recipe, term_lower: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(term_lower);

    contains(&recipe.title)
        || contains(&recipe.description)
        || contains(&recipe.cuisine)
        || contains(&recipe.meal_type)
        || recipe
            .dietary_tags
            .iter()
            .any(|tag| tag.to_lowercase() == term_lower)
}

/// Search a slice of recipes: matches ordered by title, capped at [`SEARCH_LIMIT`].
pub fn search_in(recipes: &[Recipe], term: &str) -> Vec<Recipe> {
    let term_lower = term.trim().to_lowercase();
    if term_lower.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Recipe> = recipes
        .iter()
        .filter(|r| matches_term(r, &term_lower))
        .cloned()
        .collect();
    sort_by_title(&mut matches);
    matches.truncate(SEARCH_LIMIT);
    matches
}

/// Alphabetical by title, ignoring case; ID breaks ties.
pub fn sort_by_title(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| compare_titles(a, b));
}

fn compare_titles(a: &Recipe, b: &Recipe) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
