// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored recipe record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Recipe {
    /// Slug, also used as document ID (e.g. "barbacoa-tacos")
    pub id: String,
    pub title: String,
    pub description: String,
    /// Image URL or path
    pub image: String,
    /// Cuisine (e.g. "Mexican")
    pub cuisine: String,
    /// Meal type (e.g. "Dinner")
    pub meal_type: String,
    /// Prep time in minutes
    pub prep_time: u32,
    /// Cook time in minutes
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Ingredient {
    /// Free-form quantity ("2", "1/2", "to taste")
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    pub item: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Step {
    pub step_number: u32,
    pub instruction: String,
}

/// Compact recipe shape returned by search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecipeSearchResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub cuisine: String,
    pub meal_type: String,
    pub prep_time: u32,
    pub cook_time: u32,
    pub difficulty: Difficulty,
}

impl From<&Recipe> for RecipeSearchResult {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image: recipe.image.clone(),
            cuisine: recipe.cuisine.clone(),
            meal_type: recipe.meal_type.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            difficulty: recipe.difficulty,
        }
    }
}
