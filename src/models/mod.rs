// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod favorite;
pub mod recipe;
pub mod user;

pub use favorite::{Favorite, NewFavorite};
pub use recipe::{Difficulty, Ingredient, Recipe, RecipeSearchResult, Step};
pub use user::{User, UserProfile};
