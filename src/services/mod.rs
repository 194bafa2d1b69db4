// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod password;
pub mod recipes;

pub use catalog::{CatalogError, RecipeCatalog};
pub use recipes::{RecipeFilter, RecipeQueryService};
