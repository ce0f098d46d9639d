// ABOUTME: Domain model types shared across pipeline components
// ABOUTME: Nutrition facts, recognized items, confidence tiers, and persisted meal records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

/// Persisted meal and meal item records
pub mod meal;
/// Nutrition facts, lookup results, and recognized food items
pub mod nutrition;

pub use meal::{MealItemRecord, MealRecord, MealStatus};
pub use nutrition::{ConfidenceTier, NutritionFacts, NutritionLookupResult, RecognizedItem};
