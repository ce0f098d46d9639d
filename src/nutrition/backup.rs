// ABOUTME: Static backup table of common foods used when search is unavailable or unproductive
// ABOUTME: Per-100g values; matched by bidirectional substring containment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Backup Knowledge Table
//!
//! A fixed mapping of common food names to complete per-100g nutrition
//! facts. Values are approximate averages from public food composition
//! data; results from this table are flagged `source = "estimated"` with
//! low confidence.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::NutritionFacts;

const fn facts(
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
    fiber_g: f64,
    sugar_g: f64,
    sodium_mg: f64,
) -> NutritionFacts {
    NutritionFacts {
        calories,
        protein_g,
        carbs_g,
        fat_g,
        fiber_g,
        sugar_g,
        sodium_mg,
    }
}

/// Common foods, per 100 g
static BACKUP_TABLE: LazyLock<HashMap<&'static str, NutritionFacts>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Proteins
    m.insert("chicken breast", facts(165.0, 31.0, 0.0, 3.6, 0.0, 0.0, 74.0));
    m.insert("salmon", facts(208.0, 20.4, 0.0, 13.4, 0.0, 0.0, 59.0));
    m.insert("beef", facts(250.0, 26.0, 0.0, 15.0, 0.0, 0.0, 72.0));
    m.insert("egg", facts(155.0, 13.0, 1.1, 11.0, 0.0, 1.1, 124.0));
    m.insert("tofu", facts(76.0, 8.0, 1.9, 4.8, 0.3, 0.6, 7.0));

    // Grains & starches
    m.insert("rice", facts(130.0, 2.7, 28.0, 0.3, 0.4, 0.1, 1.0));
    m.insert("pasta", facts(131.0, 5.0, 25.0, 1.1, 1.8, 0.6, 1.0));
    m.insert("bread", facts(265.0, 9.0, 49.0, 3.2, 2.7, 5.0, 491.0));
    m.insert("potato", facts(77.0, 2.0, 17.0, 0.1, 2.2, 0.8, 6.0));
    m.insert("oatmeal", facts(68.0, 2.4, 12.0, 1.4, 1.7, 0.3, 49.0));

    // Fruit
    m.insert("banana", facts(89.0, 1.1, 22.8, 0.3, 2.6, 12.2, 1.0));
    m.insert("apple", facts(52.0, 0.3, 13.8, 0.2, 2.4, 10.4, 1.0));
    m.insert("orange", facts(47.0, 0.9, 11.8, 0.1, 2.4, 9.4, 0.0));

    // Vegetables
    m.insert("broccoli", facts(34.0, 2.8, 6.6, 0.4, 2.6, 1.7, 33.0));
    m.insert("salad", facts(15.0, 1.4, 2.9, 0.2, 1.3, 0.8, 28.0));
    m.insert("tomato", facts(18.0, 0.9, 3.9, 0.2, 1.2, 2.6, 5.0));
    m.insert("carrot", facts(41.0, 0.9, 9.6, 0.2, 2.8, 4.7, 69.0));

    // Dairy
    m.insert("milk", facts(61.0, 3.2, 4.8, 3.3, 0.0, 5.1, 43.0));
    m.insert("cheese", facts(402.0, 25.0, 1.3, 33.0, 0.0, 0.5, 621.0));
    m.insert("yogurt", facts(59.0, 10.0, 3.6, 0.4, 0.0, 3.2, 36.0));

    m
});

/// Look up a food in the backup table
///
/// Matching is bidirectional substring containment between the normalized
/// query and the table key: "grilled chicken breast" matches "chicken
/// breast", and "rice" matches a query of "ric" only via the key containing
/// direction. Returns per-100g facts.
#[must_use]
pub fn lookup_backup_food(name: &str) -> Option<NutritionFacts> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    BACKUP_TABLE
        .iter()
        .find(|(key, _)| normalized.contains(*key) || key.contains(normalized.as_str()))
        .map(|(_, facts)| *facts)
}
