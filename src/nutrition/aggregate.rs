// ABOUTME: Meal total aggregation - component-wise sums over resolved nutrition entries
// ABOUTME: Item-level failures arrive as zero placeholders and never raise errors here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use crate::models::{NutritionFacts, NutritionLookupResult};

/// Sum per-item facts into meal totals
///
/// Component-wise addition across all entries; non-finite values contribute
/// 0.0 rather than erroring. Final totals are rounded to 2 decimals per
/// field. Order-independent up to that rounding.
#[must_use]
pub fn aggregate_totals(entries: &[NutritionLookupResult]) -> NutritionFacts {
    entries
        .iter()
        .fold(NutritionFacts::zero(), |acc, entry| acc.add(&entry.facts))
        .rounded_2dp()
}
