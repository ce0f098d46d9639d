// ABOUTME: Nutrition resolver - cache, web search, regex extraction, and backup table
// ABOUTME: Resolution degrades tier by tier and never fails the caller; failures are encoded results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Nutrition Resolver
//!
//! Resolves nutrition facts for one food item at a time:
//!
//! 1. Cache lookup on the normalized (name, quantity, unit) key.
//! 2. Web search restricted to trusted nutrition domains, when configured.
//! 3. Per-candidate regex extraction with source-based confidence tiering;
//!    the first usable high-confidence candidate wins, otherwise the first
//!    usable candidate of any tier.
//! 4. Static backup table fallback.
//! 5. All-zero unresolved result.
//!
//! Only genuine search-derived successes are cached. Identical arguments
//! against an unchanged cache and backup table yield identical results.

pub mod aggregate;
pub mod backup;
pub mod extract;

pub use aggregate::aggregate_totals;
pub use backup::lookup_backup_food;
pub use extract::{extract_nutrition_facts, Extraction};

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::cache::{NutritionCache, NutritionCacheKey};
use crate::external::SearchProvider;
use crate::models::{
    nutrition::parse_leading_number, ConfidenceTier, NutritionFacts, NutritionLookupResult,
    RecognizedItem,
};

/// Fixed allow-list of trusted nutrition domains for search queries
pub const TRUSTED_NUTRITION_DOMAINS: &[&str] = &[
    "fdc.nal.usda.gov",
    "usda.gov",
    "nih.gov",
    "nutritionix.com",
    "myfitnesspal.com",
    "cronometer.com",
    "fatsecret.com",
];

/// Known nutrition-tracking sites: usable but non-authoritative
const TRACKER_DOMAINS: &[&str] = &[
    "nutritionix.com",
    "myfitnesspal.com",
    "cronometer.com",
    "fatsecret.com",
];

/// Nutrition resolver over an injected cache and optional search capability
pub struct NutritionResolver {
    search: Option<Arc<dyn SearchProvider>>,
    cache: Arc<dyn NutritionCache>,
    max_results: u32,
}

impl NutritionResolver {
    /// Create a resolver; `search == None` means search is disabled or unconfigured
    #[must_use]
    pub fn new(
        search: Option<Arc<dyn SearchProvider>>,
        cache: Arc<dyn NutritionCache>,
        max_results: u32,
    ) -> Self {
        Self {
            search,
            cache,
            max_results,
        }
    }

    /// Resolve nutrition facts for a recognized item
    pub async fn resolve_item(&self, item: &RecognizedItem) -> NutritionLookupResult {
        self.resolve(&item.name, Some(&item.quantity), Some(&item.unit))
            .await
    }

    /// Resolve nutrition facts for a food by name, with optional quantity and unit
    ///
    /// Never fails: an unresolvable food returns the all-zero result with
    /// `success == false`.
    pub async fn resolve(
        &self,
        name: &str,
        quantity: Option<&str>,
        unit: Option<&str>,
    ) -> NutritionLookupResult {
        let key = NutritionCacheKey::new(name, quantity, unit);

        if let Some(hit) = self.cache.get(&key).await {
            debug!(%key, "nutrition cache hit");
            return hit;
        }

        if let Some(result) = self.resolve_via_search(name, quantity, unit).await {
            self.cache.put(key, result.clone()).await;
            return result;
        }

        if let Some(table_facts) = lookup_backup_food(name) {
            debug!(food = name, "resolved from backup table");
            let scaled = scale_for_quantity(table_facts, quantity, unit);
            return NutritionLookupResult::estimated(scaled);
        }

        debug!(food = name, "nutrition lookup unresolved");
        NutritionLookupResult::unresolved()
    }

    /// Search trusted domains and extract facts from the candidate pages
    ///
    /// Returns None when search is disabled, errored, or produced no usable
    /// candidate; the caller then falls back to the backup table.
    async fn resolve_via_search(
        &self,
        name: &str,
        quantity: Option<&str>,
        unit: Option<&str>,
    ) -> Option<NutritionLookupResult> {
        let search = self.search.as_ref()?;

        let query = format!("{name} nutrition facts per 100g");
        let hits = match search
            .search(&query, TRUSTED_NUTRITION_DOMAINS, self.max_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(food = name, error = %e, "nutrition search failed");
                return None;
            }
        };

        let mut first_usable: Option<(NutritionFacts, String, ConfidenceTier)> = None;

        for hit in hits {
            let extraction = extract_nutrition_facts(&hit.content);
            if !extraction.is_usable() {
                continue;
            }

            let tier = source_confidence(&hit.url);
            if tier == ConfidenceTier::High {
                // First usable high-confidence candidate short-circuits
                first_usable = Some((extraction.facts, hit.url, tier));
                break;
            }
            if first_usable.is_none() {
                first_usable = Some((extraction.facts, hit.url, tier));
            }
        }

        let (facts, source_url, tier) = first_usable?;
        let scaled = scale_for_quantity(facts, quantity, unit);
        Some(NutritionLookupResult::from_search(scaled, source_url, tier))
    }
}

/// Assign a confidence tier from the candidate's source domain
///
/// Government and academic hosts are authoritative; known nutrition
/// trackers are medium; everything else is low.
#[must_use]
pub fn source_confidence(url: &str) -> ConfidenceTier {
    let Ok(parsed) = Url::parse(url) else {
        return ConfidenceTier::Low;
    };
    let Some(host) = parsed.host_str() else {
        return ConfidenceTier::Low;
    };
    let host = host.to_lowercase();

    if host.ends_with(".gov") || host.ends_with(".edu") {
        return ConfidenceTier::High;
    }

    let is_tracker = TRACKER_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));
    if is_tracker {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Scale per-100g facts when the requested quantity denotes grams
///
/// Sources are per-100g servings; a parseable gram quantity scales every
/// nutrient by quantity/100, rounded to 1 decimal. Non-gram units and
/// unparseable quantities leave the facts untouched.
fn scale_for_quantity(
    facts: NutritionFacts,
    quantity: Option<&str>,
    unit: Option<&str>,
) -> NutritionFacts {
    let Some(raw_quantity) = quantity else {
        return facts;
    };
    let unit_is_grams = matches!(
        unit.unwrap_or("grams").trim().to_lowercase().as_str(),
        "g" | "gram" | "grams"
    );
    if !unit_is_grams {
        return facts;
    }
    let Some(grams) = parse_leading_number(raw_quantity) else {
        return facts;
    };
    if grams <= 0.0 {
        return facts;
    }
    facts.scaled(grams / 100.0)
}
