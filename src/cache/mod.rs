// ABOUTME: Cache abstraction for resolved nutrition lookups
// ABOUTME: Injected capability so tests can substitute in-memory or no-op implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Nutrition Lookup Cache
//!
//! The nutrition cache is the only cross-invocation shared state in the
//! pipeline. Usage is insert-only (entries are never mutated once written),
//! so implementations need collision-safe insertion rather than full mutual
//! exclusion. Only genuine search-derived successes are cached; backup-table
//! estimates and failures are not.

/// In-memory and no-op cache implementations
pub mod memory;

pub use memory::{InMemoryNutritionCache, NoopNutritionCache};

use std::fmt;

use async_trait::async_trait;

use crate::models::NutritionLookupResult;

/// Structured cache key: normalized (name, quantity, unit)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NutritionCacheKey {
    /// Lowercased, trimmed food name
    pub name: String,
    /// Free-text quantity ("" when the caller passed none)
    pub quantity: String,
    /// Unit ("grams" when the caller passed none)
    pub unit: String,
}

impl NutritionCacheKey {
    /// Build a normalized key
    #[must_use]
    pub fn new(name: &str, quantity: Option<&str>, unit: Option<&str>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            quantity: quantity.unwrap_or("").trim().to_owned(),
            unit: unit.unwrap_or("grams").trim().to_lowercase(),
        }
    }
}

impl fmt::Display for NutritionCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.quantity, self.unit)
    }
}

/// Cache capability consumed by the nutrition resolver
#[async_trait]
pub trait NutritionCache: Send + Sync {
    /// Look up a previously resolved result
    async fn get(&self, key: &NutritionCacheKey) -> Option<NutritionLookupResult>;

    /// Insert a resolved result; existing entries are left untouched
    async fn put(&self, key: NutritionCacheKey, value: NutritionLookupResult);

    /// Number of cached entries (monitoring/tests)
    async fn len(&self) -> usize;

    /// True when the cache holds no entries
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop all entries (tests/admin)
    async fn clear(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        let key = NutritionCacheKey::new("  Chicken Breast ", Some("200"), None);
        assert_eq!(key.name, "chicken breast");
        assert_eq!(key.quantity, "200");
        assert_eq!(key.unit, "grams");
        assert_eq!(key.to_string(), "chicken breast:200:grams");
    }

    #[test]
    fn test_equal_args_produce_equal_keys() {
        let a = NutritionCacheKey::new("Rice", Some("200"), Some("grams"));
        let b = NutritionCacheKey::new("rice ", Some("200"), Some("GRAMS"));
        assert_eq!(a, b);
    }
}
