// ABOUTME: In-memory nutrition cache over a concurrent map, plus a no-op variant
// ABOUTME: Insert-only usage; concurrent pipeline instances share one instance safely
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use super::{NutritionCache, NutritionCacheKey};
use crate::models::NutritionLookupResult;

/// Default bound on cached lookups
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// In-memory nutrition cache backed by a concurrent map
pub struct InMemoryNutritionCache {
    entries: DashMap<NutritionCacheKey, NutritionLookupResult>,
    max_entries: usize,
}

impl InMemoryNutritionCache {
    /// Create a cache with the default entry bound
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache bounded to `max_entries`
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }
}

impl Default for InMemoryNutritionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NutritionCache for InMemoryNutritionCache {
    async fn get(&self, key: &NutritionCacheKey) -> Option<NutritionLookupResult> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn put(&self, key: NutritionCacheKey, value: NutritionLookupResult) {
        if self.entries.len() >= self.max_entries {
            trace!(%key, "nutrition cache full, dropping insert");
            return;
        }
        // entry() keeps the first write on concurrent insertion of the same key
        self.entries.entry(key).or_insert(value);
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}

/// No-op cache: never stores, never hits
///
/// Used by tests that must observe uncached resolver behavior.
pub struct NoopNutritionCache;

#[async_trait]
impl NutritionCache for NoopNutritionCache {
    async fn get(&self, _key: &NutritionCacheKey) -> Option<NutritionLookupResult> {
        None
    }

    async fn put(&self, _key: NutritionCacheKey, _value: NutritionLookupResult) {}

    async fn len(&self) -> usize {
        0
    }

    async fn clear(&self) {}
}
