// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Database setup, pipeline assembly over mocks, and canned vision replies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Mealsnap Contributors
#![allow(dead_code)]

//! Shared test utilities for `mealsnap` integration tests

use std::sync::{Arc, Once};

use anyhow::Result;
use mealsnap::cache::{InMemoryNutritionCache, NutritionCache};
use mealsnap::database::Database;
use mealsnap::external::SearchProvider;
use mealsnap::llm::{ImagePayload, VisionProvider};
use mealsnap::nutrition::NutritionResolver;
use mealsnap::pipeline::{MealAnalysisRequest, MealPipeline};
use mealsnap::recognition::RecognitionAdapter;
use mealsnap::store::MealStore;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup (in-memory SQLite)
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Assemble a pipeline over the given mocks and database
///
/// `search == None` runs the resolver with search disabled (backup table
/// only); the cache defaults to a fresh in-memory instance.
pub fn build_test_pipeline(
    vision: Arc<dyn VisionProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    database: Arc<Database>,
) -> MealPipeline {
    build_test_pipeline_with_cache(vision, search, Arc::new(InMemoryNutritionCache::new()), database)
}

/// Assemble a pipeline with an explicit cache instance
pub fn build_test_pipeline_with_cache(
    vision: Arc<dyn VisionProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    cache: Arc<dyn NutritionCache>,
    database: Arc<Database>,
) -> MealPipeline {
    MealPipeline::new(
        RecognitionAdapter::new(vision),
        NutritionResolver::new(search, cache, 5),
        MealStore::new(database),
    )
}

/// A minimal request with a stub photo payload
pub fn test_request(user_id: Uuid, day_id: Uuid) -> MealAnalysisRequest {
    MealAnalysisRequest {
        user_id,
        day_id,
        photo_ref: Some("photos/test-meal.jpg".to_owned()),
        photo: ImagePayload::jpeg(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        category: None,
    }
}

/// Canned vision reply: a single steamed-rice item at 200 grams
pub fn rice_reply() -> String {
    r#"[{"name": "rice", "quantity": "200", "unit": "grams", "preparation": "steamed", "confidence": "high"}]"#
        .to_owned()
}

/// Count rows in a table, bypassing the store
pub async fn count_rows(database: &Database, table: &str) -> Result<i64> {
    use sqlx::Row;
    let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(database.pool())
        .await?;
    Ok(row.try_get("n")?)
}

/// Drop both meal tables so every subsequent write fails
pub async fn break_database(database: &Database) -> Result<()> {
    sqlx::query("DROP TABLE meal_items")
        .execute(database.pool())
        .await?;
    sqlx::query("DROP TABLE meals")
        .execute(database.pool())
        .await?;
    Ok(())
}
