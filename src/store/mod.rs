// ABOUTME: Meal persistence gateway - transactional success-path writes and best-effort failure writes
// ABOUTME: Child write failures are absorbed; a parent write failure rolls the transaction back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Meal Store
//!
//! Persistence gateway for analyzed meals. Two write paths:
//!
//! - **Success path**: one transaction creates the parent meal and one
//!   child row per resolved nutrition entry. A failed child insert is
//!   logged and skipped; a failed parent insert rolls everything back and
//!   surfaces a database error.
//! - **Error-recovery path**: a best-effort write of a failed-status meal
//!   with every recognized item flagged needs-review. Failures here are
//!   swallowed; the caller's in-memory partial results are the fallback.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ConfidenceTier, MealItemRecord, MealRecord, MealStatus, NutritionFacts, NutritionLookupResult,
    RecognizedItem,
};

/// Quantity used when an item's free-text quantity does not parse
const DEFAULT_ITEM_QUANTITY: f64 = 100.0;

/// Arguments for persisting one analyzed meal
pub struct NewMeal<'a> {
    pub user_id: Uuid,
    pub day_id: Uuid,
    pub category: &'a str,
    pub photo_ref: Option<&'a str>,
    pub totals: NutritionFacts,
    pub confidence: ConfidenceTier,
    pub recognized_items: &'a [RecognizedItem],
    pub entries: &'a [NutritionLookupResult],
    /// Names of items whose lookup failed and need manual completion
    pub fallback_needed: &'a [String],
}

/// Meal persistence gateway
#[derive(Clone)]
pub struct MealStore {
    database: Arc<Database>,
}

impl MealStore {
    /// Create a store over the given database
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Persist a completed meal and its items in one transaction
    ///
    /// # Errors
    ///
    /// Returns a database error when the parent insert or the commit fails;
    /// in that case nothing is written. Individual child failures are
    /// logged and skipped without aborting siblings.
    pub async fn create_completed_meal(&self, meal: &NewMeal<'_>) -> AppResult<Uuid> {
        self.write_meal(meal, MealStatus::Completed, None).await
    }

    /// Best-effort write of a failed meal for manual review
    ///
    /// Every recognized item is flagged needs-review. Any failure is
    /// swallowed and reflected only in the returned `None`.
    pub async fn create_failed_meal(&self, meal: &NewMeal<'_>, error: &str) -> Option<Uuid> {
        match self.write_meal(meal, MealStatus::Failed, Some(error)).await {
            Ok(meal_id) => Some(meal_id),
            Err(e) => {
                warn!(error = %e, "best-effort failed-meal write was itself lost");
                None
            }
        }
    }

    async fn write_meal(
        &self,
        meal: &NewMeal<'_>,
        status: MealStatus,
        error: Option<&str>,
    ) -> AppResult<Uuid> {
        let meal_id = Uuid::new_v4();
        let now = Utc::now();
        let summary = summarize_items(meal.recognized_items);
        let raw_items = serde_json::to_string(meal.recognized_items)?;

        let mut tx = self.database.pool().begin().await?;

        let parent = sqlx::query(
            r"INSERT INTO meals (
                id, user_id, day_id, category, photo_ref, status, error, summary, raw_items,
                calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
                confidence, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(meal_id.to_string())
        .bind(meal.user_id.to_string())
        .bind(meal.day_id.to_string())
        .bind(meal.category)
        .bind(meal.photo_ref)
        .bind(status.as_str())
        .bind(error)
        .bind(&summary)
        .bind(&raw_items)
        .bind(meal.totals.calories)
        .bind(meal.totals.protein_g)
        .bind(meal.totals.carbs_g)
        .bind(meal.totals.fat_g)
        .bind(meal.totals.fiber_g)
        .bind(meal.totals.sugar_g)
        .bind(meal.totals.sodium_mg)
        .bind(meal.confidence.as_str())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await;

        if let Err(e) = parent {
            // Dropping the transaction rolls back; nothing was written
            return Err(AppError::database(format!("meal insert failed: {e}")));
        }

        let unresolved = NutritionLookupResult::unresolved();
        for (index, item) in meal.recognized_items.iter().enumerate() {
            let entry = meal.entries.get(index).unwrap_or(&unresolved);
            let needs_review = status == MealStatus::Failed
                || meal.fallback_needed.contains(&item.name);
            let quantity = item.parsed_quantity().unwrap_or(DEFAULT_ITEM_QUANTITY);

            let child = sqlx::query(
                r"INSERT INTO meal_items (
                    id, meal_id, name, quantity, unit,
                    calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
                    source, confidence, needs_review, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(meal_id.to_string())
            .bind(&item.name)
            .bind(quantity)
            .bind(&item.unit)
            .bind(entry.facts.calories)
            .bind(entry.facts.protein_g)
            .bind(entry.facts.carbs_g)
            .bind(entry.facts.fat_g)
            .bind(entry.facts.fiber_g)
            .bind(entry.facts.sugar_g)
            .bind(entry.facts.sodium_mg)
            .bind(&entry.source)
            .bind(entry.confidence.as_str())
            .bind(i64::from(needs_review))
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await;

            if let Err(e) = child {
                // A lost child must not abort siblings or the parent
                warn!(item = %item.name, error = %e, "meal item insert failed, skipping");
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("meal transaction commit failed: {e}")))?;

        debug!(%meal_id, status = status.as_str(), "meal persisted");
        Ok(meal_id)
    }

    /// Fetch one meal by id
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure; `Ok(None)` when absent.
    pub async fn get_meal(&self, meal_id: Uuid) -> AppResult<Option<MealRecord>> {
        let row = sqlx::query("SELECT * FROM meals WHERE id = ?")
            .bind(meal_id.to_string())
            .fetch_optional(self.database.pool())
            .await?;

        row.map(|r| row_to_meal(&r)).transpose()
    }

    /// Fetch the items belonging to one meal
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn get_meal_items(&self, meal_id: Uuid) -> AppResult<Vec<MealItemRecord>> {
        let rows = sqlx::query("SELECT * FROM meal_items WHERE meal_id = ? ORDER BY created_at, id")
            .bind(meal_id.to_string())
            .fetch_all(self.database.pool())
            .await?;

        rows.iter().map(row_to_item).collect()
    }

    /// List a user's meals for one destination day, newest first
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list_meals_for_day(
        &self,
        user_id: Uuid,
        day_id: Uuid,
    ) -> AppResult<Vec<MealRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM meals WHERE user_id = ? AND day_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .bind(day_id.to_string())
        .fetch_all(self.database.pool())
        .await?;

        rows.iter().map(row_to_meal).collect()
    }

    /// Delete a meal; its items cascade
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn delete_meal(&self, meal_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = ?")
            .bind(meal_id.to_string())
            .execute(self.database.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Generate the meal summary string, e.g. "Recognized 2 items: rice, beans"
#[must_use]
pub fn summarize_items(items: &[RecognizedItem]) -> String {
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    format!("Recognized {} items: {}", items.len(), names.join(", "))
}

fn row_to_meal(row: &sqlx::sqlite::SqliteRow) -> AppResult<MealRecord> {
    Ok(MealRecord {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
        day_id: parse_uuid(&row.try_get::<String, _>("day_id")?)?,
        category: row.try_get("category")?,
        photo_ref: row.try_get("photo_ref")?,
        status: MealStatus::parse(&row.try_get::<String, _>("status")?),
        error: row.try_get("error")?,
        summary: row.try_get("summary")?,
        raw_items: row
            .try_get::<Option<String>, _>("raw_items")?
            .and_then(|raw| serde_json::from_str(&raw).ok()),
        totals: row_to_facts(row)?,
        confidence: ConfidenceTier::parse_lenient(&row.try_get::<String, _>("confidence")?),
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> AppResult<MealItemRecord> {
    Ok(MealItemRecord {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        meal_id: parse_uuid(&row.try_get::<String, _>("meal_id")?)?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        unit: row.try_get("unit")?,
        facts: row_to_facts(row)?,
        source: row.try_get("source")?,
        confidence: ConfidenceTier::parse_lenient(&row.try_get::<String, _>("confidence")?),
        needs_review: row.try_get::<i64, _>("needs_review")? != 0,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_facts(row: &sqlx::sqlite::SqliteRow) -> AppResult<NutritionFacts> {
    Ok(NutritionFacts {
        calories: row.try_get("calories")?,
        protein_g: row.try_get("protein_g")?,
        carbs_g: row.try_get("carbs_g")?,
        fat_g: row.try_get("fat_g")?,
        fiber_g: row.try_get("fiber_g")?,
        sugar_g: row.try_get("sugar_g")?,
        sodium_mg: row.try_get("sodium_mg")?,
    })
}

fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::database(format!("invalid uuid in row: {e}")))
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("invalid timestamp in row: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_items() {
        let items = vec![RecognizedItem::new("rice"), RecognizedItem::new("beans")];
        assert_eq!(summarize_items(&items), "Recognized 2 items: rice, beans");
        assert_eq!(summarize_items(&[]), "Recognized 0 items: ");
    }
}
