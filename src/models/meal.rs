// ABOUTME: Persisted meal and meal item entities with processing metadata
// ABOUTME: A meal owns its items; deleting the meal cascades to the children
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::nutrition::{ConfidenceTier, NutritionFacts};

/// Processing status of a persisted meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    /// Pipeline ran to completion
    Completed,
    /// Pipeline failed; record is flagged for manual review
    Failed,
}

impl MealStatus {
    /// String form used in persistence
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the persisted string form
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "completed" {
            Self::Completed
        } else {
            Self::Failed
        }
    }
}

/// Parent record: one analyzed meal with aggregate totals and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    /// Meal identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Destination day this meal belongs to
    pub day_id: Uuid,
    /// Meal category ("breakfast", "lunch", "dinner", "snack")
    pub category: String,
    /// Reference to the source photo
    pub photo_ref: Option<String>,
    /// Processing status
    pub status: MealStatus,
    /// Error captured when status is failed
    pub error: Option<String>,
    /// Generated summary, e.g. "Recognized 3 items: rice, beans, salad"
    pub summary: Option<String>,
    /// Raw recognized-items payload as produced by the adapter
    pub raw_items: Option<serde_json::Value>,
    /// Aggregated nutrition totals for the meal
    pub totals: NutritionFacts,
    /// Overall recognition confidence
    pub confidence: ConfidenceTier,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Child record: one food item within a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItemRecord {
    /// Item identifier
    pub id: Uuid,
    /// Parent meal
    pub meal_id: Uuid,
    /// Food name
    pub name: String,
    /// Parsed quantity (defaults to 100.0 when the free text was unparseable)
    pub quantity: f64,
    /// Quantity unit
    pub unit: String,
    /// Per-item nutrition facts
    pub facts: NutritionFacts,
    /// Provenance of the facts (URL, "estimated", or "none")
    pub source: String,
    /// Lookup confidence
    pub confidence: ConfidenceTier,
    /// Marker requiring manual verification/completion
    pub needs_review: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(MealStatus::parse(MealStatus::Completed.as_str()), MealStatus::Completed);
        assert_eq!(MealStatus::parse(MealStatus::Failed.as_str()), MealStatus::Failed);
    }

    #[test]
    fn test_unknown_status_parses_as_failed() {
        assert_eq!(MealStatus::parse("pending"), MealStatus::Failed);
    }
}
