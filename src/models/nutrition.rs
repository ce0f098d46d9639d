// ABOUTME: Nutrition domain types - facts, lookup results, recognized items, confidence
// ABOUTME: NutritionFacts is always fully populated; unresolved fields default to 0.0
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use serde::{Deserialize, Serialize};

/// Confidence tier qualifying trust in a recognized item or resolved fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Authoritative source or unambiguous recognition
    High,
    /// Known-good but non-authoritative source
    Medium,
    /// Uncertain recognition or unvetted source
    #[default]
    Low,
}

impl ConfidenceTier {
    /// Numeric weight used when averaging tiers (high=3, medium=2, low=1)
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::High => 3.0,
            Self::Medium => 2.0,
            Self::Low => 1.0,
        }
    }

    /// Map a mean of tier weights back to a tier (>=2.5 high, >=1.5 medium)
    #[must_use]
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 2.5 {
            Self::High
        } else if mean >= 1.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// String form used in persistence and API payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Lenient parse: unknown values degrade to `Low` rather than erroring
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Macro and micronutrient facts for one food item or one whole meal
///
/// Always fully populated: a field that could not be resolved is 0.0,
/// never absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionFacts {
    /// Energy in kilocalories
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Dietary fiber in grams
    pub fiber_g: f64,
    /// Sugar in grams
    pub sugar_g: f64,
    /// Sodium in milligrams
    pub sodium_mg: f64,
}

impl NutritionFacts {
    /// All-zero facts, used for unresolved placeholders
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            calories: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
            fiber_g: 0.0,
            sugar_g: 0.0,
            sodium_mg: 0.0,
        }
    }

    /// Component-wise addition; non-finite inputs contribute 0.0
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            calories: self.calories + finite_or_zero(other.calories),
            protein_g: self.protein_g + finite_or_zero(other.protein_g),
            carbs_g: self.carbs_g + finite_or_zero(other.carbs_g),
            fat_g: self.fat_g + finite_or_zero(other.fat_g),
            fiber_g: self.fiber_g + finite_or_zero(other.fiber_g),
            sugar_g: self.sugar_g + finite_or_zero(other.sugar_g),
            sodium_mg: self.sodium_mg + finite_or_zero(other.sodium_mg),
        }
    }

    /// Scale every nutrient linearly, rounding each to 1 decimal
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: round_to(self.calories * factor, 1),
            protein_g: round_to(self.protein_g * factor, 1),
            carbs_g: round_to(self.carbs_g * factor, 1),
            fat_g: round_to(self.fat_g * factor, 1),
            fiber_g: round_to(self.fiber_g * factor, 1),
            sugar_g: round_to(self.sugar_g * factor, 1),
            sodium_mg: round_to(self.sodium_mg * factor, 1),
        }
    }

    /// Round every field to 2 decimals (final meal totals)
    #[must_use]
    pub fn rounded_2dp(&self) -> Self {
        Self {
            calories: round_to(self.calories, 2),
            protein_g: round_to(self.protein_g, 2),
            carbs_g: round_to(self.carbs_g, 2),
            fat_g: round_to(self.fat_g, 2),
            fiber_g: round_to(self.fiber_g, 2),
            sugar_g: round_to(self.sugar_g, 2),
            sodium_mg: round_to(self.sodium_mg, 2),
        }
    }

    /// True when every field is 0.0
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Extract the first contiguous number from free text
///
/// Shared by lazy quantity parsing and the resolver's gram scaling.
#[must_use]
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let start = trimmed.find(|c: char| c.is_ascii_digit())?;
    let rest = &trimmed[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// One food item recognized from a meal photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedItem {
    /// Food name, e.g. "grilled chicken breast"
    pub name: String,
    /// Quantity as free text ("200", "1 cup"), parsed lazily
    pub quantity: String,
    /// Unit of the quantity
    pub unit: String,
    /// Preparation style ("grilled", "raw", ...)
    pub preparation: String,
    /// Recognition confidence for this item
    pub confidence: ConfidenceTier,
}

impl RecognizedItem {
    /// Create an item with the adapter's normalization defaults
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: "100".to_owned(),
            unit: "grams".to_owned(),
            preparation: "unknown".to_owned(),
            confidence: ConfidenceTier::Low,
        }
    }

    /// Parse the leading numeric portion of the free-text quantity
    ///
    /// "200" -> 200.0, "about 150g" -> 150.0, "a handful" -> None.
    #[must_use]
    pub fn parsed_quantity(&self) -> Option<f64> {
        parse_leading_number(&self.quantity)
    }

    /// True when the unit denotes grams
    #[must_use]
    pub fn unit_is_grams(&self) -> bool {
        matches!(
            self.unit.trim().to_lowercase().as_str(),
            "g" | "gram" | "grams"
        )
    }
}

/// A resolved nutrition lookup: facts plus provenance and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionLookupResult {
    /// Resolved facts (all-zero when the lookup failed)
    pub facts: NutritionFacts,
    /// Provenance: source URL, "estimated" (backup table), or "none"
    pub source: String,
    /// Confidence tier of the source
    pub confidence: ConfidenceTier,
    /// Whether the lookup produced genuine data
    pub success: bool,
}

impl NutritionLookupResult {
    /// A search-derived result with a concrete source URL
    #[must_use]
    pub fn from_search(facts: NutritionFacts, source_url: impl Into<String>, confidence: ConfidenceTier) -> Self {
        Self {
            facts,
            source: source_url.into(),
            confidence,
            success: true,
        }
    }

    /// A backup-table estimate
    #[must_use]
    pub fn estimated(facts: NutritionFacts) -> Self {
        Self {
            facts,
            source: "estimated".to_owned(),
            confidence: ConfidenceTier::Low,
            success: true,
        }
    }

    /// The all-zero failure placeholder
    #[must_use]
    pub fn unresolved() -> Self {
        Self {
            facts: NutritionFacts::zero(),
            source: "none".to_owned(),
            confidence: ConfidenceTier::Low,
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_from_mean_boundaries() {
        assert_eq!(ConfidenceTier::from_mean(3.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_mean(2.5), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_mean(2.49), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_mean(1.5), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_mean(1.49), ConfidenceTier::Low);
    }

    #[test]
    fn test_parse_lenient_degrades_to_low() {
        assert_eq!(ConfidenceTier::parse_lenient("HIGH"), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::parse_lenient("Medium"), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::parse_lenient("certain"), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::parse_lenient(""), ConfidenceTier::Low);
    }

    #[test]
    fn test_scaled_rounds_to_one_decimal() {
        let facts = NutritionFacts {
            calories: 165.0,
            protein_g: 31.0,
            fat_g: 3.6,
            ..NutritionFacts::zero()
        };
        let doubled = facts.scaled(2.0);
        assert!((doubled.calories - 330.0).abs() < f64::EPSILON);
        assert!((doubled.protein_g - 62.0).abs() < f64::EPSILON);
        assert!((doubled.fat_g - 7.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_ignores_non_finite() {
        let base = NutritionFacts {
            calories: 100.0,
            ..NutritionFacts::zero()
        };
        let bad = NutritionFacts {
            calories: f64::NAN,
            protein_g: f64::INFINITY,
            carbs_g: 5.0,
            ..NutritionFacts::zero()
        };
        let sum = base.add(&bad);
        assert!((sum.calories - 100.0).abs() < f64::EPSILON);
        assert!((sum.protein_g).abs() < f64::EPSILON);
        assert!((sum.carbs_g - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parsed_quantity() {
        let mut item = RecognizedItem::new("rice");
        item.quantity = "200".into();
        assert_eq!(item.parsed_quantity(), Some(200.0));

        item.quantity = "about 150.5g".into();
        assert_eq!(item.parsed_quantity(), Some(150.5));

        item.quantity = "a handful".into();
        assert_eq!(item.parsed_quantity(), None);
    }

    #[test]
    fn test_unit_is_grams() {
        let mut item = RecognizedItem::new("rice");
        assert!(item.unit_is_grams());
        item.unit = "G".into();
        assert!(item.unit_is_grams());
        item.unit = "cups".into();
        assert!(!item.unit_is_grams());
    }
}
