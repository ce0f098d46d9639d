// ABOUTME: Regex-based nutrient extraction from search result page text
// ABOUTME: Fixed, ordered pattern lists per nutrient; first matching pattern wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Nutrient Extraction
//!
//! Extracts the seven tracked nutrients from lowercased page text using a
//! fixed, ordered list of patterns per nutrient. The order is part of the
//! contract: patterns are tried top to bottom and the first match wins, so
//! reordering silently changes extraction outcomes on ambiguous text. Tests
//! pin the order.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::NutritionFacts;

/// Nutrient keys as reported in [`Extraction::matched`]
pub const NUTRIENT_KEYS: [&str; 7] = [
    "calories", "protein", "carbs", "fat", "fiber", "sugar", "sodium",
];

/// Minimum distinct nutrients for an extraction to be considered usable
pub const MIN_NUTRIENTS_FOR_USABLE: usize = 3;

// Pattern priority order (top to bottom) is load-bearing; see module docs.
static CALORIE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d+(?:\.\d+)?)\s*(?:kcal|calories|cal)\b",
        r"calories[:\s]+(\d+(?:\.\d+)?)",
        r"energy[:\s]+(\d+(?:\.\d+)?)",
    ])
});

static PROTEIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"protein[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"(\d+(?:\.\d+)?)\s*g(?:rams)?\s+(?:of\s+)?protein\b",
    ])
});

static CARBS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"carbohydrates?[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"carbs[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"(\d+(?:\.\d+)?)\s*g(?:rams)?\s+(?:of\s+)?carb(?:ohydrate)?s?\b",
    ])
});

static FAT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"total\s+fat[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"fat[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"(\d+(?:\.\d+)?)\s*g(?:rams)?\s+(?:of\s+)?fat\b",
    ])
});

static FIBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:dietary\s+)?fib(?:er|re)[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"(\d+(?:\.\d+)?)\s*g(?:rams)?\s+(?:of\s+)?fib(?:er|re)\b",
    ])
});

static SUGAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"sugars?[:\s]+(\d+(?:\.\d+)?)\s*g\b",
        r"(\d+(?:\.\d+)?)\s*g(?:rams)?\s+(?:of\s+)?sugars?\b",
    ])
});

static SODIUM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"sodium[:\s]+(\d+(?:\.\d+)?)\s*mg\b",
        r"(\d+(?:\.\d+)?)\s*mg\s+(?:of\s+)?sodium\b",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Result of running extraction over one candidate page
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted facts; nutrients that did not match remain 0.0
    pub facts: NutritionFacts,
    /// Names of the nutrients that actually matched
    pub matched: BTreeSet<&'static str>,
}

impl Extraction {
    /// A candidate is usable only when enough distinct nutrients matched
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.matched.len() >= MIN_NUTRIENTS_FOR_USABLE
    }
}

/// Extract nutrition facts from candidate page text
///
/// The text is lowercased before matching. For each nutrient the patterns
/// are tried in priority order and the first capture wins.
#[must_use]
pub fn extract_nutrition_facts(text: &str) -> Extraction {
    let lowered = text.to_lowercase();
    let mut facts = NutritionFacts::zero();
    let mut matched = BTreeSet::new();

    if let Some(value) = first_capture(&CALORIE_PATTERNS, &lowered) {
        facts.calories = value;
        matched.insert("calories");
    }
    if let Some(value) = first_capture(&PROTEIN_PATTERNS, &lowered) {
        facts.protein_g = value;
        matched.insert("protein");
    }
    if let Some(value) = first_capture(&CARBS_PATTERNS, &lowered) {
        facts.carbs_g = value;
        matched.insert("carbs");
    }
    if let Some(value) = first_capture(&FAT_PATTERNS, &lowered) {
        facts.fat_g = value;
        matched.insert("fat");
    }
    if let Some(value) = first_capture(&FIBER_PATTERNS, &lowered) {
        facts.fiber_g = value;
        matched.insert("fiber");
    }
    if let Some(value) = first_capture(&SUGAR_PATTERNS, &lowered) {
        facts.sugar_g = value;
        matched.insert("sugar");
    }
    if let Some(value) = first_capture(&SODIUM_PATTERNS, &lowered) {
        facts.sodium_mg = value;
        matched.insert("sodium");
    }

    Extraction { facts, matched }
}

/// Run the ordered pattern list; first pattern with a parseable capture wins
fn first_capture(patterns: &[Regex], text: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(text) {
            if let Some(value) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile_in_order() {
        assert_eq!(CALORIE_PATTERNS.len(), 3);
        assert_eq!(PROTEIN_PATTERNS.len(), 2);
        assert_eq!(CARBS_PATTERNS.len(), 3);
        assert_eq!(FAT_PATTERNS.len(), 3);
        assert_eq!(FIBER_PATTERNS.len(), 2);
        assert_eq!(SUGAR_PATTERNS.len(), 2);
        assert_eq!(SODIUM_PATTERNS.len(), 2);
    }

    #[test]
    fn test_label_style_extraction() {
        let text = "Nutrition Facts per 100g: Calories: 165 kcal, Protein: 31 g, \
                    Total Fat: 3.6 g, Carbohydrates: 0 g, Sodium: 74 mg";
        let extraction = extract_nutrition_facts(text);
        assert!((extraction.facts.calories - 165.0).abs() < f64::EPSILON);
        assert!((extraction.facts.protein_g - 31.0).abs() < f64::EPSILON);
        assert!((extraction.facts.fat_g - 3.6).abs() < f64::EPSILON);
        assert!((extraction.facts.sodium_mg - 74.0).abs() < f64::EPSILON);
        assert!(extraction.is_usable());
    }

    #[test]
    fn test_prose_style_extraction() {
        let text = "One serving has 89 calories, 1.1 g of protein and 22.8 grams of carbs.";
        let extraction = extract_nutrition_facts(text);
        assert!((extraction.facts.calories - 89.0).abs() < f64::EPSILON);
        assert!((extraction.facts.protein_g - 1.1).abs() < f64::EPSILON);
        assert!((extraction.facts.carbs_g - 22.8).abs() < f64::EPSILON);
        assert_eq!(extraction.matched.len(), 3);
        assert!(extraction.is_usable());
    }

    // Pins the priority order: the value-first calorie pattern outranks the
    // label-style pattern when both could match.
    #[test]
    fn test_calorie_pattern_priority_order() {
        let text = "130 kcal per serving. calories: 999";
        let extraction = extract_nutrition_facts(text);
        assert!((extraction.facts.calories - 130.0).abs() < f64::EPSILON);
    }

    // Pins "total fat" outranking the bare "fat" label.
    #[test]
    fn test_fat_pattern_priority_order() {
        let text = "saturated fat: 1.2 g ... total fat: 3.6 g";
        let extraction = extract_nutrition_facts(text);
        assert!((extraction.facts.fat_g - 3.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_two_nutrients_not_usable() {
        let text = "Calories: 52. Protein: 0.3 g.";
        let extraction = extract_nutrition_facts(text);
        assert_eq!(extraction.matched.len(), 2);
        assert!(!extraction.is_usable());
    }

    #[test]
    fn test_no_match_is_empty() {
        let extraction = extract_nutrition_facts("a page about garden furniture");
        assert!(extraction.matched.is_empty());
        assert!(extraction.facts.is_zero());
    }

    #[test]
    fn test_case_insensitive_via_lowering() {
        let text = "CALORIES: 240 KCAL, PROTEIN: 12 G, FAT: 9 G";
        let extraction = extract_nutrition_facts(text);
        assert!(extraction.is_usable());
    }
}
