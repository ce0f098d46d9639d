// ABOUTME: Recognition adapter - turns a meal photo into normalized food items
// ABOUTME: Sends the photo to a vision provider and parses its JSON reply, tolerating fences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Recognition Adapter
//!
//! Sends a photo to the configured vision provider with a fixed instruction
//! and normalizes the reply into [`RecognizedItem`]s. Malformed entries are
//! dropped, not propagated; a reply that is not list-shaped (or is empty
//! after filtering) yields a failure outcome carrying one synthetic
//! "Unidentified food" placeholder so downstream consumers that need a
//! non-empty list still get one. The adapter has no persistence side
//! effects.
//!
//! Transport-level provider failures surface as `Err`; content-level
//! failures (unparseable reply) surface as `Ok` with `success == false`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::llm::{ImagePayload, VisionProvider, VisionRequest};
use crate::models::{ConfidenceTier, RecognizedItem};

/// Fixed instruction sent with every photo
const RECOGNITION_PROMPT: &str = "\
Analyze this meal photo and identify every distinct food item visible. \
Respond with ONLY a JSON array, one object per item, using exactly these fields: \
\"name\" (specific food name), \
\"quantity\" (estimated amount as a string, in grams), \
\"unit\" (\"grams\"), \
\"preparation\" (cooking style such as \"grilled\" or \"raw\", or \"unknown\"), \
\"confidence\" (\"high\", \"medium\", or \"low\"). \
Do not include any text outside the JSON array.";

/// Name used for the synthetic placeholder when recognition yields nothing usable
const UNIDENTIFIED_FOOD: &str = "Unidentified food";

/// Result of analyzing one photo
#[derive(Debug, Clone)]
pub struct RecognitionOutcome {
    /// Whether usable items were recognized
    pub success: bool,
    /// Normalized items (a single placeholder on content-level failure)
    pub items: Vec<RecognizedItem>,
    /// Overall confidence: mean of per-item tiers
    pub confidence: ConfidenceTier,
    /// Error description on failure
    pub error: Option<String>,
}

/// Recognition adapter over an injected vision provider
pub struct RecognitionAdapter {
    provider: Arc<dyn VisionProvider>,
}

impl RecognitionAdapter {
    /// Create an adapter over the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Analyze a meal photo
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level provider failures (network,
    /// HTTP, provider-side errors). An unusable reply is an `Ok` outcome
    /// with `success == false` and a placeholder item.
    pub async fn analyze_photo(&self, image: &ImagePayload) -> AppResult<RecognitionOutcome> {
        let request = VisionRequest::new(RECOGNITION_PROMPT, image.clone()).with_temperature(0.2);
        let response = self.provider.analyze_image(&request).await?;

        debug!(
            provider = self.provider.name(),
            reply_len = response.content.len(),
            "vision provider replied"
        );

        Ok(parse_outcome(&response.content))
    }
}

/// Parse and normalize the provider's free-form reply
fn parse_outcome(content: &str) -> RecognitionOutcome {
    let stripped = strip_code_fences(content);

    let parsed: Value = match serde_json::from_str(stripped) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "recognition reply was not valid JSON");
            return failure_outcome(format!("recognition reply was not valid JSON: {e}"));
        }
    };

    let Some(entries) = parsed.as_array() else {
        return failure_outcome("recognition reply was not a JSON array");
    };

    let items: Vec<RecognizedItem> = entries.iter().filter_map(normalize_entry).collect();

    if items.is_empty() {
        return failure_outcome("recognition reply contained no usable food items");
    }

    let confidence = overall_confidence(&items);
    RecognitionOutcome {
        success: true,
        items,
        confidence,
        error: None,
    }
}

fn failure_outcome(error: impl Into<String>) -> RecognitionOutcome {
    RecognitionOutcome {
        success: false,
        items: vec![RecognizedItem::new(UNIDENTIFIED_FOOD)],
        confidence: ConfidenceTier::Low,
        error: Some(error.into()),
    }
}

/// Strip surrounding markdown code fence markers, if present
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}

/// Normalize one raw entry; malformed entries map to None and are dropped
fn normalize_entry(value: &Value) -> Option<RecognizedItem> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let quantity = match obj.get("quantity") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "100".to_owned(),
    };

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("grams")
        .to_owned();

    let preparation = obj
        .get("preparation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_owned();

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_str)
        .map_or(ConfidenceTier::Low, ConfidenceTier::parse_lenient);

    Some(RecognizedItem {
        name: name.to_owned(),
        quantity,
        unit,
        preparation,
        confidence,
    })
}

/// Overall confidence: mean of per-item tier weights
#[allow(clippy::cast_precision_loss)]
fn overall_confidence(items: &[RecognizedItem]) -> ConfidenceTier {
    if items.is_empty() {
        return ConfidenceTier::Low;
    }
    let sum: f64 = items.iter().map(|i| i.confidence.weight()).sum();
    ConfidenceTier::from_mean(sum / items.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  ```json\n[1]\n```  "), "[1]");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n[{\"name\": \"rice\", \"quantity\": \"200\", \"unit\": \"grams\", \"preparation\": \"steamed\", \"confidence\": \"high\"}]\n```";
        let outcome = parse_outcome(reply);
        assert!(outcome.success);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].name, "rice");
        assert_eq!(outcome.confidence, ConfidenceTier::High);
    }

    #[test]
    fn test_defaults_applied() {
        let reply = "[{\"name\": \"banana\"}]";
        let outcome = parse_outcome(reply);
        let item = &outcome.items[0];
        assert_eq!(item.quantity, "100");
        assert_eq!(item.unit, "grams");
        assert_eq!(item.preparation, "unknown");
        assert_eq!(item.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn test_numeric_quantity_becomes_string() {
        let reply = "[{\"name\": \"rice\", \"quantity\": 200}]";
        let outcome = parse_outcome(reply);
        assert_eq!(outcome.items[0].quantity, "200");
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let reply = "[{\"name\": \"rice\"}, {\"quantity\": \"50\"}, 17, {\"name\": \"  \"}]";
        let outcome = parse_outcome(reply);
        assert!(outcome.success);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].name, "rice");
    }

    #[test]
    fn test_non_array_reply_fails_with_placeholder() {
        let outcome = parse_outcome("{\"name\": \"rice\"}");
        assert!(!outcome.success);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].name, UNIDENTIFIED_FOOD);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_empty_after_filtering_fails() {
        let outcome = parse_outcome("[{\"quantity\": \"50\"}]");
        assert!(!outcome.success);
        assert_eq!(outcome.items[0].name, UNIDENTIFIED_FOOD);
    }

    #[test]
    fn test_overall_confidence_mean() {
        let reply = "[{\"name\": \"a\", \"confidence\": \"high\"}, {\"name\": \"b\", \"confidence\": \"high\"}, {\"name\": \"c\", \"confidence\": \"medium\"}]";
        let outcome = parse_outcome(reply);
        // mean weight = (3+3+2)/3 = 2.67 -> high
        assert_eq!(outcome.confidence, ConfidenceTier::High);

        let reply = "[{\"name\": \"a\", \"confidence\": \"high\"}, {\"name\": \"b\", \"confidence\": \"low\"}]";
        let outcome = parse_outcome(reply);
        // mean weight = 2.0 -> medium
        assert_eq!(outcome.confidence, ConfidenceTier::Medium);
    }
}
