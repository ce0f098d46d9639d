// ABOUTME: Pipeline step enum and the pure transition function between steps
// ABOUTME: Routing decisions depend only on observable state, never on side effects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use super::PipelineState;

/// Steps of the meal analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Send the photo to the vision provider and normalize items
    AnalyzePhoto,
    /// Resolve nutrition facts per item, strictly one at a time
    SearchNutrition,
    /// Aggregate per-item facts into meal totals
    CalculateTotals,
    /// Persist the completed meal (terminal)
    CreateMeal,
    /// Error recovery: best-effort partial persistence (terminal)
    HandleError,
}

impl PipelineStep {
    /// Step name for logging
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnalyzePhoto => "analyze_photo",
            Self::SearchNutrition => "search_nutrition",
            Self::CalculateTotals => "calculate_totals",
            Self::CreateMeal => "create_meal",
            Self::HandleError => "handle_error",
        }
    }
}

/// Pure transition function: which step runs after `current`?
///
/// `None` means the pipeline is done. Routing rules:
/// - `AnalyzePhoto`: a recorded error or zero recognized items routes to
///   `HandleError`; otherwise `SearchNutrition`.
/// - `SearchNutrition`: unconditionally `CalculateTotals` (per-item lookup
///   failures were absorbed locally).
/// - `CalculateTotals`: missing totals (internal error) routes to
///   `HandleError`; otherwise `CreateMeal`.
/// - `CreateMeal` and `HandleError` are terminal.
#[must_use]
pub fn next_step(current: PipelineStep, state: &PipelineState) -> Option<PipelineStep> {
    match current {
        PipelineStep::AnalyzePhoto => {
            if state.error.is_some() || state.recognized_items.is_empty() {
                Some(PipelineStep::HandleError)
            } else {
                Some(PipelineStep::SearchNutrition)
            }
        }
        PipelineStep::SearchNutrition => Some(PipelineStep::CalculateTotals),
        PipelineStep::CalculateTotals => {
            if state.totals.is_none() {
                Some(PipelineStep::HandleError)
            } else {
                Some(PipelineStep::CreateMeal)
            }
        }
        PipelineStep::CreateMeal | PipelineStep::HandleError => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NutritionFacts, RecognizedItem};
    use uuid::Uuid;

    fn empty_state() -> PipelineState {
        PipelineState::new(Uuid::new_v4(), Uuid::new_v4(), None, "snack")
    }

    #[test]
    fn test_analyze_routes_to_search_on_items() {
        let mut state = empty_state();
        state.recognized_items.push(RecognizedItem::new("rice"));
        assert_eq!(
            next_step(PipelineStep::AnalyzePhoto, &state),
            Some(PipelineStep::SearchNutrition)
        );
    }

    #[test]
    fn test_analyze_routes_to_error_on_zero_items() {
        let state = empty_state();
        assert_eq!(
            next_step(PipelineStep::AnalyzePhoto, &state),
            Some(PipelineStep::HandleError)
        );
    }

    #[test]
    fn test_analyze_routes_to_error_on_recorded_error() {
        let mut state = empty_state();
        state.recognized_items.push(RecognizedItem::new("rice"));
        state.error = Some("vision provider unreachable".into());
        assert_eq!(
            next_step(PipelineStep::AnalyzePhoto, &state),
            Some(PipelineStep::HandleError)
        );
    }

    #[test]
    fn test_search_is_unconditional() {
        let state = empty_state();
        assert_eq!(
            next_step(PipelineStep::SearchNutrition, &state),
            Some(PipelineStep::CalculateTotals)
        );
    }

    #[test]
    fn test_calculate_routes_on_totals_presence() {
        let mut state = empty_state();
        assert_eq!(
            next_step(PipelineStep::CalculateTotals, &state),
            Some(PipelineStep::HandleError)
        );
        state.totals = Some(NutritionFacts::zero());
        assert_eq!(
            next_step(PipelineStep::CalculateTotals, &state),
            Some(PipelineStep::CreateMeal)
        );
    }

    #[test]
    fn test_terminal_steps() {
        let state = empty_state();
        assert_eq!(next_step(PipelineStep::CreateMeal, &state), None);
        assert_eq!(next_step(PipelineStep::HandleError, &state), None);
    }
}
