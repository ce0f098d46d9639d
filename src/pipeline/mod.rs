// ABOUTME: Pipeline orchestrator - sequences recognition, resolution, aggregation, persistence
// ABOUTME: Catches every step-boundary error; the caller always receives a structured response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Meal Analysis Pipeline
//!
//! One pipeline instance analyzes one photo, as a single async task:
//!
//! ```text
//! AnalyzePhoto ──► SearchNutrition ──► CalculateTotals ──► CreateMeal
//!      │                                      │
//!      └──────────────► HandleError ◄─────────┘
//! ```
//!
//! Items are resolved strictly one at a time, bounding outbound calls to
//! one in flight per instance. Any error at a step boundary is recorded on
//! the run state and routed to `HandleError`, which persists a failed meal
//! for review when anything was recognized; that write is best-effort and
//! partial results are never silently dropped, even when it fails too.
//! Multiple instances may run concurrently; the nutrition cache is the
//! only shared state.

mod step;

pub use step::{next_step, PipelineStep};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::llm::ImagePayload;
use crate::models::{ConfidenceTier, NutritionFacts, NutritionLookupResult, RecognizedItem};
use crate::nutrition::{aggregate_totals, NutritionResolver};
use crate::recognition::RecognitionAdapter;
use crate::store::{MealStore, NewMeal};

/// Upstream trigger: one photo to analyze
#[derive(Debug, Clone)]
pub struct MealAnalysisRequest {
    /// Owning user
    pub user_id: Uuid,
    /// Destination day for the resulting meal record
    pub day_id: Uuid,
    /// Reference to the photo, persisted with the meal
    pub photo_ref: Option<String>,
    /// The photo payload sent to the vision provider
    pub photo: ImagePayload,
    /// Meal category; defaults to "snack"
    pub category: Option<String>,
}

/// Pipeline state threaded through the run
///
/// Created per invocation, consumed and returned anew by each step, and
/// discarded once the response is produced. On completion exactly one of
/// {success, documented failure} holds.
#[derive(Debug)]
pub struct PipelineState {
    pub user_id: Uuid,
    pub day_id: Uuid,
    pub photo_ref: Option<String>,
    pub category: String,
    /// Items recognized from the photo
    pub recognized_items: Vec<RecognizedItem>,
    /// Per-item resolved nutrition, parallel to `recognized_items`
    pub nutrition_entries: Vec<NutritionLookupResult>,
    /// Names of items whose lookup failed and degraded to placeholders
    pub fallback_needed: Vec<String>,
    /// Aggregated totals; `None` until calculated
    pub totals: Option<NutritionFacts>,
    /// Destination record id once persisted
    pub meal_id: Option<Uuid>,
    /// Terminal success flag
    pub success: bool,
    /// First error recorded at a step boundary
    pub error: Option<String>,
    /// Overall recognition confidence
    pub confidence: ConfidenceTier,
}

impl PipelineState {
    /// Fresh state for one run
    #[must_use]
    pub fn new(user_id: Uuid, day_id: Uuid, photo_ref: Option<String>, category: &str) -> Self {
        Self {
            user_id,
            day_id,
            photo_ref,
            category: category.to_owned(),
            recognized_items: Vec::new(),
            nutrition_entries: Vec::new(),
            fallback_needed: Vec::new(),
            totals: None,
            meal_id: None,
            success: false,
            error: None,
            confidence: ConfidenceTier::Low,
        }
    }
}

/// Partial results preserved for manual completion when a run fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialResults {
    /// Items recognized before the failure
    pub recognized_items: Vec<RecognizedItem>,
    /// Nutrition entries gathered so far
    pub nutrition_entries: Vec<NutritionLookupResult>,
    /// Items still needing a manual lookup
    pub fallback_needed: Vec<String>,
    /// Overall recognition confidence
    pub confidence: ConfidenceTier,
}

/// Structured result returned to the caller; never an unhandled fault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAnalysisResponse {
    /// Whether the run completed and persisted a meal
    pub success: bool,
    /// Destination record id; absent when no record was persisted,
    /// including when the best-effort error-path write was lost
    pub meal_id: Option<Uuid>,
    /// Documented failure, when `success` is false
    pub error: Option<String>,
    /// Inspectable partial results; populated whenever any item was
    /// recognized before a failure
    pub partial_results: Option<PartialResults>,
    /// Overall recognition confidence
    pub confidence: ConfidenceTier,
    /// Recognized items
    pub recognized_items: Vec<RecognizedItem>,
    /// Resolved nutrition entries
    pub nutrition_entries: Vec<NutritionLookupResult>,
}

/// Meal analysis pipeline orchestrator
pub struct MealPipeline {
    recognition: RecognitionAdapter,
    resolver: NutritionResolver,
    store: MealStore,
}

impl MealPipeline {
    /// Assemble a pipeline from its three collaborators
    #[must_use]
    pub fn new(
        recognition: RecognitionAdapter,
        resolver: NutritionResolver,
        store: MealStore,
    ) -> Self {
        Self {
            recognition,
            resolver,
            store,
        }
    }

    /// Run the pipeline for one photo
    ///
    /// Never returns an error: every failure is captured in the response.
    pub async fn run(&self, request: MealAnalysisRequest) -> MealAnalysisResponse {
        let category = request.category.as_deref().unwrap_or("snack");
        let mut state = PipelineState::new(
            request.user_id,
            request.day_id,
            request.photo_ref.clone(),
            category,
        );

        // Each step consumes the state and returns it anew; steps never
        // share a mutable reference.
        let mut current = PipelineStep::AnalyzePhoto;
        loop {
            info!(step = current.as_str(), user_id = %state.user_id, "pipeline step");
            state = match current {
                PipelineStep::AnalyzePhoto => self.analyze_photo(state, &request.photo).await,
                PipelineStep::SearchNutrition => self.search_nutrition(state).await,
                PipelineStep::CalculateTotals => calculate_totals(state),
                PipelineStep::CreateMeal => self.create_meal(state).await,
                PipelineStep::HandleError => self.handle_error(state).await,
            };

            match next_step(current, &state) {
                Some(next) => current = next,
                None => break,
            }
        }

        into_response(state)
    }

    /// Step 1: recognize food items from the photo
    async fn analyze_photo(
        &self,
        mut state: PipelineState,
        photo: &ImagePayload,
    ) -> PipelineState {
        match self.recognition.analyze_photo(photo).await {
            Ok(outcome) => {
                state.confidence = outcome.confidence;
                state.recognized_items = outcome.items;
                if !outcome.success {
                    state.error = outcome.error;
                }
            }
            Err(e) => {
                // Transport failure: no items to preserve
                state.error = Some(format!("photo recognition failed: {e}"));
            }
        }
        state
    }

    /// Step 2: resolve nutrition per item, strictly serially
    ///
    /// Lookup failures degrade to zero-valued placeholders recorded in the
    /// fallback-needed list; they never abort the run.
    async fn search_nutrition(&self, mut state: PipelineState) -> PipelineState {
        for item in &state.recognized_items {
            let entry = self.resolver.resolve_item(item).await;
            if !entry.success {
                state.fallback_needed.push(item.name.clone());
            }
            state.nutrition_entries.push(entry);
        }
        state
    }

    /// Step 4: transactional success-path persistence (terminal)
    async fn create_meal(&self, mut state: PipelineState) -> PipelineState {
        let totals = state.totals.unwrap_or_else(NutritionFacts::zero);
        let new_meal = NewMeal {
            user_id: state.user_id,
            day_id: state.day_id,
            category: &state.category,
            photo_ref: state.photo_ref.as_deref(),
            totals,
            confidence: state.confidence,
            recognized_items: &state.recognized_items,
            entries: &state.nutrition_entries,
            fallback_needed: &state.fallback_needed,
        };

        match self.store.create_completed_meal(&new_meal).await {
            Ok(meal_id) => {
                state.meal_id = Some(meal_id);
                state.success = true;
            }
            Err(e) => {
                // The transaction already rolled back; report directly
                // without a second write attempt.
                state.error = Some(format!("meal persistence failed: {e}"));
                state.success = false;
            }
        }
        state
    }

    /// Terminal error recovery: best-effort partial persistence
    async fn handle_error(&self, mut state: PipelineState) -> PipelineState {
        state.success = false;
        if state.error.is_none() {
            state.error = Some("no food items were recognized".to_owned());
        }

        if state.recognized_items.is_empty() {
            return state;
        }

        let error = state.error.clone().unwrap_or_default();
        let totals = aggregate_totals(&state.nutrition_entries);
        let new_meal = NewMeal {
            user_id: state.user_id,
            day_id: state.day_id,
            category: &state.category,
            photo_ref: state.photo_ref.as_deref(),
            totals,
            confidence: state.confidence,
            recognized_items: &state.recognized_items,
            entries: &state.nutrition_entries,
            fallback_needed: &state.fallback_needed,
        };

        // A lost write here is swallowed; partial results stay in memory
        match self.store.create_failed_meal(&new_meal, &error).await {
            Some(meal_id) => state.meal_id = Some(meal_id),
            None => warn!("failed meal could not be persisted; returning partial results only"),
        }
        state
    }
}

/// Step 3: aggregate totals (no side effects)
fn calculate_totals(mut state: PipelineState) -> PipelineState {
    // Entries are produced 1:1 from items; a mismatch means the run state
    // was corrupted and the totals cannot be trusted.
    if state.nutrition_entries.len() != state.recognized_items.len() {
        state.error = Some(format!(
            "aggregation failed: {} entries for {} items",
            state.nutrition_entries.len(),
            state.recognized_items.len()
        ));
        return state;
    }
    state.totals = Some(aggregate_totals(&state.nutrition_entries));
    state
}

/// Produce the caller-facing response, preserving partial results on failure
fn into_response(state: PipelineState) -> MealAnalysisResponse {
    let partial_results = if !state.success && !state.recognized_items.is_empty() {
        Some(PartialResults {
            recognized_items: state.recognized_items.clone(),
            nutrition_entries: state.nutrition_entries.clone(),
            fallback_needed: state.fallback_needed.clone(),
            confidence: state.confidence,
        })
    } else {
        None
    };

    MealAnalysisResponse {
        success: state.success,
        meal_id: state.meal_id,
        error: state.error,
        partial_results,
        confidence: state.confidence,
        recognized_items: state.recognized_items,
        nutrition_entries: state.nutrition_entries,
    }
}

/// Convenience assembly from configuration: Gemini vision, web search when
/// configured, in-memory cache, SQLite-backed store
///
/// # Errors
///
/// Returns an error when the vision API key is missing or an HTTP client
/// cannot be constructed.
pub fn build_pipeline(
    config: &crate::config::PipelineConfig,
    database: std::sync::Arc<crate::database::Database>,
) -> AppResult<MealPipeline> {
    use std::sync::Arc;

    use crate::cache::InMemoryNutritionCache;
    use crate::external::{SearchProvider, WebSearchClient, WebSearchConfig};
    use crate::llm::GeminiVisionProvider;

    let api_key = config.require_vision_key()?;
    let vision = GeminiVisionProvider::with_timeout(
        api_key,
        std::time::Duration::from_secs(config.vision.timeout_secs),
    )?
    .with_default_model(config.vision.model.clone());

    let search: Option<Arc<dyn SearchProvider>> = if config.search.is_configured() {
        WebSearchConfig::from_pipeline_config(&config.search)
            .map(WebSearchClient::new)
            .transpose()?
            .map(|client| Arc::new(client) as Arc<dyn SearchProvider>)
    } else {
        None
    };

    let cache = Arc::new(InMemoryNutritionCache::with_max_entries(
        config.cache.max_entries,
    ));

    Ok(MealPipeline::new(
        RecognitionAdapter::new(Arc::new(vision)),
        NutritionResolver::new(search, cache, config.search.max_results),
        MealStore::new(database),
    ))
}
