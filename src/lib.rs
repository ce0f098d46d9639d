// ABOUTME: Main library entry point for the mealsnap meal photo analysis pipeline
// ABOUTME: Recognizes foods from photos, resolves nutrition facts, and persists meal records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

#![deny(unsafe_code)]

//! # Mealsnap
//!
//! A meal photo analysis pipeline: ingest a photo of a meal and produce a
//! structured nutrition record. The pipeline identifies food items via an
//! external vision model, resolves nutrition facts for each item (cache,
//! web search with regex extraction, static backup table), aggregates meal
//! totals, and persists a reviewable record — degrading gracefully to a
//! partial, flagged record when any stage cannot complete fully.
//!
//! ## Architecture
//!
//! - **Pipeline**: finite-state orchestrator with an explicit step enum
//!   and a pure transition function
//! - **Recognition**: adapter over a pluggable vision provider
//! - **Nutrition**: tiered resolver with confidence scoring
//! - **Store**: transactional meal persistence with a best-effort
//!   error-recovery path
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mealsnap::config::PipelineConfig;
//! use mealsnap::database::Database;
//! use mealsnap::llm::ImagePayload;
//! use mealsnap::pipeline::{build_pipeline, MealAnalysisRequest};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::from_env()?;
//!     let database = Arc::new(Database::new(&config.database.url).await?);
//!     let pipeline = build_pipeline(&config, database)?;
//!
//!     let photo = std::fs::read("meal.jpg")?;
//!     let response = pipeline
//!         .run(MealAnalysisRequest {
//!             user_id: Uuid::new_v4(),
//!             day_id: Uuid::new_v4(),
//!             photo_ref: Some("meal.jpg".to_owned()),
//!             photo: ImagePayload::jpeg(photo),
//!             category: None,
//!         })
//!         .await;
//!
//!     println!("success: {}, meal id: {:?}", response.success, response.meal_id);
//!     Ok(())
//! }
//! ```

/// Nutrition lookup cache abstraction and implementations
pub mod cache;

/// Environment-based pipeline configuration
pub mod config;

/// Database connection management and schema
pub mod database;

/// Unified error handling
pub mod errors;

/// Clients for external services (web search)
pub mod external;

/// Vision provider abstraction and implementations
pub mod llm;

/// Logging configuration and setup
pub mod logging;

/// Shared domain models
pub mod models;

/// Nutrition resolution, extraction, and aggregation
pub mod nutrition;

/// Meal analysis pipeline orchestrator
pub mod pipeline;

/// Photo-to-items recognition adapter
pub mod recognition;

/// Meal persistence gateway
pub mod store;
