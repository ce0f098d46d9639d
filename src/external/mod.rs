// ABOUTME: Clients for external services consumed by the pipeline
// ABOUTME: Currently the web search capability used for nutrition fact lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

/// Web search client for locating nutrition-fact sources
pub mod search;

pub use search::{MockSearchClient, SearchHit, SearchProvider, WebSearchClient, WebSearchConfig};
