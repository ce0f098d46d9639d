// ABOUTME: Environment-based configuration for the meal analysis pipeline
// ABOUTME: Vision provider, search provider, database, and cache settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Pipeline Configuration
//!
//! Environment-only configuration, loaded once at startup. Every knob has a
//! sensible default except the external API keys, which stay `None` when
//! unset so the pipeline can degrade (search disabled, backup table only).

use crate::errors::{AppError, AppResult, ErrorCode};
use std::env;

/// Vision (image understanding) provider configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// API key for the vision provider (`GEMINI_API_KEY`)
    pub api_key: Option<String>,
    /// Model identifier (`MEALSNAP_VISION_MODEL`)
    pub model: String,
    /// Request timeout in seconds (`MEALSNAP_VISION_TIMEOUT_SECS`)
    pub timeout_secs: u64,
}

/// Web search provider configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Master switch (`MEALSNAP_SEARCH_ENABLED`, default true)
    pub enabled: bool,
    /// API key for the search provider (`SEARCH_API_KEY`)
    pub api_key: Option<String>,
    /// Search API endpoint (`MEALSNAP_SEARCH_URL`)
    pub base_url: String,
    /// Number of candidates requested per query (`MEALSNAP_SEARCH_MAX_RESULTS`)
    pub max_results: u32,
    /// Request timeout in seconds (`MEALSNAP_SEARCH_TIMEOUT_SECS`)
    pub timeout_secs: u64,
}

impl SearchConfig {
    /// Search is usable only when enabled and an API key is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (`DATABASE_URL`, default in-memory SQLite)
    pub url: String,
}

/// Nutrition cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached lookups (`MEALSNAP_CACHE_MAX_ENTRIES`)
    pub max_entries: usize,
}

/// Top-level pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub vision: VisionConfig,
    pub search: SearchConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ErrorCode::ConfigInvalid`-class errors when a numeric
    /// variable is present but unparseable.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            vision: VisionConfig {
                api_key: env_var_opt("GEMINI_API_KEY"),
                model: env_var_or("MEALSNAP_VISION_MODEL", "gemini-2.5-flash"),
                timeout_secs: env_var_parsed("MEALSNAP_VISION_TIMEOUT_SECS", 30)?,
            },
            search: SearchConfig {
                enabled: env_var_or("MEALSNAP_SEARCH_ENABLED", "true") != "false",
                api_key: env_var_opt("SEARCH_API_KEY"),
                base_url: env_var_or("MEALSNAP_SEARCH_URL", "https://api.tavily.com/search"),
                max_results: env_var_parsed("MEALSNAP_SEARCH_MAX_RESULTS", 5)?,
                timeout_secs: env_var_parsed("MEALSNAP_SEARCH_TIMEOUT_SECS", 15)?,
            },
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite::memory:"),
            },
            cache: CacheConfig {
                max_entries: env_var_parsed("MEALSNAP_CACHE_MAX_ENTRIES", 10_000)?,
            },
        })
    }

    /// Require the vision API key, for deployments where recognition is mandatory
    ///
    /// # Errors
    ///
    /// Returns `ErrorCode::ConfigMissing` when `GEMINI_API_KEY` is not set.
    pub fn require_vision_key(&self) -> AppResult<&str> {
        self.vision.api_key.as_deref().ok_or_else(|| {
            AppError::new(ErrorCode::ConfigMissing, "GEMINI_API_KEY is not set")
        })
    }
}

/// Read an environment variable, falling back to a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Read an optional environment variable, treating empty values as unset
fn env_var_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read and parse a numeric environment variable
fn env_var_parsed<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
