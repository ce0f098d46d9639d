// ABOUTME: Vision provider abstraction layer for pluggable image-understanding models
// ABOUTME: Defines the contract providers must implement to serve the recognition adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! # Vision Provider Service Provider Interface
//!
//! This module defines the contract that image-understanding providers must
//! implement to integrate with the meal recognition adapter.
//!
//! ## Key Concepts
//!
//! - **`VisionCapabilities`**: Bitflags describing provider features
//! - **`VisionProvider`**: Async trait for image analysis
//! - **`VisionRequest`**: Image payload plus instruction text
//!
//! ## Example
//!
//! ```rust,no_run
//! use mealsnap::llm::{VisionProvider, VisionRequest, ImagePayload};
//!
//! async fn example(provider: &dyn VisionProvider, photo: Vec<u8>) {
//!     let request = VisionRequest::new(
//!         "List the foods in this photo.",
//!         ImagePayload::jpeg(photo),
//!     );
//!     let response = provider.analyze_image(&request).await;
//! }
//! ```

mod gemini;
mod mock;

pub use gemini::GeminiVisionProvider;
pub use mock::MockVisionProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

bitflags::bitflags! {
    /// Vision provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VisionCapabilities: u8 {
        /// Provider accepts image input
        const VISION = 0b0000_0001;
        /// Provider supports JSON mode output
        const JSON_MODE = 0b0000_0010;
        /// Provider supports system-level instruction text
        const SYSTEM_INSTRUCTIONS = 0b0000_0100;
    }
}

impl VisionCapabilities {
    /// Capabilities of a full-featured multimodal provider
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::VISION
            .union(Self::JSON_MODE)
            .union(Self::SYSTEM_INSTRUCTIONS)
    }

    /// Check if image input is supported
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }
}

/// An image payload sent to a vision provider
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// MIME type, e.g. "image/jpeg"
    pub mime_type: String,
    /// Raw image bytes (encoded per provider requirements at call time)
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Create a JPEG payload
    #[must_use]
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg".to_owned(),
            data,
        }
    }

    /// Create a PNG payload
    #[must_use]
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_owned(),
            data,
        }
    }
}

/// Configuration for an image analysis request
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Instruction text accompanying the image
    pub instruction: String,
    /// The image to analyze
    pub image: ImagePayload,
    /// Model identifier (provider-specific, None = provider default)
    pub model: Option<String>,
    /// Temperature for response randomness
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl VisionRequest {
    /// Create a new request with an instruction and image
    #[must_use]
    pub fn new(instruction: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            instruction: instruction.into(),
            image,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from an image analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionResponse {
    /// Generated free-form text
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics, when the provider reports them
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// Vision provider trait for image analysis
///
/// Implement this trait to add a new image-understanding provider. The
/// design follows the async trait pattern for compatibility with the
/// tokio runtime; each provider owns its own HTTP timeout.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Unique provider identifier (e.g. "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> VisionCapabilities;

    /// Default model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Analyze an image and return free-form text
    async fn analyze_image(&self, request: &VisionRequest) -> AppResult<VisionResponse>;

    /// Check that the provider is reachable and the API key is valid
    async fn health_check(&self) -> AppResult<bool>;
}
