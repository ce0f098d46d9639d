// ABOUTME: Mock vision provider for tests - canned responses, no network calls
// ABOUTME: Records call counts so tests can assert on outbound request behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{VisionCapabilities, VisionProvider, VisionRequest, VisionResponse};
use crate::errors::{AppError, AppResult};

/// Mock vision provider returning a canned response or a canned error
pub struct MockVisionProvider {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// A mock that always succeeds with the given response text
    #[must_use]
    pub fn succeeding(content: impl Into<String>) -> Self {
        Self {
            response: Ok(content.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock that always fails with the given error message
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `analyze_image` calls made against this mock
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock Vision Provider"
    }

    fn capabilities(&self) -> VisionCapabilities {
        VisionCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        "mock-vision-1"
    }

    async fn analyze_image(&self, _request: &VisionRequest) -> AppResult<VisionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(content) => Ok(VisionResponse {
                content: content.clone(),
                model: "mock-vision-1".to_owned(),
                usage: None,
            }),
            Err(message) => Err(AppError::external_service("mock vision", message.clone())),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.response.is_ok())
    }
}
