//! Mock backend for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::TextCompletion;

/// Scripted `TextCompletion` implementation.
///
/// Returns queued responses in order, then falls back to the default
/// response. Also records every prompt it receives for assertion.
pub struct MockBackend {
    default_response: Result<String, String>,
    queued: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            default_response: Ok(response.into()),
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            default_response: Err(error.into()),
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot response ahead of the default.
    pub fn enqueue(&self, response: Result<String, String>) {
        self.queued.lock().unwrap().push_back(response);
    }

    /// Prompts seen so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for MockBackend {
    async fn complete(&self, prompt: &str) -> DomainResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());
        response.map_err(DomainError::BackendError)
    }
}
