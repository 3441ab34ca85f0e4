//! Mock completion backend for integration testing.
//!
//! Provides a deterministic `CompletionBackend` that echoes a canned reply,
//! records every prompt it receives, and can be told to fail.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use estate_advisor::llm::CompletionBackend;
use estate_advisor::types::BackendError;

/// A call the backend received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub temperature: f32,
}

/// In-memory backend. Clones share the same call log and error switch.
#[derive(Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// If set, every call fails with this error.
    force_error: Arc<Mutex<Option<BackendError>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force all subsequent calls to fail.
    pub fn set_error(&self, err: BackendError) {
        *self.force_error.lock().unwrap() = Some(err);
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, BackendError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                temperature,
            });
            calls.len()
        };

        if let Some(err) = self.force_error.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(format!("mock response #{n} (t={temperature})"))
    }
}
