//! Text-completion backends.
//!
//! Defines the `CompletionBackend` trait and the Gemini implementation.

pub mod gemini;

use async_trait::async_trait;

use crate::types::BackendError;

/// Abstraction over a generative text backend.
///
/// Implementors send one prompt and return the generated text, reporting
/// every failure as a typed [`BackendError`]. They do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, BackendError>;
}
