//! Request dispatcher.
//!
//! Sends prompts to the completion backend behind a ten-minute response
//! cache. Failures stay typed inside (`try_dispatch`) and collapse to a
//! fixed apology only at the public `dispatch` boundary, so the caller
//! always receives text. There is no retry and no key rotation: a
//! rate-limited session needs a restart to draw a different key.

use chrono::Duration;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{Cache, TtlCache};
use crate::llm::CompletionBackend;
use crate::types::{BackendError, PromptKey, PromptRequest};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Backend responses are cached for ten minutes.
pub const RESPONSE_CACHE_TTL_MINS: i64 = 10;

/// Sampling temperature for full plan generation.
pub const PLAN_TEMPERATURE: f32 = 0.4;

/// Sampling temperature for follow-up questions.
pub const FOLLOWUP_TEMPERATURE: f32 = 0.5;

/// Returned in place of any backend failure.
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't process your request. This may be \
    due to a rate limit on the selected API key. Please retry later, or restart the \
    service to use a different key.";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Counters {
    backend_calls: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time dispatcher counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub backend_calls: u64,
    pub cache_hits: u64,
    pub failures: u64,
}

impl DispatchStats {
    /// Cache hit rate as a fraction (0.0 to 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.backend_calls + self.cache_hits;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    backend: Arc<dyn CompletionBackend>,
    cache: Arc<dyn Cache<PromptKey, String>>,
    counters: Counters,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        cache: Arc<dyn Cache<PromptKey, String>>,
    ) -> Self {
        Self {
            backend,
            cache,
            counters: Counters::default(),
        }
    }

    /// Dispatcher with the standard ten-minute wall-clock cache.
    pub fn with_default_cache(backend: Arc<dyn CompletionBackend>) -> Self {
        let cache: TtlCache<PromptKey, String> =
            TtlCache::with_system_clock(Duration::minutes(RESPONSE_CACHE_TTL_MINS));
        Self::new(backend, Arc::new(cache))
    }

    /// Cache-first dispatch that reports why a backend call failed.
    ///
    /// Only successful responses are cached.
    pub async fn try_dispatch(&self, request: &PromptRequest) -> Result<String, BackendError> {
        let key = request.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(
                temperature = request.temperature,
                prompt_len = request.text.len(),
                "Response cache hit"
            );
            return Ok(cached);
        }

        self.counters.backend_calls.fetch_add(1, Ordering::Relaxed);
        let text = self
            .backend
            .generate(&request.text, request.temperature)
            .await
            .inspect_err(|_| {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
            })?;

        info!(
            temperature = request.temperature,
            response_len = text.len(),
            "Backend response received"
        );
        self.cache.put(key, text.clone());
        Ok(text)
    }

    /// Dispatch a prompt. Never fails: backend errors become
    /// [`FALLBACK_RESPONSE`].
    pub async fn dispatch(&self, request: &PromptRequest) -> String {
        match self.try_dispatch(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Backend request failed, returning fallback response");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            backend_calls: self.counters.backend_calls.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
