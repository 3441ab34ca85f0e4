//! Advisor facade.
//!
//! The three operations a client drives: show a market snapshot, generate
//! a plan, answer a follow-up. Each is one synchronous chain
//! (synthesize → prompt → dispatch). Only input validation errors reach
//! the caller; backend failures arrive as the dispatcher's fallback text.

use tracing::{info, warn};
use uuid::Uuid;

use crate::data::MarketSynthesizer;
use crate::engine::dispatcher::{Dispatcher, DispatchStats, FOLLOWUP_TEMPERATURE, PLAN_TEMPERATURE};
use crate::prompt::PromptBuilder;
use crate::types::{AdvisorError, MarketTable, Profile, PromptRequest};

pub struct Advisor {
    synthesizer: MarketSynthesizer,
    prompts: PromptBuilder,
    dispatcher: Dispatcher,
}

impl Advisor {
    pub fn new(synthesizer: MarketSynthesizer, prompts: PromptBuilder, dispatcher: Dispatcher) -> Self {
        Self {
            synthesizer,
            prompts,
            dispatcher,
        }
    }

    pub fn market_snapshot(&self, location: &str) -> MarketTable {
        self.synthesizer.synthesize(location)
    }

    /// Generate the five-section plan for a complete profile.
    pub async fn generate_plan(&self, profile: &Profile) -> Result<String, AdvisorError> {
        let request_id = Uuid::new_v4();

        if let Err(e) = profile.validate() {
            warn!(%request_id, error = %e, "Plan request rejected");
            return Err(e);
        }

        let table = self.synthesizer.synthesize(&profile.location);
        let text = self.prompts.build_plan_prompt(profile, &table)?;

        info!(%request_id, location = %profile.location, "Generating plan");
        Ok(self
            .dispatcher
            .dispatch(&PromptRequest::new(text, PLAN_TEMPERATURE))
            .await)
    }

    /// Answer a follow-up question against the profile and a market table.
    pub async fn ask_followup(
        &self,
        profile: &Profile,
        table: &MarketTable,
        question: &str,
    ) -> Result<String, AdvisorError> {
        let request_id = Uuid::new_v4();

        if question.trim().is_empty() {
            warn!(%request_id, "Follow-up rejected: empty question");
            return Err(AdvisorError::EmptyQuestion);
        }

        let text = self
            .prompts
            .build_followup_prompt(profile, table, question)
            .inspect_err(|e| warn!(%request_id, error = %e, "Follow-up rejected"))?;

        info!(%request_id, location = %profile.location, "Answering follow-up");
        Ok(self
            .dispatcher
            .dispatch(&PromptRequest::new(text, FOLLOWUP_TEMPERATURE))
            .await)
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
