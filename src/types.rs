//! Shared types for the advisor.
//!
//! Profile input, synthesized market tables, prompt requests and the
//! domain error taxonomy. Kept free of I/O so every other module can
//! depend on it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Client profile supplied by the caller.
///
/// Absent fields deserialize as blank or zero so that `validate` reports
/// them alongside any other missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// Annual household income in whole currency units.
    pub income: i64,
    pub timeframe_years: u32,
    pub location: String,
}

impl Profile {
    /// Fields that are blank or non-positive, in declaration order.
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(ProfileField::Name);
        }
        if self.income <= 0 {
            missing.push(ProfileField::Income);
        }
        if self.timeframe_years == 0 {
            missing.push(ProfileField::Timeframe);
        }
        if self.location.trim().is_empty() {
            missing.push(ProfileField::Location);
        }
        missing
    }

    /// Reject the profile unless every field is populated.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::IncompleteProfile { missing })
        }
    }

    /// Helper to build a test/sample profile with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Profile {
            name: "Priya".to_string(),
            income: 1_000_000,
            timeframe_years: 5,
            location: "Nagpur".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Income,
    Timeframe,
    Location,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProfileField::Name => "name",
            ProfileField::Income => "income",
            ProfileField::Timeframe => "timeframe",
            ProfileField::Location => "location",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    SmallPlot,
    MediumPlot,
    LargePlot,
    Flat2Bhk,
    Villa3Bhk,
}

impl PropertyType {
    /// Fixed row order of every market table.
    pub const ALL: [PropertyType; 5] = [
        PropertyType::SmallPlot,
        PropertyType::MediumPlot,
        PropertyType::LargePlot,
        PropertyType::Flat2Bhk,
        PropertyType::Villa3Bhk,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::SmallPlot => "Small Plot",
            PropertyType::MediumPlot => "Medium Plot",
            PropertyType::LargePlot => "Large Plot",
            PropertyType::Flat2Bhk => "2BHK Flat",
            PropertyType::Villa3Bhk => "3BHK Villa",
        }
    }

    /// Position of this type within [`PropertyType::ALL`].
    pub fn index(&self) -> usize {
        match self {
            PropertyType::SmallPlot => 0,
            PropertyType::MediumPlot => 1,
            PropertyType::LargePlot => 2,
            PropertyType::Flat2Bhk => 3,
            PropertyType::Villa3Bhk => 4,
        }
    }

    pub fn is_plot(&self) -> bool {
        matches!(
            self,
            PropertyType::SmallPlot | PropertyType::MediumPlot | PropertyType::LargePlot
        )
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One row of a market snapshot. `None` prices are not applicable to the
/// property type (plots have no ready price, built units no land price).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRow {
    pub property_type: PropertyType,
    pub area_sqft: u64,
    pub land_price_per_sqft: Option<u64>,
    pub construction_cost_per_sqft: Option<u64>,
    pub ready_property_price: Option<u64>,
}

/// Exactly five rows, ordered as [`PropertyType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTable {
    pub rows: [MarketRow; 5],
}

impl MarketTable {
    pub fn row(&self, property_type: PropertyType) -> &MarketRow {
        &self.rows[property_type.index()]
    }

    /// True when every row sits at its [`PropertyType::ALL`] position.
    pub fn is_ordered(&self) -> bool {
        self.rows
            .iter()
            .zip(PropertyType::ALL)
            .all(|(row, expected)| row.property_type == expected)
    }
}

// ---------------------------------------------------------------------------
// Prompt requests
// ---------------------------------------------------------------------------

/// A prompt ready for the backend, with its sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub text: String,
    pub temperature: f32,
}

impl PromptRequest {
    pub fn new(text: impl Into<String>, temperature: f32) -> Self {
        Self {
            text: text.into(),
            temperature,
        }
    }

    /// Exact-match cache key. Temperature is compared bitwise.
    pub fn cache_key(&self) -> PromptKey {
        PromptKey {
            text: self.text.clone(),
            temperature_bits: self.temperature.to_bits(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromptKey {
    pub text: String,
    pub temperature_bits: u32,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced to callers of the advisor.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error(
        "No valid Gemini API key found. Add keys to the configured key source; \
         you can get an API key from Google AI Studio: https://ai.google.dev/"
    )]
    NoValidCredential,

    #[error("Profile incomplete, please fill in: {}", join_fields(.missing))]
    IncompleteProfile { missing: Vec<ProfileField> },

    #[error("Please enter a question first")]
    EmptyQuestion,
}

fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure reasons reported by a completion backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
