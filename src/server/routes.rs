//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::Advisor;
use crate::types::{AdvisorError, MarketRow, MarketTable, Profile, ProfileField};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct ServerState {
    pub advisor: Advisor,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor,
            started_at: Utc::now(),
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    pub profile: Profile,
    pub question: String,
    /// Table the client is looking at; synthesized from the profile's
    /// location when omitted.
    #[serde(default)]
    pub table: Option<MarketTable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshotResponse {
    pub location: String,
    pub title: String,
    pub rows: Vec<MarketRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub backend_calls: u64,
    pub cache_hits: u64,
    pub failures: u64,
    pub cache_hit_rate: f64,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// JSON error body with the status it is served under.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<ProfileField>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            missing_fields: Vec::new(),
        }
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error: message.into(),
            missing_fields: Vec::new(),
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        let missing_fields = match &err {
            AdvisorError::IncompleteProfile { missing } => missing.clone(),
            _ => Vec::new(),
        };
        let status = match err {
            AdvisorError::NoValidCredential => StatusCode::SERVICE_UNAVAILABLE,
            AdvisorError::IncompleteProfile { .. } | AdvisorError::EmptyQuestion => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        Self {
            status,
            error: err.to_string(),
            missing_fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /api/market?location=...
pub async fn get_market(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<MarketSnapshotResponse>, ApiError> {
    let location = query.location.trim();
    if location.is_empty() {
        return Err(ApiError::bad_request("location is required"));
    }

    let table = state.advisor.market_snapshot(location);
    Ok(Json(MarketSnapshotResponse {
        location: location.to_string(),
        title: title_case(location),
        rows: table.rows.to_vec(),
    }))
}

/// POST /api/plan
pub async fn post_plan(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let response = state.advisor.generate_plan(&profile).await?;
    Ok(Json(AdviceResponse { response }))
}

/// POST /api/followup
pub async fn post_followup(
    State(state): State<AppState>,
    Json(req): Json<FollowupRequest>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let table = match req.table {
        Some(table) if !table.is_ordered() => {
            return Err(ApiError::unprocessable(
                "Market table rows must follow the standard property order",
            ));
        }
        Some(table) => table,
        None => state.advisor.market_snapshot(&req.profile.location),
    };
    let response = state
        .advisor
        .ask_followup(&req.profile, &table, &req.question)
        .await?;
    Ok(Json(AdviceResponse { response }))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.advisor.dispatch_stats();
    Json(StatsResponse {
        backend_calls: stats.backend_calls,
        cache_hits: stats.cache_hits,
        failures: stats.failures,
        cache_hit_rate: stats.cache_hit_rate(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// `"new delhi"` → `"New Delhi"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
