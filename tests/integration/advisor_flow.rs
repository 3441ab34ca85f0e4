//! End-to-end advisor flows.
//!
//! Wires the real synthesizer, prompt builder, dispatcher and caches
//! around a `MockBackend` and exercises the caller-facing operations.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tower::ServiceExt;

use estate_advisor::cache::{ManualClock, TtlCache};
use estate_advisor::config::{AppConfig, CredentialsConfig};
use estate_advisor::credentials::{collect_candidates, select_credential};
use estate_advisor::data::MarketSynthesizer;
use estate_advisor::engine::{
    Advisor, Dispatcher, FALLBACK_RESPONSE, FOLLOWUP_TEMPERATURE, PLAN_TEMPERATURE,
};
use estate_advisor::prompt::PromptBuilder;
use estate_advisor::server::{build_router, ServerState};
use estate_advisor::types::{AdvisorError, BackendError, PromptKey, PropertyType, Profile};

use crate::mock_backend::MockBackend;

fn profile() -> Profile {
    Profile {
        name: "Priya".to_string(),
        income: 1_000_000,
        timeframe_years: 5,
        location: "Nagpur".to_string(),
    }
}

fn advisor_with(backend: &MockBackend) -> Advisor {
    Advisor::new(
        MarketSynthesizer::with_default_cache(),
        PromptBuilder::default(),
        Dispatcher::with_default_cache(Arc::new(backend.clone())),
    )
}

/// Advisor whose response cache runs on a manual clock.
fn advisor_with_clock(backend: &MockBackend) -> (Advisor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache: Arc<TtlCache<PromptKey, String>> =
        Arc::new(TtlCache::new(Duration::minutes(10), clock.clone()));
    let advisor = Advisor::new(
        MarketSynthesizer::with_default_cache(),
        PromptBuilder::default(),
        Dispatcher::new(Arc::new(backend.clone()), cache),
    );
    (advisor, clock)
}

// ---------------------------------------------------------------------------
// Market snapshot
// ---------------------------------------------------------------------------

#[test]
fn test_nagpur_snapshot() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);

    let upper = advisor.market_snapshot("Nagpur");
    let lower = advisor.market_snapshot("nagpur");
    assert_eq!(upper, lower);

    let order: Vec<PropertyType> = upper.rows.iter().map(|r| r.property_type).collect();
    assert_eq!(order, PropertyType::ALL.to_vec());

    let small = upper.row(PropertyType::SmallPlot);
    assert_eq!(small.area_sqft, 1_200);
    assert_eq!(small.land_price_per_sqft, Some(5_996));
    assert_eq!(small.construction_cost_per_sqft, Some(2_296));
    assert_eq!(small.ready_property_price, None);

    let flat = upper.row(PropertyType::Flat2Bhk);
    assert_eq!(flat.land_price_per_sqft, None);
    assert_eq!(flat.construction_cost_per_sqft, None);
    assert_eq!(flat.ready_property_price, Some(7_404_996));

    assert_eq!(
        upper.row(PropertyType::Villa3Bhk).ready_property_price,
        Some(15_404_996)
    );

    // Snapshots never touch the backend.
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn test_different_locations_differ() {
    let advisor = advisor_with(&MockBackend::new());
    assert_ne!(advisor.market_snapshot("Nagpur"), advisor.market_snapshot("Pune"));
}

// ---------------------------------------------------------------------------
// Plan generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_plan_sends_profile_and_table() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);

    let plan = advisor.generate_plan(&profile()).await.unwrap();
    assert!(plan.starts_with("mock response #1"));

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].temperature, PLAN_TEMPERATURE);

    let prompt = &calls[0].prompt;
    assert!(prompt.contains("- Name: Priya"));
    assert!(prompt.contains("- Annual Household Income: ₹1,000,000"));
    assert!(prompt.contains("- Investment Timeframe: 5 years"));
    assert!(prompt.contains("| 2BHK Flat | 1100 | N/A | N/A | 7404996 |"));
    for section in ["Executive Summary", "Buy vs. Build Analysis", "Friendly Closing"] {
        assert!(prompt.contains(section), "missing section {section}");
    }
}

#[tokio::test]
async fn test_repeat_plan_within_ttl_hits_backend_once() {
    let backend = MockBackend::new();
    let (advisor, clock) = advisor_with_clock(&backend);

    let first = advisor.generate_plan(&profile()).await.unwrap();
    clock.advance(Duration::minutes(9));
    let second = advisor.generate_plan(&profile()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(advisor.dispatch_stats().cache_hits, 1);
}

#[tokio::test]
async fn test_plan_after_ttl_calls_backend_again() {
    let backend = MockBackend::new();
    let (advisor, clock) = advisor_with_clock(&backend);

    let first = advisor.generate_plan(&profile()).await.unwrap();
    clock.advance(Duration::minutes(11));
    let second = advisor.generate_plan(&profile()).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_incomplete_profile_is_rejected_without_backend_call() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);

    let incomplete = Profile {
        income: 0,
        ..profile()
    };
    let err = advisor.generate_plan(&incomplete).await.unwrap_err();
    assert!(matches!(err, AdvisorError::IncompleteProfile { .. }));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_returns_fallback_and_is_not_cached() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);

    backend.set_error(BackendError::RateLimited("quota exceeded".into()));
    let plan = advisor.generate_plan(&profile()).await.unwrap();
    assert_eq!(plan, FALLBACK_RESPONSE);

    backend.clear_error();
    let plan = advisor.generate_plan(&profile()).await.unwrap();
    assert_ne!(plan, FALLBACK_RESPONSE);

    let stats = advisor.dispatch_stats();
    assert_eq!(stats.backend_calls, 2);
    assert_eq!(stats.failures, 1);
}

// ---------------------------------------------------------------------------
// Follow-up questions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_followup_uses_shown_table() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);

    let table = advisor.market_snapshot("Nagpur");
    advisor
        .ask_followup(&profile(), &table, "Should I build or buy?")
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].temperature, FOLLOWUP_TEMPERATURE);
    assert!(calls[0].prompt.contains("\"Should I build or buy?\""));
    assert!(calls[0].prompt.contains("| Small Plot | 1200 | 5996 | 2296 | N/A |"));
}

#[tokio::test]
async fn test_blank_question_rejected() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);
    let table = advisor.market_snapshot("Nagpur");

    let err = advisor.ask_followup(&profile(), &table, " \n").await.unwrap_err();
    assert!(matches!(err, AdvisorError::EmptyQuestion));
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn test_followup_blocking() {
    let backend = MockBackend::new();
    let advisor = advisor_with(&backend);
    let table = advisor.market_snapshot("nagpur");

    let answer =
        tokio_test::block_on(advisor.ask_followup(&profile(), &table, "Is now a good time?"))
            .unwrap();
    assert!(answer.contains("t=0.5"));
}

// ---------------------------------------------------------------------------
// Credential gate
// ---------------------------------------------------------------------------

#[test]
fn test_no_credentials_is_fatal() {
    let empty: Vec<String> = Vec::new();
    assert!(matches!(
        select_credential(empty),
        Err(AdvisorError::NoValidCredential)
    ));
    assert!(matches!(
        select_credential(["YOUR_API_KEY_PLACEHOLDER"]),
        Err(AdvisorError::NoValidCredential)
    ));
}

#[test]
fn test_key_file_feeds_selection() {
    let path = std::env::temp_dir().join(format!("advisor-keys-{}.txt", uuid::Uuid::new_v4()));
    std::fs::write(&path, "# keys\nYOUR_API_KEY_1\n\nreal-key-abc\n").unwrap();

    let cfg = CredentialsConfig {
        keys_env: format!("ADVISOR_TEST_UNSET_{}", uuid::Uuid::new_v4().simple()),
        keys_file: Some(path.to_string_lossy().into_owned()),
    };
    let candidates = collect_candidates(&cfg).unwrap();
    assert_eq!(candidates, vec!["YOUR_API_KEY_1", "real-key-abc"]);

    let credential = select_credential(candidates).unwrap();
    assert_eq!(credential.expose(), "real-key-abc");

    std::fs::remove_file(&path).ok();
}

// ---------------------------------------------------------------------------
// HTTP surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_http_plan_round_trip() {
    let cfg = AppConfig::parse("[advisor]\ncountry = \"India\"\n").unwrap();
    let backend = MockBackend::new();
    let advisor = Advisor::new(
        MarketSynthesizer::with_default_cache(),
        PromptBuilder::new(cfg.advisor.region.clone()),
        Dispatcher::with_default_cache(Arc::new(backend.clone())),
    );
    let app = build_router(Arc::new(ServerState::new(advisor)));

    let body = serde_json::to_string(&profile()).unwrap();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/plan")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["response"].as_str().unwrap().starts_with("mock response #1"));

    let resp = app
        .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(stats["backend_calls"], 1);
}
