//! ESTATE ADVISOR — Generative real-estate investment assistant
//!
//! Entry point. Loads configuration, initialises structured logging,
//! draws one API key from the configured pool, wires the advisor and
//! serves the HTTP API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use estate_advisor::config;
use estate_advisor::credentials;
use estate_advisor::data::MarketSynthesizer;
use estate_advisor::engine::{Advisor, Dispatcher};
use estate_advisor::llm::gemini::GeminiClient;
use estate_advisor::prompt::PromptBuilder;
use estate_advisor::server::{self, ServerState};

const BANNER: &str = r#"
 _____ ____ _____  _  _____ _____
| ____/ ___|_   _|/ \|_   _| ____|
|  _| \___ \ | | / _ \ | | |  _|
| |___ ___) || |/ ___ \| | | |___
|_____|____/ |_/_/   \_\_| |_____|

  Real-estate investment advisor
  v0.1.0 — Gemini backed
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("ADVISOR_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        advisor_name = %cfg.advisor.name,
        country = %cfg.advisor.region.country,
        config = %config_path,
        "Estate advisor starting up"
    );

    // -- Credential gate -------------------------------------------------

    let candidates = credentials::collect_candidates(&cfg.credentials)?;
    let credential = match credentials::select_credential(candidates) {
        Ok(c) => c,
        Err(e) => {
            error!(keys_env = %cfg.credentials.keys_env, "{e}");
            return Err(e.into());
        }
    };

    // -- Initialise components -------------------------------------------

    if cfg.llm.provider != "gemini" {
        warn!(provider = %cfg.llm.provider, "Unknown LLM provider, using Gemini");
    }
    let backend = GeminiClient::new(credential, &cfg.llm)?;
    info!(model = %backend.model(), "Using Gemini completion backend");

    let advisor = Advisor::new(
        MarketSynthesizer::with_default_cache(),
        PromptBuilder::new(cfg.advisor.region.clone()),
        Dispatcher::with_default_cache(Arc::new(backend)),
    );
    let state = Arc::new(ServerState::new(advisor));

    // -- Serve -----------------------------------------------------------

    info!("Press Ctrl+C to stop.");
    server::serve(state.clone(), &cfg.server, shutdown_signal()).await?;

    let stats = state.advisor.dispatch_stats();
    info!(
        backend_calls = stats.backend_calls,
        cache_hits = stats.cache_hits,
        failures = stats.failures,
        "Estate advisor shut down cleanly."
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("estate_advisor=info"));

    let json_logging = std::env::var("ADVISOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
