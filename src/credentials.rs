//! Credential pool.
//!
//! Collects candidate Gemini API keys from the configured sources, drops
//! placeholders, and binds one key to the process. Selection happens once
//! at startup and is never re-rolled: a rate-limited key stays in use until
//! the process is restarted.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::{info, warn};

use crate::config::CredentialsConfig;
use crate::types::AdvisorError;

/// Any candidate containing this marker is an unfilled template value.
pub const PLACEHOLDER_MARKER: &str = "YOUR_API_KEY";

/// An API key. `Debug` never prints the secret.
pub struct Credential(SecretString);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::new(key.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// True for keys that cannot possibly authenticate.
pub fn is_placeholder(candidate: &str) -> bool {
    candidate.trim().is_empty() || candidate.contains(PLACEHOLDER_MARKER)
}

/// Pick one usable key uniformly at random.
pub fn select_credential<I, S>(candidates: I) -> Result<Credential, AdvisorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    select_credential_with(candidates, &mut rand::thread_rng())
}

/// [`select_credential`] with a caller-supplied RNG.
pub fn select_credential_with<I, S, R>(candidates: I, rng: &mut R) -> Result<Credential, AdvisorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut total = 0usize;
    let valid: Vec<String> = candidates
        .into_iter()
        .inspect(|_| total += 1)
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !is_placeholder(c))
        .collect();

    if valid.len() < total {
        warn!(
            skipped = total - valid.len(),
            "Ignoring placeholder or blank API keys"
        );
    }

    let chosen = valid.choose(rng).ok_or(AdvisorError::NoValidCredential)?;
    info!(pool_size = valid.len(), "API key selected for this session");
    Ok(Credential::new(chosen.clone()))
}

/// Gather candidate keys from the environment variable, then the key file.
///
/// The variable holds a comma-separated list. The file holds one key per
/// line; blank lines and `#` comments are skipped. Missing sources are not
/// errors, an unreadable key file is.
pub fn collect_candidates(cfg: &CredentialsConfig) -> Result<Vec<String>> {
    let mut candidates = Vec::new();

    if let Ok(raw) = std::env::var(&cfg.keys_env) {
        candidates.extend(parse_key_list(&raw));
    }

    if let Some(path) = &cfg.keys_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read API key file: {path}"))?;
        candidates.extend(parse_key_file(&contents));
    }

    Ok(candidates)
}

fn parse_key_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
}

fn parse_key_file(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
