//! Market data providers.
//!
//! Only a deterministic synthetic source exists; there is no live feed.

pub mod market;

pub use market::{generate_table, location_hash, MarketSynthesizer};
