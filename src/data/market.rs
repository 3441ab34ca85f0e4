//! Synthetic market data.
//!
//! There is no live price feed: each location maps deterministically to a
//! five-row table of plot, flat and villa prices. The mapping hashes the
//! trimmed, lower-cased location with 64-bit FNV-1a, which is fixed and identical
//! across runs, builds and platforms, so the same location always yields
//! the same numbers. Results are memoised for an hour, but expiry only
//! costs a recomputation, never a different table.

use chrono::Duration;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{Cache, TtlCache};
use crate::types::{MarketRow, MarketTable, PropertyType};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Market tables are cached for one hour.
pub const MARKET_CACHE_TTL_MINS: i64 = 60;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const BASE_LAND_PRICE: u64 = 5_000;
const LAND_PRICE_SPREAD: u64 = 2_000;
const BASE_CONSTRUCTION_COST: u64 = 1_800;
const CONSTRUCTION_COST_SPREAD: u64 = 500;

const FLAT_BASE_PRICE: u64 = 6_000_000;
const FLAT_PRICE_SPREAD: u64 = 2_000_000;
const VILLA_BASE_PRICE: u64 = 12_000_000;
const VILLA_PRICE_SPREAD: u64 = 4_000_000;

/// (area, land premium, construction premium) per plot size.
const PLOTS: [(PropertyType, u64, u64, u64); 3] = [
    (PropertyType::SmallPlot, 1_200, 0, 0),
    (PropertyType::MediumPlot, 1_800, 500, 200),
    (PropertyType::LargePlot, 2_400, 1_000, 400),
];

const FLAT_AREA_SQFT: u64 = 1_100;
const VILLA_AREA_SQFT: u64 = 2_000;

// ---------------------------------------------------------------------------
// Pure generation
// ---------------------------------------------------------------------------

/// Canonical form of a location: surrounding whitespace dropped, lower-cased.
pub fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}

/// 64-bit FNV-1a of the normalized location.
pub fn location_hash(location: &str) -> u64 {
    normalize_location(location)
        .bytes()
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Derive the market table for a location. Case-insensitive and pure.
pub fn generate_table(location: &str) -> MarketTable {
    let hash = location_hash(location);
    let base_land = BASE_LAND_PRICE + hash % LAND_PRICE_SPREAD;
    let base_construction = BASE_CONSTRUCTION_COST + hash % CONSTRUCTION_COST_SPREAD;

    let plot = |(property_type, area, land_premium, construction_premium): (PropertyType, u64, u64, u64)| {
        MarketRow {
            property_type,
            area_sqft: area,
            land_price_per_sqft: Some(base_land + land_premium),
            construction_cost_per_sqft: Some(base_construction + construction_premium),
            ready_property_price: None,
        }
    };

    let ready = |property_type, area, base, spread: u64| MarketRow {
        property_type,
        area_sqft: area,
        land_price_per_sqft: None,
        construction_cost_per_sqft: None,
        ready_property_price: Some(base + hash % spread),
    };

    MarketTable {
        rows: [
            plot(PLOTS[0]),
            plot(PLOTS[1]),
            plot(PLOTS[2]),
            ready(PropertyType::Flat2Bhk, FLAT_AREA_SQFT, FLAT_BASE_PRICE, FLAT_PRICE_SPREAD),
            ready(PropertyType::Villa3Bhk, VILLA_AREA_SQFT, VILLA_BASE_PRICE, VILLA_PRICE_SPREAD),
        ],
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Memoising front for [`generate_table`].
pub struct MarketSynthesizer {
    cache: Arc<dyn Cache<String, MarketTable>>,
}

impl MarketSynthesizer {
    pub fn new(cache: Arc<dyn Cache<String, MarketTable>>) -> Self {
        Self { cache }
    }

    /// Synthesizer with the standard one-hour wall-clock cache.
    pub fn with_default_cache() -> Self {
        let cache: TtlCache<String, MarketTable> =
            TtlCache::with_system_clock(Duration::minutes(MARKET_CACHE_TTL_MINS));
        Self::new(Arc::new(cache))
    }

    /// Market snapshot for a location, served from cache when fresh.
    pub fn synthesize(&self, location: &str) -> MarketTable {
        let key = normalize_location(location);

        if let Some(table) = self.cache.get(&key) {
            debug!(location = %key, "Market cache hit");
            return table;
        }

        let table = generate_table(&key);
        debug!(location = %key, "Market table synthesized");
        self.cache.put(key, table.clone());
        table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
