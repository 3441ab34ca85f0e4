//! Core engine: cached dispatch and the advisor operations built on it.

pub mod advisor;
pub mod dispatcher;

pub use advisor::Advisor;
pub use dispatcher::{
    DispatchStats, Dispatcher, FALLBACK_RESPONSE, FOLLOWUP_TEMPERATURE, PLAN_TEMPERATURE,
};
