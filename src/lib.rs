//! ESTATE ADVISOR — Generative real-estate investment assistant
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cache;
pub mod config;
pub mod credentials;
pub mod types;
pub mod data;
pub mod prompt;
pub mod llm;
pub mod engine;
pub mod server;
