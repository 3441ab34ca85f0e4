//! Integration tests for the estate advisor.
//!
//! Drive the public library API end to end with an in-memory backend.

mod advisor_flow;
mod mock_backend;
