//! Utility modules: retry and rate limiting.

pub mod rate_limit;
pub mod retry;
