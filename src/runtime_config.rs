//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for how route tables are built.
//!
//! ## Environment Variables
//!
//! ### `PATHMATCHER_DUPLICATE_POLICY`
//!
//! What happens when the same method and normalized template are registered
//! twice:
//! - `reject` (default): registration fails with a conflict error
//! - `keep-first`: the duplicate is logged and skipped
//!
//! ### `PATHMATCHER_INVALID_ROUTES`
//!
//! What happens when a route in a rule file fails to parse or register:
//! - `abort` (default): the whole build fails
//! - `skip`: the route is logged and left out
//!
//! ### `PATHMATCHER_SLOW_LOOKUP_US`
//!
//! Lookups slower than this many microseconds are logged at `warn`.
//! Default: `1000`.
//!
//! ## Usage
//!
//! ```rust
//! use path_matcher::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Duplicate policy: {:?}", config.duplicate_policy);
//! ```

use std::env;
use std::time::Duration;

use crate::router::DuplicatePolicy;

/// Whether a failing route aborts the whole rule-file build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRoutePolicy {
    #[default]
    Abort,
    Skip,
}

impl InvalidRoutePolicy {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "skip" => InvalidRoutePolicy::Skip,
            _ => InvalidRoutePolicy::Abort,
        }
    }
}

/// Parse a duplicate policy name; anything unrecognised means `reject`.
pub fn parse_duplicate_policy(s: &str) -> DuplicatePolicy {
    match s.to_lowercase().as_str() {
        "keep-first" | "keep_first" => DuplicatePolicy::KeepFirst,
        _ => DuplicatePolicy::Reject,
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub invalid_routes: InvalidRoutePolicy,
    pub slow_lookup_threshold: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            invalid_routes: InvalidRoutePolicy::Abort,
            slow_lookup_threshold: Duration::from_micros(1000),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        RuntimeConfig {
            duplicate_policy: env::var("PATHMATCHER_DUPLICATE_POLICY")
                .map(|v| parse_duplicate_policy(&v))
                .unwrap_or(defaults.duplicate_policy),
            invalid_routes: env::var("PATHMATCHER_INVALID_ROUTES")
                .map(|v| InvalidRoutePolicy::parse(&v))
                .unwrap_or(defaults.invalid_routes),
            slow_lookup_threshold: env::var("PATHMATCHER_SLOW_LOOKUP_US")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_micros)
                .unwrap_or(defaults.slow_lookup_threshold),
        }
    }
}
