//! Configuration Module
//!
//! Handles loading cache construction parameters from environment variables.

use std::env;

/// Cache construction parameters.
///
/// Both values are fixed for the structure's lifetime once a cache is built
/// from them. All values can be configured via environment variables with
/// sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Per-entry TTL in seconds, refreshed on every touch (0 disables expiration)
    pub ttl_seconds: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL_SECONDS` - Per-entry TTL in seconds, 0 = never expire (default: 300)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_seconds: 300,
        }
    }
}
