//! # Engine Configuration Module
//!
//! Tunables shared by the matching and reconciliation components. Defaults
//! reproduce the historical behaviour; `EngineConfig::from_env` lets a host
//! application override them through environment variables or a `.env` file.

use anyhow::{Context, Result};
use log::debug;
use std::env;

/// Minimum length (in characters) of the shorter name for a substring match
pub const DEFAULT_MIN_PARTIAL_MATCH_LEN: usize = 2;

pub const ENV_MIN_PARTIAL_MATCH_LEN: &str = "PANTRY_MIN_PARTIAL_MATCH_LEN";
pub const ENV_LEGACY_COUNT_INTERCHANGE: &str = "PANTRY_LEGACY_COUNT_INTERCHANGE";

/// Configuration for name matching and stock reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Shortest normalized name allowed to match as a substring of a longer one
    pub min_partial_match_len: usize,
    /// Treat pieces and bottles as interchangeable when checking stock availability
    pub legacy_count_interchange: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_partial_match_len: DEFAULT_MIN_PARTIAL_MATCH_LEN,
            legacy_count_interchange: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Unset variables keep their default values; malformed values are errors.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MIN_PARTIAL_MATCH_LEN) {
            config.min_partial_match_len = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_MIN_PARTIAL_MATCH_LEN}: '{raw}'"))?;
        }

        if let Some(raw) = lookup(ENV_LEGACY_COUNT_INTERCHANGE) {
            config.legacy_count_interchange = parse_flag(&raw)
                .with_context(|| format!("Invalid {ENV_LEGACY_COUNT_INTERCHANGE}: '{raw}'"))?;
        }

        debug!(
            "Loaded engine config: min_partial_match_len={}, legacy_count_interchange={}",
            config.min_partial_match_len, config.legacy_count_interchange
        );
        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("expected a boolean, got '{other}'")),
    }
}
