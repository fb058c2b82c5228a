//! Directory Configuration
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binary before this runs).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DirectoryError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SCROLL_THRESHOLD: usize = 3;
pub const DEFAULT_OPTIONS_RPC: &str = "get_filter_options";
pub const DEFAULT_SEARCH_RPC: &str = "search_psihologi";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Configuration for the directory client and UI
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    /// Base URL of the Supabase project
    pub service_url: String,
    /// Anonymous API key, sent both as `apikey` and bearer token
    pub anon_key: String,
    /// Rows requested per page
    pub page_size: usize,
    /// Delay used to coalesce scroll and typing triggers
    pub debounce: Duration,
    /// How close to the end of the list the selection must get to load more
    pub scroll_threshold: usize,
    pub options_rpc: String,
    pub search_rpc: String,
    /// Where the TUI writes its log files
    pub log_dir: PathBuf,
    pub http_timeout: Duration,
}

impl DirectoryConfig {
    /// Build from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DirectoryError::config(format!("{} is not set", key)))
        };

        let page_size: usize = parse_or(&lookup, "DIRECTORY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(DirectoryError::config("DIRECTORY_PAGE_SIZE must be greater than zero"));
        }

        Ok(Self {
            service_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            anon_key: required("SUPABASE_ANON_KEY")?,
            page_size,
            debounce: Duration::from_millis(parse_or(&lookup, "DIRECTORY_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?),
            scroll_threshold: parse_or(&lookup, "DIRECTORY_SCROLL_THRESHOLD", DEFAULT_SCROLL_THRESHOLD)?,
            options_rpc: lookup("DIRECTORY_OPTIONS_RPC").unwrap_or_else(|| DEFAULT_OPTIONS_RPC.to_string()),
            search_rpc: lookup("DIRECTORY_SEARCH_RPC").unwrap_or_else(|| DEFAULT_SEARCH_RPC.to_string()),
            log_dir: lookup("DIRECTORY_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DIRECTORY_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DirectoryError::config(format!("{} has invalid value '{}'", key, raw))),
    }
}
