//! urlstats: URL download statistics tracker
//!
//! This crate tracks URLs submitted by clients, downloads each one to measure
//! its size and latency, and periodically re-checks the most submitted URLs
//! to keep their statistics fresh.

pub mod api;
pub mod config;
pub mod engine;
pub mod store;
pub mod tracker;

use thiserror::Error;

/// Main error type for urlstats operations
#[derive(Debug, Error)]
pub enum UrlStatsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors for URLs rejected at submission time
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for urlstats operations
pub type Result<T> = std::result::Result<T, UrlStatsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineHandle, FetchEngine};
pub use store::{MemoryStore, OrderKey, StatsStore, UrlRecord};
pub use tracker::{Submission, Tracker, TrackerRuntime};
