//! Configuration module for urlstats
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use urlstats::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("urlstats.toml")).unwrap();
//! println!("Re-check every {}s", config.recheck.interval_secs);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, EngineConfig, RecheckConfig, ServerConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
