//! HTTP fetcher implementation
//!
//! This module handles the outbound downloads made by the engine workers:
//! - Building the HTTP client with user agent and timeouts
//! - GET requests that read the whole body to measure its size
//! - Error classification (timeout, transport, HTTP status)

use crate::config::{EngineConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Measurements of a successful download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSuccess {
    /// Size of the fully read response body
    pub bytes: u64,

    /// Wall-clock time of request plus body read
    pub elapsed: Duration,
}

/// Why a download attempt failed
///
/// Every variant is terminal for the attempt; nothing is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Builds the HTTP client shared by all workers
///
/// # Arguments
///
/// * `engine` - Engine configuration carrying the request and connect timeouts
/// * `user_agent` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use urlstats::config::Config;
/// use urlstats::engine::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.engine, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    engine: &EngineConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(engine.request_timeout())
        .connect_timeout(engine.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads `url` and measures the body size and elapsed time
///
/// Only `200 OK` counts as success. The timer covers the request and the
/// complete body read; the client timeout bounds both.
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchSuccess, FetchError> {
    let started = Instant::now();

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchSuccess {
        bytes: body.len() as u64,
        elapsed: started.elapsed(),
    })
}
