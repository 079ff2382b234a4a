use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for urlstats
///
/// Every section is optional; missing sections and keys fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub recheck: RecheckConfig,
    pub server: ServerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Fetch engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of worker tasks, i.e. the maximum number of concurrent downloads
    #[serde(rename = "max-parallel-downloads")]
    pub max_parallel_downloads: u32,

    /// Capacity of the job queue; submitters wait when it is full
    #[serde(rename = "queue-size")]
    pub queue_size: u32,

    /// Total timeout for one download, request and body (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Timeout for establishing the connection (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel_downloads: 3,
            queue_size: 100,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Periodic re-check configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecheckConfig {
    /// Seconds between two re-check ticks
    #[serde(rename = "interval-secs")]
    pub interval_secs: u64,

    /// How many of the most submitted URLs are re-checked per tick
    #[serde(rename = "top-n")]
    pub top_n: u32,
}

impl RecheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RecheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            top_n: 10,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Port the HTTP server listens on
    #[serde(rename = "http-port")]
    pub http_port: u16,

    /// Maximum number of records returned by a list query
    #[serde(rename = "max-urls-in-search-results")]
    pub max_urls_in_search_results: u32,

    /// Timeout for handling one HTTP request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 3000,
            max_urls_in_search_results: 50,
            request_timeout_secs: 60,
        }
    }
}

/// User agent identification sent with every download
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value, `name/version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "urlstats".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
