// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
    pub request: RequestConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Spawn a task per connection; `false` serves one connection at a time
    pub concurrent: bool,
    pub on_bad_request: BadRequestPolicy,
}

/// What to do with a request line that cannot be served
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadRequestPolicy {
    /// Answer with a 400/501 status line, keep serving
    Respond,
    /// Drop the connection without a response, keep serving
    Close,
    /// Stop the whole server (exit code 1)
    Exit,
}

/// Content root configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub root: String,
    pub fallback_file: String,
    /// Stat `<root>/<raw path>` for `Last-Modified` instead of the opened file
    pub stat_path_quirk: bool,
}

/// Request reading limits
#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    pub header_mode: HeaderMode,
    pub max_line_bytes: usize,
    pub max_header_bytes: usize,
    pub read_timeout_ms: u64,
}

/// How header lines after the request line are consumed
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Read until the blank line or end of stream
    Drain,
    /// Read only what is already buffered
    Buffered,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
    /// Echo discarded request header lines
    pub show_headers: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}
