// Configuration module entry point
// Loads layered configuration: defaults, optional cihttp.toml, CIHTTP_* environment

mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use types::{BadRequestPolicy, Config, ContentConfig, HeaderMode, RequestConfig, ServerConfig};

/// Default config file name (without extension)
const CONFIG_FILE: &str = "cihttp";

impl Config {
    /// Load configuration from `cihttp.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CIHTTP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

impl RequestConfig {
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Built-in defaults, matching the fixed port and content root of the original server
fn defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.concurrent", true)?
        .set_default("server.on_bad_request", "respond")?
        .set_default("content.root", "www")?
        .set_default("content.fallback_file", "404.html")?
        .set_default("content.stat_path_quirk", false)?
        .set_default("request.header_mode", "drain")?
        .set_default("request.max_line_bytes", 8192)?
        .set_default("request.max_header_bytes", 16_384)?
        .set_default("request.read_timeout_ms", 10_000)?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "common")?
        .set_default("logging.show_headers", true)
}
