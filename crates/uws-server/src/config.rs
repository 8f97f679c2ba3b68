//! Application configuration for the UWS server.
//!
//! Configuration is loaded from environment variables using the `envy`
//! crate for type-safe parsing. Variables are prefixed with `UWS_`:
//!
//! - `UWS_HOST`: Server bind address (default: "0.0.0.0")
//! - `UWS_PORT`: Server port (default: 8040)
//! - `UWS_MAX_WAIT_TIME`: Cap in seconds on blocking `WAIT` requests (default: 999)
//! - `UWS_DEFAULT_EXPIRY`: Seconds until a new job is destroyed (default: 1 day)
//! - `UWS_MAX_EXPIRY`: Ceiling in seconds a destruction time may be pushed to (default: 3 days)
//! - `UWS_DEBUG`: Enable debug mode (default: false)
//! - `UWS_SERVER_NAME`: Server name for identification

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum time in seconds a client may block on a `WAIT` request
    #[serde(default = "default_max_wait_time")]
    pub max_wait_time: u64,

    /// Seconds after creation at which a job is destroyed by default
    #[serde(default = "default_expiry")]
    pub default_expiry: u64,

    /// Maximum seconds past creation a destruction time may be set to
    #[serde(default = "default_max_expiry")]
    pub max_expiry: u64,

    /// Enable debug mode
    #[serde(default)]
    pub debug: bool,

    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8040
}

fn default_max_wait_time() -> u64 {
    999
}

fn default_expiry() -> u64 {
    24 * 60 * 60
}

fn default_max_expiry() -> u64 {
    default_expiry() * 3
}

fn default_server_name() -> String {
    "uws-server".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `UWS_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("UWS_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_wait_time: default_max_wait_time(),
            default_expiry: default_expiry(),
            max_expiry: default_max_expiry(),
            debug: false,
            server_name: default_server_name(),
        }
    }
}
