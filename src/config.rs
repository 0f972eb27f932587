//! Configuration module for the Pix checkout server.

use clap::Parser;
use pix_types::config::{LiteralOrEnv, PixConfig};
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// CLI arguments for the Pix checkout server.
#[derive(Parser, Debug)]
#[command(name = "pix-brcode")]
#[command(about = "Pix BR Code checkout HTTP server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,
}

/// Server configuration.
///
/// Fields use serde defaults that fall back to environment variables,
/// then to hardcoded defaults.
///
/// ```json
/// {
///   "port": 8080,
///   "pix": {
///     "key": "$PIX_KEY",
///     "key_type": "EMAIL",
///     "merchant_name": "Libris Store",
///     "merchant_city": "Sao Paulo"
///   },
///   "qr_renderer": "https://api.qrserver.com/v1/create-qr-code/",
///   "admin_token": "$PIX_ADMIN_TOKEN"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default)]
    pix: PixConfig,
    #[serde(default = "config_defaults::default_qr_renderer")]
    qr_renderer: Url,
    #[serde(default)]
    admin_token: Option<LiteralOrEnv<String>>,
}

pub mod config_defaults {
    use std::env;
    use std::net::{IpAddr, Ipv4Addr};
    use url::Url;

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    pub const DEFAULT_QR_RENDERER: &str = "https://api.qrserver.com/v1/create-qr-code/";

    /// Returns the default port value with fallback: $PORT env var -> 8080
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Returns the default host value with fallback: $HOST env var -> "0.0.0.0"
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HOST)
    }

    /// Returns the default QR renderer with fallback: $QR_RENDERER env var -> api.qrserver.com
    pub fn default_qr_renderer() -> Url {
        env::var("QR_RENDERER")
            .ok()
            .and_then(|s| Url::parse(&s).ok())
            .unwrap_or_else(|| Url::parse(DEFAULT_QR_RENDERER).expect("valid renderer URL"))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    /// Get the port value.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the host value as an IpAddr.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Get the merchant Pix configuration.
    pub fn pix(&self) -> &PixConfig {
        &self.pix
    }

    /// Get the base URL of the QR image renderer.
    pub fn qr_renderer(&self) -> &Url {
        &self.qr_renderer
    }

    /// Bearer token required to edit the Pix configuration, if any.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_ref().map(|token| token.as_str())
    }

    /// Load configuration from CLI arguments and JSON file.
    ///
    /// The config file path is determined by:
    /// 1. `--config <path>` CLI argument
    /// 2. `$CONFIG`
    /// 3. `./config.json`
    ///
    /// Values not present in the config file will be resolved via
    /// environment variables or defaults during deserialization.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        let config_path = Path::new(&cli_args.config)
            .canonicalize()
            .map_err(|e| ConfigError::FileRead(cli_args.config, e))?;
        Self::load_from_path(config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(path, e))?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        Ok(config)
    }
}
