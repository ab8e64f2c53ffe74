//! Configuration for `evdash`
//!
//! Loaded through `ConfigFile<Config>` from `~/.config/evdash/config.hcl`, every value has a
//! default so the file is optional.  Command-line flags win over the file.
//!
//! Version History:
//!
//! - v1 has the `api` and `geocoder` blocks
//!

use serde::Deserialize;

use evdash_common::Versioned;
use evdash_sources::{default_user_agent, DEF_LIMIT, NOMINATIM_URL};

/// Current version
pub const CVERSION: usize = 1;

/// Where the telemetry lives by default
pub const API_URL: &str = "https://ev-data-transformer-b24e8690fbba.herokuapp.com";

/// Configuration for the CLI tool
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: usize,
    pub api: ApiConfig,
    pub geocoder: GeocoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CVERSION,
            api: ApiConfig::default(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Versioned for Config {
    fn version(&self) -> usize {
        self.version
    }
}

/// `api { ... }` block
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the telemetry API
    pub url: String,
    /// Rows per page
    pub limit: u32,
    /// Request timeout, e.g. "30s"
    pub timeout: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            url: API_URL.to_string(),
            limit: DEF_LIMIT,
            timeout: "30s".to_string(),
        }
    }
}

/// `geocoder { ... }` block
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible service
    pub url: String,
    /// Public instances want to know who is asking
    pub user_agent: String,
    /// Wait before every lookup, e.g. "1s"
    pub delay: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig {
            url: NOMINATIM_URL.to_string(),
            user_agent: default_user_agent(),
            delay: "1s".to_string(),
        }
    }
}
