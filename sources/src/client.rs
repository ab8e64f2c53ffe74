//! Build the HTTP clients used by the sources.

use std::time::Duration;

use clap::{crate_name, crate_version};
use eyre::{Result, WrapErr};
use reqwest::Client;

/// Ceiling for any request, the telemetry API can be slow to wake up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Our own identification if nothing else is configured
///
pub fn default_user_agent() -> String {
    format!("{}/{}", crate_name!(), crate_version!())
}

/// `timeout` is the ceiling for a whole request, `None` for no ceiling at all.
///
#[tracing::instrument]
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> Result<Client> {
    let builder = Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .pool_idle_timeout(Some(Duration::from_secs(600)));
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build().wrap_err("failed to build an HTTP client")
}
