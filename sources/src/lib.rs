//! Module to deal with the remote services we get data from.
//!
//! The different submodules deal with the differences between them:
//!
//! - `telemetry`: paginated and filtered vehicle data from the dashboard API
//! - `geocode`: reverse geocoding of coordinates into locality names, with its cache
//!

use std::fmt::{Display, Formatter};

use serde::Serialize;

// Re-export these modules for a shorted import path.
//
pub use client::*;
pub use error::*;
pub use filter::*;
pub use geocode::*;
pub use telemetry::*;
pub use vehicle::*;

mod client;
mod error;
mod filter;
mod geocode;
mod telemetry;
mod vehicle;

/// Statistics gathering struct for the address resolver
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Stats {
    /// Served from the cache
    pub hits: u32,
    /// Had to go through the network
    pub miss: u32,
    /// Failed lookups
    pub err: u32,
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hits={} miss={} errors={}", self.hits, self.miss, self.err)
    }
}
