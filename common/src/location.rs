//! Location related module
//!
//! A `Coordinate` is what we get from every telemetry row.  It is used as an opaque cache key
//! through its string encoding (see `CoordKey`).
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Base URL for the map link of a coordinate
const MAPS_URL: &str = "https://www.google.com/maps";

/// Actual position of a vehicle
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Deterministic encoding of both components, used as cache key.
    ///
    /// `f64` display gives the shortest representation that round-trips, so `28.6139` stays
    /// `28.6139` and `77.0` becomes `77`.  Adding `0.0` turns `-0.0` into `0`, same position.
    ///
    #[inline]
    pub fn key(&self) -> CoordKey {
        CoordKey(format!("{},{}", self.lat + 0.0, self.lon + 0.0))
    }

    /// Link to the position on a map
    ///
    pub fn maps_link(&self) -> String {
        format!("{}?q={},{}", MAPS_URL, self.lat, self.lon)
    }
}

impl Display for Coordinate {
    /// Four decimals is roughly 10m, more than enough for display
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Encoded `Coordinate`, hashable and comparable unlike the `f64` pair.
///
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CoordKey(String);

impl CoordKey {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CoordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Coordinate> for CoordKey {
    fn from(value: Coordinate) -> Self {
        value.key()
    }
}
