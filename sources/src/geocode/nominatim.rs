//! Reverse geocoding through a Nominatim-compatible service.
//!
//! `GET /reverse?format=json&lat&lon&zoom=14&addressdetails=1`, we only care about the
//! `address` object.
//!

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use evdash_common::Coordinate;

use crate::{AddressDetails, LookupError, ReverseGeocoder};

/// Public OSM instance
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// City level of detail
const ZOOM: &str = "14";

const LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<AddressDetails>,
}

#[derive(Clone, Debug)]
pub struct Nominatim {
    /// Base URL, without trailing slash
    base_url: String,
    client: Client,
}

impl Nominatim {
    pub fn new(base_url: &str, client: Client) -> Self {
        Nominatim {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl ReverseGeocoder for Nominatim {
    fn name(&self) -> String {
        format!("nominatim({})", self.base_url)
    }

    #[tracing::instrument(skip(self))]
    async fn reverse(&self, coord: Coordinate) -> Result<AddressDetails, LookupError> {
        let url = format!("{}/reverse", self.base_url);
        trace!("Fetching address through {}…", url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coord.lat.to_string()),
                ("lon", coord.lon.to_string()),
                ("zoom", ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header(ACCEPT_LANGUAGE, LANGUAGE)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Http(status));
        }

        let body: ReverseResponse = resp
            .json()
            .await
            .map_err(|e| LookupError::Decoding(e.to_string()))?;
        debug!("address={:?}", body.address);

        body.address.ok_or(LookupError::NoAddress)
    }
}
