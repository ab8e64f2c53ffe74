//! Client for the dashboard telemetry API.
//!
//! `GET /dashboard/data?page&limit&oem_provider&start_date&end_date&vehicle_id` returns one
//! page of `VehicleData` with its pagination block.
//!

use reqwest::Client;
use tracing::{debug, trace};

use crate::{ApiError, Filter, VehicleDataResponse};

/// Rows per page
pub const DEF_LIMIT: u32 = 10;

/// Where the data lives
const DATA_PATH: &str = "/dashboard/data";

#[derive(Clone, Debug)]
pub struct TelemetryApi {
    /// Base URL, without trailing slash
    base_url: String,
    /// Rows per page
    limit: u32,
    client: Client,
}

impl TelemetryApi {
    pub fn new(base_url: &str, client: Client) -> Self {
        TelemetryApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit: DEF_LIMIT,
            client,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Full list of query parameters for a given page
    ///
    pub fn query(&self, page: u32, filter: &Filter) -> Vec<(&'static str, String)> {
        let mut q = vec![("page", page.to_string()), ("limit", self.limit.to_string())];
        q.extend(filter.params());
        q
    }

    /// Fetch one page of data.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn fetch_page(
        &self,
        page: u32,
        filter: &Filter,
    ) -> Result<VehicleDataResponse, ApiError> {
        let url = format!("{}{}", self.base_url, DATA_PATH);
        let query = self.query(page, filter);
        debug!("Fetching {} with {:?}", url, query);

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        trace!("status={}", status);
        if !status.is_success() {
            return Err(ApiError::Http(status));
        }

        let data: VehicleDataResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decoding(e.to_string()))?;
        debug!(
            "got {} rows, page {}/{}",
            data.data.len(),
            data.pagination.page,
            data.pagination.total_pages
        );
        Ok(data)
    }
}
