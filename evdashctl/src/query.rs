//! The vehicle query, a thin layer over `TelemetryApi` exposing what state the page is in.
//!

use tracing::{error, info, trace};

use evdash_sources::{ApiError, Filter, TelemetryApi, VehicleDataResponse};

/// Where a fetch stands
///
#[derive(Debug, Default)]
pub enum QueryState {
    /// No applied filter, nothing requested
    #[default]
    Idle,
    Loading,
    Failed(ApiError),
    Ready(VehicleDataResponse),
}

impl QueryState {
    #[inline]
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&VehicleDataResponse> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// `None` means we do not know yet, same as 0 for the pagination controls.
    ///
    pub fn total_pages(&self) -> Option<u32> {
        self.data()
            .map(|d| d.pagination.total_pages)
            .filter(|&n| n > 0)
    }
}

#[derive(Clone, Debug)]
pub struct VehicleQuery {
    api: TelemetryApi,
}

impl VehicleQuery {
    pub fn new(api: TelemetryApi) -> Self {
        VehicleQuery { api }
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.api.limit()
    }

    /// Fetch `page` with `filter`, nothing happens if the filter was never applied.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, page: u32, filter: &Filter) -> QueryState {
        if !filter.applied {
            trace!("filter not applied, staying idle");
            return QueryState::Idle;
        }

        info!("Fetching page {} with filter {}", page, filter);
        match self.api.fetch_page(page, filter).await {
            Ok(data) => QueryState::Ready(data),
            Err(e) => {
                error!("Error loading vehicles data: {}", e);
                QueryState::Failed(e)
            }
        }
    }
}
