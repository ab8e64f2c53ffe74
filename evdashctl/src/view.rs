//! The `/vehicles` page.
//!
//! `VehiclesView` owns everything the page needs between two renders:
//!
//! - the current page number and committed `Filter`
//! - the state of the last query
//! - the location map, encoded coordinate to city name, fed by the row binders
//!
//! Rendering is a pure function of that state, it never waits for anything.  Locations not
//! resolved yet are shown as `Loading...`.
//!
//! Binding the rows spawns one task per new coordinate and returns at once, the page can be
//! shown right away.  `settle()` collects those tasks and merges what they reported.
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use strum::Display;
use tabled::builder::Builder;
use tabled::settings::Style;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use evdash_common::{CoordKey, Coordinate};
use evdash_sources::{AddressResolver, Filter, VehicleData, DEF_LIMIT};

use crate::binder::{location_channel, Binding, LocationBinder, LocationReport, LocationSink};
use crate::form::provider_options;
use crate::query::{QueryState, VehicleQuery};

/// Shown until the location is known
pub const PLACEHOLDER: &str = "Loading...";

/// Only thing shown when the fetch fails
pub const ERROR_PAGE: &str = "Error loading vehicles data";

/// Display format of timestamps
const TIME_FMT: &str = "%d %b %Y %H:%M:%S";

/// IST is UTC+05:30
const IST_OFFSET: i32 = 5 * 3600 + 30 * 60;

const HEADER: [&str; 7] = [
    "Timestamp (IST)",
    "OEM",
    "Vehicle",
    "Odometer",
    "Battery",
    "Status",
    "Location",
];

/// Colour of the battery gauge
///
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum BatteryLevel {
    Low,
    Medium,
    High,
}

impl From<f64> for BatteryLevel {
    fn from(soc: f64) -> Self {
        if soc <= 20. {
            BatteryLevel::Low
        } else if soc <= 50. {
            BatteryLevel::Medium
        } else {
            BatteryLevel::High
        }
    }
}

#[derive(Debug)]
pub struct VehiclesView {
    page: u32,
    filter: Filter,
    state: QueryState,
    /// Encoded coordinate to city
    locations: BTreeMap<CoordKey, String>,
    /// One per row slot
    binders: Vec<LocationBinder>,
    sink: LocationSink,
    reports: UnboundedReceiver<LocationReport>,
    /// Lookups started and not collected yet
    pending: Vec<JoinHandle<Binding>>,
    /// Rows shown while loading
    rows: usize,
    links: bool,
}

impl Default for VehiclesView {
    fn default() -> Self {
        Self::new(Filter::unfiltered())
    }
}

impl VehiclesView {
    /// Fresh page, locations start empty.
    ///
    pub fn new(filter: Filter) -> Self {
        let (sink, reports) = location_channel();
        VehiclesView {
            page: 1,
            filter,
            state: QueryState::Idle,
            locations: BTreeMap::new(),
            binders: vec![],
            sink,
            reports,
            pending: vec![],
            rows: DEF_LIMIT as usize,
            links: false,
        }
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows as usize;
        self
    }

    pub fn with_links(mut self, links: bool) -> Self {
        self.links = links;
        self
    }

    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    #[inline]
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    #[inline]
    pub fn locations(&self) -> &BTreeMap<CoordKey, String> {
        &self.locations
    }

    /// New committed filter, back to the first page.
    ///
    pub fn set_filter(&mut self, filter: Filter) {
        debug!("new filter {}", filter);
        self.filter = filter;
        self.page = 1;
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1 && !self.state.is_loading()
    }

    pub fn can_next(&self) -> bool {
        if self.state.is_loading() {
            return false;
        }
        match self.state.total_pages() {
            Some(total) => self.page != total,
            None => false,
        }
    }

    /// `false` if the control is disabled
    ///
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Jump to `page`, only within known bounds.
    ///
    pub fn goto(&mut self, page: u32) -> bool {
        let max = self.state.total_pages().unwrap_or(1);
        if page == 0 || page > max || self.state.is_loading() {
            return false;
        }
        self.page = page;
        true
    }

    /// Only used before the first query of a one-shot page.
    ///
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn begin_load(&mut self) {
        self.state = QueryState::Loading;
    }

    /// Fetch the current page with the current filter.
    ///
    #[tracing::instrument(skip_all, fields(page = self.page))]
    pub async fn load(&mut self, query: &VehicleQuery) {
        self.begin_load();
        self.state = query.run(self.page, &self.filter).await;
    }

    /// Bind every row to its coordinate and start the lookups, without waiting for them.
    /// Rows whose coordinate did not change do not trigger anything.  Returns the number of
    /// lookups started.
    ///
    #[tracing::instrument(skip_all)]
    pub fn bind_locations(&mut self, resolver: Arc<AddressResolver>) -> usize {
        let coords: Vec<Coordinate> = match self.state.data() {
            Some(data) => data.data.iter().map(VehicleData::coordinate).collect(),
            None => return 0,
        };

        while self.binders.len() < coords.len() {
            self.binders.push(LocationBinder::new(self.sink.clone()));
        }

        let lookups: Vec<_> = coords
            .iter()
            .zip(self.binders.iter())
            .filter_map(|(&coord, binder)| binder.bind(coord, resolver.clone()))
            .map(tokio::spawn)
            .collect();
        trace!("{} lookups for {} rows", lookups.len(), coords.len());

        let n = lookups.len();
        self.pending.extend(lookups);
        n
    }

    /// `true` if no lookup is outstanding
    ///
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for every outstanding lookup and merge what they reported.
    ///
    #[tracing::instrument(skip_all, fields(pending = self.pending.len()))]
    pub async fn settle(&mut self) -> Vec<Binding> {
        let pending = std::mem::take(&mut self.pending);
        let res = join_all(pending)
            .await
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|e| {
                    warn!("location lookup aborted: {}", e);
                    Binding::Failed
                })
            })
            .collect();
        self.apply_reports();
        res
    }

    /// Merge pending reports into the location map, only the city is kept.
    ///
    pub fn apply_reports(&mut self) -> usize {
        let mut n = 0;
        while let Ok((key, address)) = self.reports.try_recv() {
            let city = address.split(',').next().unwrap_or_default().trim();
            if city.is_empty() {
                continue;
            }
            trace!("{} is {}", key, city);
            self.locations.insert(key, city.to_string());
            n += 1;
        }
        n
    }

    /// City for this position or the placeholder.
    ///
    pub fn location_label(&self, coord: &Coordinate) -> &str {
        self.locations
            .get(&coord.key())
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER)
    }

    /// Choices for the provider field
    ///
    pub fn providers(&self) -> Vec<String> {
        match self.state.data() {
            Some(data) => provider_options(&data.data),
            None => provider_options(&[]),
        }
    }

    pub fn footer(&self) -> String {
        let total = self
            .state
            .data()
            .map(|d| d.pagination.total_pages.to_string())
            .unwrap_or("-".to_string());
        let ctl = |on: bool| if on { "enabled" } else { "disabled" };
        format!(
            "Page {} of {} | prev: {} | next: {}",
            self.page,
            total,
            ctl(self.can_prev()),
            ctl(self.can_next())
        )
    }

    /// The whole page as text.
    ///
    pub fn render(&self) -> String {
        let mut header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
        if self.links {
            header.push("Map".to_string());
        }

        let mut builder = Builder::default();
        builder.push_record(header.clone());

        match &self.state {
            QueryState::Failed(_) => return ERROR_PAGE.to_string(),
            QueryState::Idle => {
                builder.push_record(["No filter applied".to_string()]);
            }
            QueryState::Loading => {
                for _ in 0..self.rows {
                    builder.push_record(vec!["...".to_string(); header.len()]);
                }
            }
            QueryState::Ready(data) => {
                if data.data.is_empty() {
                    builder.push_record(["No vehicles found".to_string()]);
                }
                for v in data.data.iter() {
                    builder.push_record(self.row(v));
                }
            }
        }

        let table = builder.build().with(Style::modern()).to_string();
        format!("Vehicles\n{}\n{}\n", table, self.footer())
    }

    fn row(&self, v: &VehicleData) -> Vec<String> {
        let coord = v.coordinate();
        let mut row = vec![
            ist_timestamp(&v.timestamp),
            v.oem_provider.clone(),
            format!("ID: {}\nReg: {}", v.vehicle_id, v.registration_number),
            format!("{:.1} km", v.odometer),
            format!("{}% ({})", v.battery_soc, BatteryLevel::from(v.battery_soc)),
            format!("{}\n{:.1} km/h", v.vehicle_status, v.speed),
            format!("{}\n{}", self.location_label(&coord), coord),
        ];
        if self.links {
            row.push(coord.maps_link());
        }
        row
    }
}

/// `dd Mon yyyy HH:MM:SS` in IST, the raw string if we can not parse it.
///
pub fn ist_timestamp(ts: &str) -> String {
    let Some(ist) = FixedOffset::east_opt(IST_OFFSET) else {
        return ts.to_string();
    };
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&ist).format(TIME_FMT).to_string(),
        Err(_) => ts.to_string(),
    }
}
