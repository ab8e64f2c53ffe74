//! sub-module to manage the filters we pass to the telemetry API
//!
//! A `Filter` is the snapshot committed by the user: a possibly open date range, a provider
//! and a vehicle ID, all optional.  It is always replaced as a whole, never modified in
//! place while a request is running.
//!
//! `applied` gates the fetch itself: nothing is requested until a filter has been applied.
//!

use std::fmt::{Display, Formatter};

use evdash_common::DateRange;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    /// Days to look at, either side can be open
    pub dates: DateRange,
    /// OEM provider
    pub provider: Option<String>,
    /// Vehicle ID
    pub vehicle_id: Option<String>,
    /// Whether a fetch should run
    pub applied: bool,
}

impl Filter {
    /// No constraint at all but still applied, this is what the main view starts with.
    ///
    pub fn unfiltered() -> Self {
        Filter {
            applied: true,
            ..Default::default()
        }
    }

    /// Query parameters for this filter, absent fields are left out.
    ///
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![];

        if let Some(provider) = &self.provider {
            params.push(("oem_provider", provider.clone()));
        }
        if let Some(start) = self.dates.start_instant() {
            params.push(("start_date", start));
        }
        if let Some(end) = self.dates.end_instant() {
            params.push(("end_date", end));
        }
        if let Some(id) = &self.vehicle_id {
            params.push(("vehicle_id", id.clone()));
        }
        params
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = vec![];

        match (self.dates.start, self.dates.end) {
            (Some(s), Some(e)) if s == e => parts.push(format!("date={s}")),
            (Some(s), Some(e)) => parts.push(format!("dates={s}..{e}")),
            (Some(s), None) => parts.push(format!("from={s}")),
            (None, Some(e)) => parts.push(format!("until={e}")),
            (None, None) => (),
        }
        if let Some(provider) = &self.provider {
            parts.push(format!("provider={provider}"));
        }
        if let Some(id) = &self.vehicle_id {
            parts.push(format!("vehicle={id}"));
        }

        if parts.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
