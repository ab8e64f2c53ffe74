//! The filter form.
//!
//! Everything typed goes into a draft, the committed `Filter` only changes on `apply()`.
//!

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use tracing::{debug, trace};

use evdash_common::{parse_date, parse_interval, DateError, DateRange};
use evdash_sources::{Filter, VehicleData};

/// Provider value meaning "no provider filter"
pub const ALL: &str = "all";

/// Always offered, whatever the data contains
pub const PROVIDERS: &[&str] = &[ALL, "Switch", "Tata"];

/// `-` empties a field
const NONE: &str = "-";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterForm {
    begin: Option<NaiveDate>,
    end: Option<NaiveDate>,
    provider: String,
    vehicle_id: String,
}

impl Default for FilterForm {
    fn default() -> Self {
        FilterForm {
            begin: None,
            end: None,
            provider: ALL.to_string(),
            vehicle_id: String::new(),
        }
    }
}

impl FilterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dates(&mut self, dates: DateRange) {
        self.begin = dates.start;
        self.end = dates.end;
    }

    /// `a..b`, `a..` or a single day
    ///
    pub fn set_range(&mut self, range: &str) -> Result<(), DateError> {
        self.set_dates(parse_interval(range)?);
        Ok(())
    }

    pub fn set_begin(&mut self, date: &str) -> Result<(), DateError> {
        self.begin = parse_optional(date)?;
        Ok(())
    }

    pub fn set_end(&mut self, date: &str) -> Result<(), DateError> {
        self.end = parse_optional(date)?;
        Ok(())
    }

    pub fn set_provider(&mut self, provider: &str) {
        let provider = provider.trim();
        self.provider = if provider.is_empty() || provider == NONE {
            ALL.to_string()
        } else {
            provider.to_string()
        };
    }

    pub fn set_vehicle(&mut self, id: &str) {
        let id = id.trim();
        self.vehicle_id = if id == NONE { String::new() } else { id.to_string() };
    }

    /// Back to an empty draft, the committed filter is not touched.
    ///
    pub fn clear(&mut self) {
        trace!("clear form");
        *self = Self::default();
    }

    /// Commit the draft into a new `Filter`.
    ///
    /// `all` is no provider at all and an empty id no vehicle filter.
    ///
    #[tracing::instrument(skip(self))]
    pub fn apply(&self) -> Result<Filter, DateError> {
        let dates = DateRange::new(self.begin, self.end)?;
        let provider = if self.provider.eq_ignore_ascii_case(ALL) {
            None
        } else {
            Some(self.provider.clone())
        };
        let vehicle_id = if self.vehicle_id.is_empty() {
            None
        } else {
            Some(self.vehicle_id.clone())
        };

        let filter = Filter {
            dates,
            provider,
            vehicle_id,
            applied: true,
        };
        debug!("applied {}", filter);
        Ok(filter)
    }
}

impl Display for FilterForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or(NONE.to_string());
        let id = if self.vehicle_id.is_empty() {
            NONE
        } else {
            self.vehicle_id.as_str()
        };
        write!(
            f,
            "begin={} end={} provider={} vehicle={}",
            date(self.begin),
            date(self.end),
            self.provider,
            id
        )
    }
}

fn parse_optional(date: &str) -> Result<Option<NaiveDate>, DateError> {
    match date.trim() {
        "" | NONE => Ok(None),
        d => parse_date(d).map(Some),
    }
}

/// Fixed choices first then every provider seen in `data`, in order, no duplicates.
///
pub fn provider_options(data: &[VehicleData]) -> Vec<String> {
    let mut list: Vec<String> = PROVIDERS.iter().map(|s| s.to_string()).collect();
    for v in data {
        if !v.oem_provider.is_empty() && !list.contains(&v.oem_provider) {
            list.push(v.oem_provider.clone());
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_form_default_applies_to_nothing() {
        let f = FilterForm::new().apply().unwrap();
        assert!(f.applied);
        assert!(f.params().is_empty());
    }

    #[rstest]
    #[case("all", None)]
    #[case("ALL", None)]
    #[case("", None)]
    #[case("-", None)]
    #[case("Tata", Some("Tata"))]
    #[case(" Switch ", Some("Switch"))]
    fn test_form_provider(#[case] inp: &str, #[case] out: Option<&str>) {
        let mut form = FilterForm::new();
        form.set_provider(inp);
        assert_eq!(out.map(String::from), form.apply().unwrap().provider);
    }

    #[rstest]
    #[case("", None)]
    #[case("  ", None)]
    #[case("-", None)]
    #[case("EV-42", Some("EV-42"))]
    fn test_form_vehicle(#[case] inp: &str, #[case] out: Option<&str>) {
        let mut form = FilterForm::new();
        form.set_vehicle(inp);
        assert_eq!(out.map(String::from), form.apply().unwrap().vehicle_id);
    }

    #[test]
    fn test_form_draft_not_committed() {
        let committed = FilterForm::new().apply().unwrap();

        let mut form = FilterForm::new();
        form.set_provider("Tata");
        form.set_vehicle("EV-42");
        // Nothing changes until apply
        assert_eq!(None, committed.provider);

        let next = form.apply().unwrap();
        assert_eq!(
            vec![
                ("oem_provider", "Tata".to_string()),
                ("vehicle_id", "EV-42".to_string())
            ],
            next.params()
        );
    }

    #[test]
    fn test_form_clear_keeps_committed() {
        let mut form = FilterForm::new();
        form.set_provider("Switch");
        let committed = form.apply().unwrap();
        form.clear();
        assert_eq!(FilterForm::default(), form);
        assert_eq!(Some("Switch".to_string()), committed.provider);
    }

    #[test]
    fn test_form_partial_range() {
        let mut form = FilterForm::new();
        form.set_begin("2024-03-01").unwrap();
        let f = form.apply().unwrap();
        assert_eq!(Some(ymd(2024, 3, 1)), f.dates.start);
        assert_eq!(None, f.dates.end);
        assert_eq!(
            vec![("start_date", "2024-03-01T00:00:00.000Z".to_string())],
            f.params()
        );
    }

    #[test]
    fn test_form_range() {
        let mut form = FilterForm::new();
        form.set_range("2024-03-01..2024-03-05").unwrap();
        assert_eq!(
            "begin=2024-03-01 end=2024-03-05 provider=all vehicle=-",
            form.to_string()
        );
        form.set_end("-").unwrap();
        assert_eq!(None, form.apply().unwrap().dates.end);
    }

    #[test]
    fn test_form_inverted_on_apply() {
        let mut form = FilterForm::new();
        form.set_begin("2024-03-05").unwrap();
        form.set_end("2024-03-01").unwrap();
        assert_eq!(
            Err(DateError::Inverted(ymd(2024, 3, 5), ymd(2024, 3, 1))),
            form.apply()
        );
    }

    #[test]
    fn test_form_bad_date() {
        let mut form = FilterForm::new();
        assert!(form.set_begin("someday").is_err());
        assert_eq!(FilterForm::default(), form);
    }

    fn row(provider: &str) -> VehicleData {
        VehicleData {
            vehicle_id: "V".into(),
            registration_number: "R".into(),
            timestamp: "2024-03-15T10:20:30Z".into(),
            latitude: 0.,
            longitude: 0.,
            speed: 0.,
            odometer: 0.,
            battery_soc: 50.,
            ignition_status: false,
            charging_status: 0,
            distance_to_empty: None,
            vehicle_status: "stopped".into(),
            oem_provider: provider.into(),
        }
    }

    #[test]
    fn test_provider_options() {
        let data = vec![row("Tata"), row("Ather"), row("Ola"), row("Ather")];
        assert_eq!(
            vec!["all", "Switch", "Tata", "Ather", "Ola"],
            provider_options(&data)
        );
        assert_eq!(vec!["all", "Switch", "Tata"], provider_options(&[]));
    }
}
