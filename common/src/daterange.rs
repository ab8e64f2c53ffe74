//! Module handling date ranges
//!
//! Filters work on whole days: the beginning of a range is normalised to the start of its day,
//! the end to the end of its day.  Either side can be absent.
//!

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use tracing::trace;

/// Format for the instants we send to the API, same as JS `toISOString()`.
const ISO_INSTANT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("bad date: {0}")]
    BadDate(String),
    #[error("bad interval {0}, need single or couple dates")]
    BadInterval(String),
    #[error("interval ends ({1}) before it starts ({0})")]
    Inverted(NaiveDate, NaiveDate),
}

/// A possibly open range of days.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DateError> {
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(DateError::Inverted(s, e));
            }
        }
        Ok(DateRange { start, end })
    }

    /// Single day
    ///
    pub fn day(date: NaiveDate) -> Self {
        DateRange {
            start: Some(date),
            end: Some(date),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Start of the first day as an ISO-8601 instant
    ///
    pub fn start_instant(&self) -> Option<String> {
        self.start.map(|d| iso_instant(&start_of_day(d)))
    }

    /// Last millisecond of the last day as an ISO-8601 instant
    ///
    pub fn end_instant(&self) -> Option<String> {
        self.end.map(|d| iso_instant(&end_of_day(d)))
    }
}

/// Midnight UTC
///
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// 23:59:59.999 UTC
///
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

#[inline]
pub fn iso_instant(dt: &DateTime<Utc>) -> String {
    dt.format(ISO_INSTANT).to_string()
}

/// Parse a single date, `YYYY-MM-DD` first then anything `dateparser` understands.
///
#[tracing::instrument]
pub fn parse_date(date: &str) -> Result<NaiveDate, DateError> {
    let date = date.trim();
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Ok(d);
    }
    trace!("not a plain date, trying dateparser");
    dateparser::parse_with_timezone(date, &Utc)
        .map(|dt| dt.date_naive())
        .map_err(|_| DateError::BadDate(date.to_string()))
}

/// Split `begin..end` into its parts.  `begin..` or `begin` means a single day.
///
pub fn parse_range(date: &str) -> Result<(String, String), DateError> {
    let intv: Vec<&str> = date.split("..").collect();
    let (start, end) = match intv.len() {
        1 => (intv[0], intv[0]),
        2 => (intv[0], intv[1]),
        _ => return Err(DateError::BadInterval(date.to_string())),
    };
    if start.is_empty() {
        return Err(DateError::BadInterval(date.to_string()));
    }
    // if end is empty, we had only "DDDD.." so return start both times
    //
    if end.is_empty() {
        Ok((start.to_string(), start.to_string()))
    } else {
        Ok((start.to_string(), end.to_string()))
    }
}

/// Parse and validate both sides of an interval
///
#[tracing::instrument]
pub fn parse_interval(date: &str) -> Result<DateRange, DateError> {
    let (start, end) = parse_range(date)?;

    let start = parse_date(&start)?;
    let end = parse_date(&end)?;

    DateRange::new(Some(start), Some(end))
}
