use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use tracing::trace;

use crate::{parse_date, parse_interval, DateError, DateRange};

/// Enum of supported options for the date formats.
///
#[derive(Clone, Debug, Parser)]
pub enum DateOpts {
    /// Basic from to, either side optional
    From {
        begin: Option<String>,
        end: Option<String>,
    },
    /// Interval as `begin..end`
    Range { range: String },
    /// Specific day
    Day { date: String },
    /// Shortcut for today
    Today,
    /// Shortcut to yesterday
    Yesterday,
}

impl DateOpts {
    /// Parse options and return a range of days
    ///
    #[tracing::instrument]
    pub fn parse(opts: Self) -> Result<DateRange, DateError> {
        Self::parse_at(opts, Utc::now().date_naive())
    }

    /// Same as `parse()` with an explicit "today", makes testing easier.
    ///
    pub fn parse_at(opts: Self, today: NaiveDate) -> Result<DateRange, DateError> {
        Ok(match opts {
            DateOpts::Today => {
                trace!("got today {}", today);
                DateRange::day(today)
            }
            DateOpts::Yesterday => {
                let yest = today
                    .checked_sub_days(Days::new(1))
                    .ok_or_else(|| DateError::BadDate(today.to_string()))?;
                trace!("got yesterday {}", yest);
                DateRange::day(yest)
            }
            DateOpts::Day { date } => {
                trace!("Got day {}", date);
                DateRange::day(parse_date(&date)?)
            }
            DateOpts::Range { range } => {
                trace!("Got range {}", range);
                parse_interval(&range)?
            }
            DateOpts::From { begin, end } => {
                trace!("Got from {:?} to {:?}", begin, end);
                let begin = begin.as_deref().map(parse_date).transpose()?;
                let end = end.as_deref().map(parse_date).transpose()?;
                DateRange::new(begin, end)?
            }
        })
    }
}
