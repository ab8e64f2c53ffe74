//! Module describing all possible commands and sub-commands to the `evdash` main driver
//!
//! We have three main commands:
//!
//! - `vehicles` renders one page of telemetry and exits
//! - `dashboard` is the interactive session, reading commands on stdin
//! - `resolve` turns one coordinate into a locality name
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_version, Parser};
use clap_complete::shells::Shell;

use evdash_common::DateOpts;

/// CLI options
#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
#[clap(name = "evdash", about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// debug mode.
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Hierarchical logs.
    #[clap(long = "tree")]
    pub use_tree: bool,
    /// Also log into hourly files in this directory.
    #[clap(long = "log-dir")]
    pub use_file: Option<String>,
    /// Telemetry API base URL.
    #[clap(long)]
    pub api_url: Option<String>,
    /// Reverse geocoding service base URL.
    #[clap(long)]
    pub geocoder_url: Option<String>,
    /// Wait before every geocoding request, e.g. "1s" or "0s".
    #[clap(long)]
    pub delay: Option<String>,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

impl Opts {
    /// `-D` is at least `-vv`
    ///
    pub fn verbosity(&self) -> u8 {
        if self.debug {
            self.verbose.max(2)
        } else {
            self.verbose
        }
    }
}

// ------

/// All sub-commands:
///
/// `completion SHELL`
/// `dashboard [--start PATH]`
/// `resolve LAT LON`
/// `vehicles [-B date] [-E date] [--range a..b] [--today|--yesterday] [-p provider] [-i id] [-P page]`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Interactive dashboard
    Dashboard(DashboardOpts),
    /// Reverse geocode one position
    Resolve(ResolveOpts),
    /// Display one page of vehicles data
    Vehicles(VehiclesOpts),
    /// List all package versions
    Version,
}

// ------

/// Filters and display options for a single page.
///
#[derive(Clone, Debug, Parser)]
pub struct VehiclesOpts {
    /// Start the data at specified date (optional)
    #[clap(short = 'B', long)]
    pub begin: Option<String>,
    /// End date (optional)
    #[clap(short = 'E', long)]
    pub end: Option<String>,
    /// Interval as `begin..end`
    #[clap(long, conflicts_with_all = ["begin", "end", "today", "yesterday"])]
    pub range: Option<String>,
    /// We want today only
    #[clap(long, conflicts_with_all = ["begin", "end", "yesterday"])]
    pub today: bool,
    /// We want yesterday only
    #[clap(long, conflicts_with_all = ["begin", "end"])]
    pub yesterday: bool,
    /// OEM provider, `all` for every one
    #[clap(short = 'p', long)]
    pub provider: Option<String>,
    /// Single vehicle
    #[clap(short = 'i', long)]
    pub vehicle_id: Option<String>,
    /// Page to display
    #[clap(short = 'P', long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
    /// Do not resolve locations
    #[clap(long)]
    pub no_geocode: bool,
    /// Add a column with a map link for each position
    #[clap(long)]
    pub links: bool,
}

impl VehiclesOpts {
    /// Which kind of date specification we got
    ///
    pub fn date_opts(&self) -> DateOpts {
        if self.today {
            DateOpts::Today
        } else if self.yesterday {
            DateOpts::Yesterday
        } else if let Some(range) = &self.range {
            DateOpts::Range {
                range: range.clone(),
            }
        } else {
            DateOpts::From {
                begin: self.begin.clone(),
                end: self.end.clone(),
            }
        }
    }
}

// ------

#[derive(Debug, Parser)]
pub struct DashboardOpts {
    /// Page to open first, `/` goes to `/vehicles`
    #[clap(long, default_value = "/")]
    pub start: String,
}

// ------

#[derive(Debug, Parser)]
#[command(allow_negative_numbers = true)]
pub struct ResolveOpts {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
