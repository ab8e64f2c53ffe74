//! Library part of the `evdash` utility.
//!
//! The binary is a terminal rendition of the vehicles dashboard: one page of telemetry at a
//! time, filtered by dates, provider and vehicle, with a locality name for every position.
//!
//! - `route` decides which page a path leads to
//! - `form` holds the filter draft until it is applied
//! - `query` fetches the data for the committed filter
//! - `binder` resolves the location of each row, once per coordinate
//! - `view` puts it all together and renders the page
//!

pub use binder::*;
pub use cli::*;
pub use cmds::*;
pub use config::*;
pub use error::*;
pub use form::*;
pub use query::*;
pub use route::*;
pub use runtime::*;
pub use view::*;

mod binder;
mod cli;
mod cmds;
mod config;
mod error;
mod form;
mod query;
mod route;
mod runtime;
mod view;
