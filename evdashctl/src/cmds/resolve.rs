//! `resolve lat lon`
//!

use eyre::Result;
use tracing::info;

use evdash_common::Coordinate;

use crate::cli::ResolveOpts;
use crate::error::Status;
use crate::runtime::Context;

pub fn check_coordinate(lat: f64, lon: f64) -> Result<Coordinate, Status> {
    if !(-90. ..=90.).contains(&lat) || !(-180. ..=180.).contains(&lon) {
        return Err(Status::BadCoordinate(lat, lon));
    }
    Ok(Coordinate::new(lat, lon))
}

/// Resolve one position, the answer is `"position: address"`.
///
#[tracing::instrument(skip(ctx))]
pub async fn resolve_one(ctx: &Context, opts: &ResolveOpts) -> Result<String> {
    let coord = check_coordinate(opts.lat, opts.lon)?;
    let address = ctx.resolver.resolve(coord).await?;
    info!("{} is {:?}", coord.key(), address);
    Ok(format!("{}: {}", coord, address))
}
