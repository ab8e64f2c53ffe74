//! `vehicles` renders one page and exits.
//!

use std::io::Write;

use eyre::Result;
use tracing::{info, trace};

use evdash_common::DateOpts;
use evdash_sources::Filter;

use crate::binder::Binding;
use crate::cli::VehiclesOpts;
use crate::form::FilterForm;
use crate::runtime::Context;
use crate::view::VehiclesView;

/// Same rules as the interactive form: `all` is no provider, an empty id no vehicle.
///
#[tracing::instrument]
pub fn filter_from_opts(opts: &VehiclesOpts) -> Result<Filter> {
    let mut form = FilterForm::new();
    form.set_dates(DateOpts::parse(opts.date_opts())?);
    if let Some(provider) = &opts.provider {
        form.set_provider(provider);
    }
    if let Some(id) = &opts.vehicle_id {
        form.set_vehicle(id);
    }
    Ok(form.apply()?)
}

/// Fetch and print the requested page, then print it again once the locations are known.
/// The first print does not wait for any lookup.
///
#[tracing::instrument(skip(ctx, out))]
pub async fn show_vehicles<W: Write>(
    ctx: &Context,
    opts: &VehiclesOpts,
    out: &mut W,
) -> Result<()> {
    let filter = filter_from_opts(opts)?;
    info!("vehicles page {} filter {}", opts.page, filter);

    let query = ctx.query();
    let mut view = VehiclesView::new(filter)
        .with_rows(query.limit())
        .with_links(opts.links);
    view.set_page(opts.page);

    view.load(&query).await;
    if !opts.no_geocode {
        let n = view.bind_locations(ctx.resolver.clone());
        trace!("{} lookups started", n);
    }
    write!(out, "{}", view.render())?;
    out.flush()?;

    if view.is_settled() {
        return Ok(());
    }
    let res = view.settle().await;
    trace!("bindings: {:?}", res);
    if res.contains(&Binding::Reported) {
        write!(out, "{}", view.render())?;
        out.flush()?;
    }
    Ok(())
}
