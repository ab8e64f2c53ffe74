//! Common logging initializer
//!

use eyre::Result;
use tracing::trace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Set up the `tracing` registry.
///
/// - filters come from `RUST_LOG`, if unset `verbose` gives the level
/// - either a compact one-line format or a hierarchical tree on stderr
/// - optionally an hourly rolling file in `use_file`
///
#[tracing::instrument]
pub fn init_logging(
    name: &'static str,
    verbose: u8,
    use_tree: bool,
    use_file: Option<String>,
) -> Result<()> {
    // Load filters from environment
    //
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    // Do we want hierarchical output?
    //
    let (tree, compact) = if use_tree {
        let tree = HierarchicalLayer::new(2)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_span_retrace(true)
            .with_span_modes(true)
            .with_targets(true)
            .with_verbose_entry(true)
            .with_verbose_exit(true)
            .with_bracketed_fields(true);
        (Some(tree), None)
    } else {
        let compact = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact();
        (None, Some(compact))
    };

    // Log to file?
    //
    let file = use_file.map(|dir| {
        // Basic append-only rolling file for all traces.
        //
        let file_appender = tracing_appender::rolling::hourly(dir, name);
        fmt::layer().with_ansi(false).with_writer(file_appender)
    });

    // Combine filters & exporters
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(compact)
        .with(file)
        .try_init()?;
    trace!("Logging initialised.");

    Ok(())
}

/// `-v` counts
///
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Nothing is buffered outside of the subscriber for now, this is just the counterpart of
/// `init_logging()`.
///
#[tracing::instrument]
pub fn close_logging() {
    trace!("Logging closed.");
}
