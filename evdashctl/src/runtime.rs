//! Runtime setup: logging, configuration and the shared services every command uses.
//!

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;
use tracing::{debug, info, trace};

use evdash_common::{close_logging, init_logging, parse_duration, ConfigFile};
use evdash_sources::{
    build_client, default_user_agent, AddressCache, AddressResolver, Nominatim, TelemetryApi,
};

use crate::cli::Opts;
use crate::config::Config;
use crate::error::Status;
use crate::query::VehicleQuery;

/// Context holds the shared state for the whole run.
///
/// The address cache is created here and only here, everything else gets it through the
/// resolver.
///
#[derive(Clone)]
pub struct Context {
    /// Final configuration, file and flags merged
    pub config: Config,
    /// Configuration file, `None` for the defaults
    pub loaded: Option<PathBuf>,
    pub api: TelemetryApi,
    pub resolver: Arc<AddressResolver>,
}

impl Context {
    /// Build the HTTP clients and services from `config`.
    ///
    #[tracing::instrument]
    pub fn new(config: Config) -> Result<Context> {
        if config.api.limit == 0 {
            return Err(Status::BadParameter("api.limit", "0".to_string()).into());
        }
        let timeout = parse_duration(&config.api.timeout)?;
        let delay = parse_duration(&config.geocoder.delay)?;

        let client = build_client(&default_user_agent(), Some(timeout))?;
        let api = TelemetryApi::new(&config.api.url, client).with_limit(config.api.limit);

        // Nominatim requires an identifying user-agent.  No ceiling there, a slow lookup only
        // keeps one row on its placeholder.
        //
        let client = build_client(&config.geocoder.user_agent, None)?;
        let geocoder = Nominatim::new(&config.geocoder.url, client);

        let cache = Arc::new(AddressCache::new());
        let resolver = AddressResolver::new(Box::new(geocoder), cache).with_delay(delay);
        debug!("delay={:?} timeout={:?}", delay, timeout);

        Ok(Context {
            config,
            loaded: None,
            api,
            resolver: Arc::new(resolver),
        })
    }

    pub fn query(&self) -> VehicleQuery {
        VehicleQuery::new(self.api.clone())
    }

    /// Log what the resolver did and close logging.
    ///
    #[tracing::instrument(skip(self))]
    pub fn finish(&self) -> Result<()> {
        info!(
            "geocoding: {} cached={}",
            self.resolver.stats(),
            self.resolver.cache().len()
        );
        close_logging();
        Ok(())
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("loaded", &self.loaded)
            .field("api", &self.config.api.url)
            .field("geocoder", &self.config.geocoder.url)
            .finish()
    }
}

/// Flags win over the file
///
pub fn merge_opts(mut config: Config, opts: &Opts) -> Config {
    if let Some(url) = &opts.api_url {
        config.api.url = url.clone();
    }
    if let Some(url) = &opts.geocoder_url {
        config.geocoder.url = url.clone();
    }
    if let Some(delay) = &opts.delay {
        config.geocoder.delay = delay.clone();
    }
    config
}

/// Start logging, load the configuration and build the `Context`.
///
#[tracing::instrument(skip(opts))]
pub fn init_runtime(name: &'static str, opts: &Opts) -> Result<Context> {
    // Initialise logging early
    //
    init_logging(
        name,
        opts.verbosity(),
        opts.use_tree,
        opts.use_file.clone(),
    )?;

    let cfile = ConfigFile::<Config>::load_or_default(opts.config.as_deref())?;
    trace!("config from {:?}", cfile.loaded());

    let loaded = cfile.loaded().map(|p| p.to_path_buf());
    let config = merge_opts(cfile.into_inner(), opts);

    let mut ctx = Context::new(config)?;
    ctx.loaded = loaded;
    info!("Using {:?}", ctx);
    Ok(ctx)
}
