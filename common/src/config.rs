//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for various configuration files for
//! `evdash`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.inner_mut()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use eyre::{eyre, Result, WrapErr};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Config filename
const CONFIG: &str = "config.hcl";

/// Main name for the directory base
const TAG: &str = "evdash";

/// Every configuration file carries a version number so we can refuse old formats.
///
pub trait Versioned {
    fn version(&self) -> usize;
}

/// Human-readable durations in configuration files, e.g. `"1s"` or `"500ms"`.
///
pub fn parse_duration(s: &str) -> Result<Duration> {
    humantime::parse_duration(s.trim()).wrap_err_with(|| format!("bad duration {s:?}"))
}

/// Configuration for the CLI tool.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned + Default> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    /// File actually loaded, if any
    loaded: Option<PathBuf>,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned + Default,
{
    #[tracing::instrument]
    fn new(tag: &str) -> Self {
        let basedir: PathBuf = match BaseDirs::new() {
            Some(base) => {
                #[cfg(unix)]
                let base = base.home_dir().join(".config");

                #[cfg(windows)]
                let base = base.data_local_dir().to_path_buf();

                debug!("base = {base:?}");
                crate::makepath!(base, tag)
            }
            // No home directory at all, look in the current one.
            //
            None => crate::makepath!(".", tag),
        };
        ConfigFile {
            tag: String::from(tag),
            basedir,
            loaded: None,
            inner: T::default(),
        }
    }

    /// Returns the path of the default config directory
    ///
    pub fn config_path(&self) -> PathBuf {
        self.basedir.clone()
    }

    /// Returns the path of the default config file
    ///
    pub fn default_file(&self) -> PathBuf {
        let cfg = self.config_path().join(CONFIG);
        debug!("default = {cfg:?}");
        cfg
    }

    /// Project tag
    ///
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// File we got our data from, `None` means built-in defaults.
    ///
    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (base on $HOME or $LOCALAPPDATA)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let mut cfg = ConfigFile::<T>::new(TAG);

        let fname = match fname {
            Some(fname) => fname.to_path_buf(),
            None => cfg.default_file(),
        };

        if !fname.exists() {
            return Err(eyre!(
                "Unknown config file {:?} and no default in {:?}",
                fname,
                cfg.default_file()
            ));
        }
        let fname = fname.canonicalize()?;

        trace!("Loading config file {fname:?} from {:?}", cfg.config_path());

        let data = fs::read_to_string(&fname)?;
        cfg.inner = Self::parse(&data)?;
        cfg.loaded = Some(fname);
        Ok(cfg)
    }

    /// Same as `load()` but if no file is specified and there is no default one, use the
    /// built-in defaults.  An explicitly named file must exist.
    ///
    #[tracing::instrument]
    pub fn load_or_default(fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let cfg = ConfigFile::<T>::new(TAG);
        if fname.is_none() && !cfg.default_file().exists() {
            debug!("no configuration file, using defaults");
            return Ok(cfg);
        }
        Self::load(fname)
    }

    /// Decode and check the version.
    ///
    pub fn parse(data: &str) -> Result<T> {
        let data: T = hcl::from_str(data)?;
        debug!("struct data = {data:?}");

        let def = T::default();
        if data.version() != def.version() {
            return Err(eyre!(
                "Bad config file version {}, expected {}",
                data.version(),
                def.version()
            ));
        }
        Ok(data)
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Return the inner configuration file as putable
    ///
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the wrapper
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}
