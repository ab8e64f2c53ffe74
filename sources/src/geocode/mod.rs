//! Reverse geocoding of vehicle positions into short locality names.
//!
//! The `AddressResolver` sits in front of a `ReverseGeocoder` and an `AddressCache`:
//!
//! - a coordinate already resolved is answered from the cache, no delay, no network
//! - otherwise we wait `delay` (usage policy of the public services) then ask once
//! - failures are never cached, the next call for the same coordinate tries again
//! - concurrent callers for the same coordinate share the same in-flight lookup
//!
//! The cache is created by the application and handed over as an `Arc`, it lives as long as
//! whoever holds it.  There is no eviction.
//!

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use evdash_common::{CoordKey, Coordinate};

use crate::{LookupError, Stats};

pub use nominatim::*;

mod nominatim;

/// Delay before every network lookup
pub const DEF_DELAY: Duration = Duration::from_secs(1);

/// Anything able to turn a coordinate into address details.
///
#[async_trait]
pub trait ReverseGeocoder: Debug + Send + Sync {
    /// Return the name of the service
    fn name(&self) -> String;
    /// Single lookup, no caching.
    async fn reverse(&self, coord: Coordinate) -> Result<AddressDetails, LookupError>;
}

/// The parts of an address we use.
///
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct AddressDetails {
    pub city: Option<String>,
    pub town: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

impl AddressDetails {
    /// Most specific non-empty locality: city > town > suburb > neighbourhood > county.
    ///
    pub fn locality(&self) -> &str {
        [
            &self.city,
            &self.town,
            &self.suburb,
            &self.neighbourhood,
            &self.county,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
    }

    /// "Locality, State", or whichever of the two is there.
    ///
    pub fn label(&self) -> String {
        let locality = self.locality();
        let state = self.state.as_deref().unwrap_or_default();
        match (locality.is_empty(), state.is_empty()) {
            (false, false) => format!("{locality}, {state}"),
            (false, true) => locality.to_string(),
            (true, _) => state.to_string(),
        }
    }
}

/// Shared cache, one write-once cell per encoded coordinate.
///
#[derive(Debug, Default)]
pub struct AddressCache {
    entries: Mutex<HashMap<CoordKey, Arc<OnceCell<String>>>>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved address for this key, if any
    ///
    pub fn get(&self, key: &CoordKey) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    #[inline]
    pub fn contains(&self, key: &CoordKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of resolved entries, in-flight lookups are not counted.
    ///
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find or create the cell for `key`.
    ///
    fn slot(&self, key: &CoordKey) -> Arc<OnceCell<String>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key.clone()).or_default().clone()
    }

    /// Drop an empty cell after a failed lookup unless someone else is waiting on it.
    ///
    /// The caller still holds `slot`, hence the count of 2 with the map's own reference.
    ///
    fn forget(&self, key: &CoordKey, slot: &Arc<OnceCell<String>>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cell) = entries.get(key) {
            if Arc::ptr_eq(cell, slot) && !cell.initialized() && Arc::strong_count(cell) <= 2 {
                trace!("forget {}", key);
                entries.remove(key);
            }
        }
    }
}

/// Cached, rate-limited front for a `ReverseGeocoder`.
///
#[derive(Debug)]
pub struct AddressResolver {
    geocoder: Box<dyn ReverseGeocoder>,
    cache: Arc<AddressCache>,
    delay: Duration,
    hits: AtomicU32,
    miss: AtomicU32,
    err: AtomicU32,
}

impl AddressResolver {
    pub fn new(geocoder: Box<dyn ReverseGeocoder>, cache: Arc<AddressCache>) -> Self {
        AddressResolver {
            geocoder,
            cache,
            delay: DEF_DELAY,
            hits: AtomicU32::new(0),
            miss: AtomicU32::new(0),
            err: AtomicU32::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[inline]
    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.hits.load(Ordering::Relaxed),
            miss: self.miss.load(Ordering::Relaxed),
            err: self.err.load(Ordering::Relaxed),
        }
    }

    /// Turn a coordinate into a "Locality, State" string.
    ///
    #[tracing::instrument(skip(self), fields(geocoder = %self.geocoder.name()))]
    pub async fn resolve(&self, coord: Coordinate) -> Result<String, LookupError> {
        let key = coord.key();
        let slot = self.cache.slot(&key);

        if let Some(address) = slot.get() {
            trace!("cache hit for {}", key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(address.clone());
        }

        // Set only if this call does the lookup, the others waited for someone else's
        //
        let mut ran = false;
        let res = slot
            .get_or_try_init(|| {
                ran = true;
                async {
                    self.miss.fetch_add(1, Ordering::Relaxed);
                    debug!("cache miss for {}, waiting {:?}", key, self.delay);
                    tokio::time::sleep(self.delay).await;

                    let details = self.geocoder.reverse(coord).await?;
                    Ok::<_, LookupError>(details.label())
                }
            })
            .await;

        match res {
            Ok(address) => {
                if !ran {
                    trace!("shared lookup for {}", key);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                }
                Ok(address.clone())
            }
            Err(e) => {
                self.err.fetch_add(1, Ordering::Relaxed);
                debug!("lookup failed for {}: {}", key, e);
                self.cache.forget(&key, &slot);
                Err(e)
            }
        }
    }
}
