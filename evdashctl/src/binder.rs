//! Row location binder.
//!
//! One `LocationBinder` per table row slot.  Binding it to a coordinate starts a lookup only
//! when the coordinate is not the one it already holds, the result goes back to the page
//! through a `LocationSink`.  Nothing is displayed here.
//!
//! A lookup finishing after the binder moved on to another coordinate is dropped.
//!

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};

use evdash_common::{CoordKey, Coordinate};
use evdash_sources::AddressResolver;

/// What the page gets back: encoded coordinate and full address
pub type LocationReport = (CoordKey, String);

/// Reporting handle given to every binder, clones all feed the same page.
///
#[derive(Clone, Debug)]
pub struct LocationSink(UnboundedSender<LocationReport>);

impl LocationSink {
    /// `false` if the page is gone
    ///
    pub fn report(&self, key: CoordKey, address: String) -> bool {
        self.0.send((key, address)).is_ok()
    }
}

/// Sink for the binders and receiving end for the page.
///
pub fn location_channel() -> (LocationSink, UnboundedReceiver<LocationReport>) {
    let (tx, rx) = unbounded_channel();
    (LocationSink(tx), rx)
}

/// How a lookup ended
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    /// Address sent to the page
    Reported,
    /// Resolved to nothing, not worth reporting
    Empty,
    /// Coordinate changed in the meantime
    Stale,
    Failed,
}

#[derive(Debug)]
pub struct LocationBinder {
    current: Arc<Mutex<Option<CoordKey>>>,
    sink: LocationSink,
}

impl LocationBinder {
    pub fn new(sink: LocationSink) -> Self {
        LocationBinder {
            current: Arc::new(Mutex::new(None)),
            sink,
        }
    }

    /// Coordinate we are bound to
    ///
    pub fn current(&self) -> Option<CoordKey> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bind to `coord`.  Returns the lookup to drive if the coordinate changed, `None` if
    /// we already hold it (whether its lookup succeeded or not).
    ///
    pub fn bind(
        &self,
        coord: Coordinate,
        resolver: Arc<AddressResolver>,
    ) -> Option<impl Future<Output = Binding> + Send + 'static> {
        let key = coord.key();
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if current.as_ref() == Some(&key) {
                trace!("already bound to {}", key);
                return None;
            }
            *current = Some(key.clone());
        }

        let current = self.current.clone();
        let sink = self.sink.clone();
        Some(async move {
            let res = resolver.resolve(coord).await;

            let still = current
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
                == Some(&key);
            if !still {
                trace!("dropping result for {}", key);
                return Binding::Stale;
            }

            match res {
                Ok(address) if address.is_empty() => Binding::Empty,
                Ok(address) => {
                    sink.report(key, address);
                    Binding::Reported
                }
                Err(e) => {
                    warn!("Could not load location for {}: {}", coord, e);
                    Binding::Failed
                }
            }
        })
    }
}
