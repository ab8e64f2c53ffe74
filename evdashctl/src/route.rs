//! Page routing for the dashboard.
//!
//! There is only one real page, `/vehicles`.  The root `/` is a redirection to it and anything
//! else is not found.
//!

use std::fmt::{Display, Formatter};

use tracing::trace;

use crate::error::Status;

/// Follow at most this many redirections
const MAX_HOPS: usize = 4;

/// Pages we know how to render
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Vehicles,
}

/// What a path leads to
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    Page(Route),
    Redirect(&'static str),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Vehicles => "/vehicles",
        }
    }

    /// Single step lookup, redirections are not followed.
    ///
    pub fn lookup(path: &str) -> Result<Target, Status> {
        // `/vehicles/` is `/vehicles` but `/` stays `/`
        let path = match path.trim() {
            "" => "/",
            p if p.len() > 1 => p.trim_end_matches('/'),
            p => p,
        };
        match path {
            "/" => Ok(Target::Redirect(Route::Vehicles.path())),
            "/vehicles" => Ok(Target::Page(Route::Vehicles)),
            _ => Err(Status::NotFound(path.to_string())),
        }
    }

    /// Final page for `path`, following redirections.
    ///
    #[tracing::instrument]
    pub fn resolve(path: &str) -> Result<Route, Status> {
        let mut current = path;
        for _ in 0..MAX_HOPS {
            match Route::lookup(current)? {
                Target::Page(route) => return Ok(route),
                Target::Redirect(to) => {
                    trace!("redirect {} -> {}", current, to);
                    current = to;
                }
            }
        }
        Err(Status::RedirectLoop(path.to_string()))
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}
