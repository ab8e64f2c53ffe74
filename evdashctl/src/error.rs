//! Error module
//!

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Status {
    #[error("Bad value for {0}: {1}")]
    BadParameter(&'static str, String),
    #[error("Invalid coordinate {0}, {1}")]
    BadCoordinate(f64, f64),
    #[error("No such page {0}")]
    NotFound(String),
    #[error("Too many redirections from {0}")]
    RedirectLoop(String),
    #[error("Unknown command {0}, try help")]
    UnknownCommand(String),
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
}
