//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

use crate::config::ConfigError;

/// The error type returned by backstop's fallible setup and serving operations.
///
/// Failures while handling a request are [`PipelineFailure`](crate::PipelineFailure)s
/// and end up as HTTP responses, never as `Error`s. This type surfaces
/// infrastructure failures: bad addresses, binding a port, bad configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Address {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
