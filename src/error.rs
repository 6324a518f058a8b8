//! Error types
//!
//! One error enum for the library. Per-resource failures never escape a
//! Fetch or Destroy call; they travel inside an [`Outcome`](crate::resource::Outcome)
//! and are logged by the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad flag or credential combination, unresolvable group, unscoped delete
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A finder could not complete its remote query
    #[error("Discovery failed in {finder}: {source}")]
    Discovery {
        finder: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("API request failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed resource address: {0}")]
    MalformedAddress(String),

    /// The sweep budget ran out with resources still active
    #[error("some resources not deleted ({remaining} remaining)")]
    Incomplete { remaining: usize },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn discovery(finder: &'static str, source: Error) -> Self {
        Error::Discovery {
            finder,
            source: Box::new(source),
        }
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Discovery { source, .. } => source.status(),
            _ => None,
        }
    }

    /// True when the remote service affirmatively reported the resource as gone
    pub fn is_gone(&self) -> bool {
        matches!(self.status(), Some(404) | Some(410))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
