//! Typed errors shared by the resolvers, the weather client and the tool surface.

use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bad input shape or range. Raised before any network call.
    #[error("{0}")]
    InvalidArgument(String),

    /// The geocoder found nothing for the query.
    #[error("Could not find location information for '{0}'. Please check the city name and try again.")]
    NotFound(String),

    /// Coordinates resolved but no timezone covers them.
    #[error("Could not determine timezone for '{0}'.")]
    TimezoneNotFound(String),

    /// Network failure, timeout, non-2xx status or malformed body from a provider.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Neither live nor demo data exists for the request.
    #[error("{0}")]
    DataUnavailable(String),
}

/// Stable machine-readable code for an [`Error`], used in tool responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    TimezoneNotFound,
    ServiceUnavailable,
    DataUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::TimezoneNotFound => "timezone_not_found",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::DataUnavailable => "data_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::TimezoneNotFound(_) => ErrorKind::TimezoneNotFound,
            Error::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Error::DataUnavailable(_) => ErrorKind::DataUnavailable,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Wrap a provider failure, keeping the whole `anyhow` context chain.
    pub fn unavailable(service: &str, err: &anyhow::Error) -> Self {
        Error::ServiceUnavailable(format!("{service} is unavailable: {err:#}"))
    }
}
