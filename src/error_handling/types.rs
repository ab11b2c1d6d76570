//! Error type definitions.
//!
//! This module defines the classified error kinds plus the counters used for
//! processing statistics.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configuration value that the process cannot run with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pidfile could not be written.
    #[error("Pidfile error: {0}")]
    PidfileError(#[from] std::io::Error),
}

/// A single fetch failed at the transport level (NetworkError).
///
/// Recorded as an `ERROR` hop by the resolver; never propagated further.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or no response arrived in time.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The response body could not be read.
    #[error("Reading body of {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: ReqwestError,
    },
}

impl FetchError {
    /// Categorizes this failure for the statistics counters.
    pub fn error_type(&self) -> ErrorType {
        let source = match self {
            FetchError::Request { source, .. } | FetchError::Body { source, .. } => source,
        };
        if source.is_timeout() {
            ErrorType::FetchTimeout
        } else if source.is_connect() {
            ErrorType::FetchConnect
        } else if source.is_body() || source.is_decode() {
            ErrorType::FetchBody
        } else {
            ErrorType::FetchOther
        }
    }
}

/// The host of a URL cannot be encoded to the network character set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot encode host '{host}' of URL '{url}'")]
pub struct EncodingError {
    pub url: String,
    pub host: String,
}

/// Queue backend failures (DatabaseError).
#[derive(Error, Debug)]
pub enum QueueError {
    /// Connection or command failure reported by the backend.
    #[error("Queue backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// A payload could not be encoded or decoded as JSON.
    #[error("Queue payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("Queue operation rejected: {0}")]
    Rejected(String),
}

/// Types of errors counted during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    FetchTimeout,
    FetchConnect,
    FetchBody,
    FetchOther,
    /// A URL whose host could not be encoded was passed through unchanged
    UrlEncoding,
    QueueAck,
}

/// Informational events counted during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpRedirect,
    MetaRedirect,
    MarketRewrite,
    TerminalShortcut,
    TaskResubmitted,
    TaskResolved,
}
