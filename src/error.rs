//! Error types for nhanes-dl
//!
//! Every failure in the pipeline is represented here, but none of them is
//! fatal to a run: the pipeline logs the error and skips the affected
//! dataset. The typed variants exist so callers of the lower-level
//! operations (`Fetcher::try_fetch`, `converter::try_convert`,
//! `converter::load_csv`) can tell failures apart.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nhanes-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nhanes-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.timeout")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (connect failure, timeout, broken body stream)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No progress within the fetch timeout: no response headers, or no body
    /// bytes since the last read
    #[error("no data from {url} for {timeout_secs}s")]
    Timeout {
        /// The URL that was requested
        url: String,
        /// The inactivity limit that elapsed
        timeout_secs: u64,
    },

    /// The archive answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that was requested
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// The dataset URL cannot be turned into a cache filename
    #[error("invalid dataset URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Why no filename could be derived
        reason: String,
    },

    /// Transport file could not be decoded
    #[error("XPT decode error in {}: {source}", .path.display())]
    Xpt {
        /// The transport file being decoded
        path: PathBuf,
        /// The underlying decode failure
        #[source]
        source: XptError,
    },

    /// CSV read or write failed
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        /// The CSV file being read or written
        path: PathBuf,
        /// The underlying CSV failure
        #[source]
        source: csv::Error,
    },

    /// A converted file has no header row
    #[error("converted file {} is empty", .path.display())]
    EmptyCsv {
        /// The CSV file that was read
        path: PathBuf,
    },

    /// A blocking conversion task panicked or was cancelled
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// SAS transport (XPORT v5) decoding errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XptError {
    /// A header record did not have the expected prefix
    #[error("expected {expected} header at byte offset {offset}")]
    InvalidHeader {
        /// Which header was expected (e.g., "LIBRARY", "MEMBER")
        expected: &'static str,
        /// Byte offset of the record in the file
        offset: usize,
    },

    /// The member header declared an unsupported NAMESTR length
    #[error("unsupported NAMESTR length {0} (expected 136 or 140)")]
    InvalidNamestrLength(usize),

    /// The variable count in the NAMESTR header is not a number
    #[error("invalid variable count {0:?} in NAMESTR header")]
    InvalidVariableCount(String),

    /// The member declares no variables
    #[error("dataset declares no variables")]
    NoVariables,

    /// A variable descriptor is inconsistent with the observation layout
    #[error("invalid variable {name:?}: {reason}")]
    InvalidVariable {
        /// The variable name from the NAMESTR record
        name: String,
        /// Why the descriptor was rejected
        reason: String,
    },

    /// The file ended in the middle of a structure
    #[error("file truncated while reading {0}")]
    Truncated(&'static str),
}

impl Error {
    /// Wrap a decode failure with the path of the file being decoded
    pub fn xpt(path: impl Into<PathBuf>, source: XptError) -> Self {
        Error::Xpt {
            path: path.into(),
            source,
        }
    }

    /// Wrap a CSV failure with the path of the file being read or written
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the network side of a fetch
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout { .. } | Error::HttpStatus { .. }
        )
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::TaskFailed(e.to_string())
    }
}
