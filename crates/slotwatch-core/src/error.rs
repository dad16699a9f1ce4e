//! Core error types for slotwatch-core.
//!
//! Every failure in a poll cycle surfaces as a distinguishable kind:
//! fetch, configuration, store, or notification. Nothing is downgraded
//! to an empty result.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for slotwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Upstream calendar fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration or criteria are structurally invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dedup store access failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Notification delivery failed
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// Which stage of the fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCause {
    Transport,
    HttpStatus,
    Parse,
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FetchCause::Transport => "transport",
            FetchCause::HttpStatus => "http_status",
            FetchCause::Parse => "parse",
        };
        f.write_str(tag)
    }
}

/// Calendar fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection failure, TLS failure or timeout
    #[error("transport failure: {detail}")]
    Transport { detail: String },

    /// Upstream answered with something other than 200
    #[error("upstream returned HTTP {status}: {detail}")]
    HttpStatus { status: u16, detail: String },

    /// Body was not the documented JSON shape
    #[error("failed to parse calendar body ({detail}): {excerpt}")]
    Parse { detail: String, excerpt: String },
}

impl FetchError {
    pub fn cause(&self) -> FetchCause {
        match self {
            FetchError::Transport { .. } => FetchCause::Transport,
            FetchError::HttpStatus { .. } => FetchCause::HttpStatus,
            FetchError::Parse { .. } => FetchCause::Parse,
        }
    }

    /// Status code for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        FetchError::Transport { detail }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Eligibility criteria cannot be evaluated
    #[error("Invalid eligibility criteria: {0}")]
    InvalidCriteria(String),
}

/// Dedup store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open dedup store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Dedup store is locked")]
    Locked,

    /// In-process lock was poisoned by a panicking writer
    #[error("Dedup store lock poisoned")]
    Poisoned,

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Channel is not configured
    #[error("{channel} notifier is not configured")]
    NotConfigured { channel: String },

    /// Delivery request failed
    #[error("{channel} delivery failed: {message}")]
    DeliveryFailed { channel: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
