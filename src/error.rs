//! Error types for the duty engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a duty transition, sanction change or report can hit.
//! Idempotent no-ops (double pause, resume without a pause, ending a shift
//! that was never started) are not errors and never appear here.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::MemberId;

/// The main error type for the duty engine.
///
/// # Example
///
/// ```
/// use duty_engine::error::EngineError;
/// use duty_engine::models::MemberId;
///
/// let error = EngineError::Suspended {
///     member_id: MemberId(7),
/// };
/// assert_eq!(error.to_string(), "Member 7 is suspended and cannot start a shift");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The member is under an active suspension and cannot start a shift.
    #[error("Member {member_id} is suspended and cannot start a shift")]
    Suspended {
        /// The suspended member.
        member_id: MemberId,
    },

    /// A computed interval ends before it starts.
    ///
    /// This points at clock skew or corrupted timestamps and is never
    /// repaired silently.
    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval {
        /// The interval start.
        start: NaiveDateTime,
        /// The interval end.
        end: NaiveDateTime,
    },

    /// The store rejected or failed an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A caller-supplied value was rejected.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Storage`] error.
    pub fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
