//! # Triage Types
//!
//! Validated primitives shared by the triage crates:
//! - [`PatientId`]: a trimmed, non-empty patient identifier
//! - [`Timestamp`]: a date value that never fails to deserialise

pub mod id;
pub mod timestamp;

pub use id::PatientId;
pub use timestamp::{format_optional_date, Timestamp, INVALID_DATE};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}
