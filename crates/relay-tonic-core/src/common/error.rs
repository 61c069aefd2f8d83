//! Error types shared by the relay services.
//!
//! This module defines the central `Error` enum covering the envelope
//! codec's failure cases, with `From<Error>` for `tonic::Status` so callers
//! can propagate them over the wire with appropriate status codes.
//!
//! Note what is *not* here:
//!
//! - An empty queue. `Pull`, `PullMany` and `PullManyStream` report
//!   emptiness through explicit empty results, never through an error.
//! - Transport failures. A stream that aborts before both sides half-close
//!   surfaces as a `tonic::Status` from the transport itself, as does a
//!   response exceeding the per-message size ceiling; neither is retried
//!   internally.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the relay envelope codec.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No decoder is registered for this event type tag. Events with
    /// unknown tags are stored and forwarded untouched; only decoding them
    /// fails.
    #[error("No decoder registered for event type '{event_type}'")]
    UnknownEventType { event_type: String },

    /// A payload record failed to serialize into envelope bytes.
    #[error("Failed to encode '{event_type}' payload: {source}")]
    PayloadEncode {
        event_type: &'static str,
        source: serde_json::Error,
    },

    /// Malformed payload bytes for a recognized event type.
    #[error("Malformed payload for event type '{event_type}': {source}")]
    PayloadDecode {
        event_type: String,
        source: serde_json::Error,
    },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::UnknownEventType { event_type } => Status::invalid_argument(format!(
                "No decoder registered for event type '{event_type}'"
            )),
            Error::PayloadEncode { event_type, source } => {
                Status::internal(format!("Failed to encode '{event_type}' payload: {source}"))
            }
            Error::PayloadDecode { event_type, source } => Status::invalid_argument(format!(
                "Malformed payload for event type '{event_type}': {source}"
            )),
        }
    }
}
