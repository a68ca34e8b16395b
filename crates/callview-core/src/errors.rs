//! Call view error types.
//!
//! None of these cross the session boundary as failures: the session turns an
//! `AdapterError` into an ignored event (logged and counted), because a
//! malformed SDK payload must never take down the call view.

use thiserror::Error;

/// Why an SDK payload could not be normalized into a `CallEvent`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The payload is not valid JSON or has no recognizable `event` tag.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// A field the event cannot do without is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The `type` discriminator is not one this adapter handles.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// The track `kind` is neither audio nor video.
    #[error("Unknown track kind: {0}")]
    UnknownTrackKind(String),
}

impl AdapterError {
    /// Bounded label for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            AdapterError::Malformed(_) => "malformed",
            AdapterError::MissingField(_) => "missing_field",
            AdapterError::UnknownEventType(_) => "unknown_event_type",
            AdapterError::UnknownTrackKind(_) => "unknown_track_kind",
        }
    }
}

/// Errors talking to a `SessionActor`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The actor has stopped (cancelled or dropped); the request was not handled.
    #[error("Session actor unavailable: {0}")]
    ActorUnavailable(String),
}
