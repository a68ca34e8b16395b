//! Metrics definitions for the call view.
//!
//! All metrics follow Prometheus naming conventions:
//! - `callview_` prefix
//! - `_total` suffix for counters
//!
//! Recording goes through the `metrics` facade. With no recorder installed
//! (e.g. when embedded in an app that does not export metrics) every call is
//! a no-op.

use metrics::{counter, gauge};

/// Record one event folded into a session.
///
/// Metric: `callview_events_total`
/// Labels: `event` (`CallEvent::name`)
///
/// Cardinality: 8 (one per event variant). Rejected payloads are counted
/// separately by `record_payload_rejected`.
pub fn record_event(event: &'static str) {
    counter!("callview_events_total", "event" => event).increment(1);
}

/// Record an SDK payload the adapter rejected.
///
/// Metric: `callview_payloads_rejected_total`
/// Labels: `reason` (`AdapterError::reason`)
///
/// A steady non-zero rate usually means the SDK changed its payload shape.
pub fn record_payload_rejected(reason: &'static str) {
    counter!("callview_payloads_rejected_total", "reason" => reason).increment(1);
}

/// Set the number of tiles in the registry.
///
/// Metric: `callview_tiles_active`
/// Labels: none
pub fn set_tiles_active(count: usize) {
    // usize to f64 conversion is safe for realistic tile counts (< 2^53)
    #[allow(clippy::cast_precision_loss)]
    gauge!("callview_tiles_active").set(count as f64);
}

/// Record a change of the active-speaker window.
///
/// Metric: `callview_speaker_window_changes_total`
/// Labels: none
///
/// A high rate relative to speaker ticks means the continuity smoothing is
/// not holding and tiles are thrashing.
pub fn record_speaker_window_change() {
    counter!("callview_speaker_window_changes_total").increment(1);
}
