//! Observability for the call view.
//!
//! Metric labels are bounded to prevent cardinality explosion:
//! - `event`: 8 values (one per `CallEvent` variant)
//! - `reason`: 4 values (one per `AdapterError` variant)
//!
//! No peer, track or tile identifiers are ever used as labels.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `callview_events_total` | Counter | `event` | Events folded into the session |
//! | `callview_payloads_rejected_total` | Counter | `reason` | SDK payloads the adapter could not normalize |
//! | `callview_tiles_active` | Gauge | none | Tiles in the registry |
//! | `callview_speaker_window_changes_total` | Counter | none | Active-speaker window reshuffles |

pub mod metrics;

pub use metrics::{
    record_event, record_payload_rejected, record_speaker_window_change, set_tiles_active,
};
