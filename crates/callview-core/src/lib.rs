//! Call View Core Library
//!
//! Client-side view state for a multi-party audio/video call. RTC SDK
//! callbacks come in; an ordered tile list, an active-speaker window and a
//! paged grid come out.
//!
//! # Architecture
//!
//! ```text
//! SDK payload (JSON)
//!   └── events::adapt ──► CallEvent
//!         ├── roster::Roster                (who is in the call)
//!         ├── reconcile::apply ──► TileRegistry (what to render)
//!         └── speakers::ActiveSpeakerSelector (who is talking)
//!
//! CallSession owns all three; SessionActor serializes access to one session.
//! ```
//!
//! # Key Design Decisions
//!
//! - **Closed event set**: every SDK payload is normalized once into a
//!   `CallEvent`; downstream code never touches loosely-typed fields
//! - **Deterministic tile keys**: `TileId` is derived from peer id and track
//!   source, so replaying an event is idempotent
//! - **Per-session state**: the previous speaker window lives in the session,
//!   never in process-global state
//! - **Snapshots**: readers get `Arc<[TileRecord]>` copies, never references
//!   into live state
//!
//! # Modules
//!
//! - [`events`] - SDK payload decoding and normalization
//! - [`registry`] / [`reconcile`] - tile list and its transitions
//! - [`speakers`] - active-speaker window with positional continuity
//! - [`paginate`] - grid pages with screen shares isolated
//! - [`session`] / [`actor`] - per-call state and its single-writer host
//! - [`config`] - session configuration from environment

#![warn(clippy::pedantic)]

pub mod actions;
pub mod actor;
pub mod avatar;
pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod observability;
pub mod paginate;
pub mod reconcile;
pub mod registry;
pub mod roster;
pub mod session;
pub mod speakers;

pub use actor::{SessionActor, SessionActorHandle};
pub use config::{PlaceholderPolicy, SessionConfig};
pub use errors::{AdapterError, SessionError};
pub use events::{CallEvent, SdkPayload};
pub use model::{MediaTrackRef, PeerIdentity, TileId, TileRecord, TrackKind, TrackSource};
pub use session::{CallSession, IngestOutcome};
