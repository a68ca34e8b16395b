//! `CallSession` - all call-view state for one active call.
//!
//! A session owns the tile registry, the roster and the active-speaker window.
//! Nothing is process-global: two sessions (or two tests) never share state,
//! and rejoining a call starts from a fresh session or `reset()`.
//!
//! Every method is synchronous and runs to completion; a reader never sees a
//! partially applied event. Readers get owned snapshots they cannot mutate.

use crate::config::SessionConfig;
use crate::errors::AdapterError;
use crate::events::{adapt, parse_payload, CallEvent, SdkPayload};
use crate::model::{PeerIdentity, TileRecord};
use crate::observability::metrics;
use crate::paginate::{paginate, Pages};
use crate::reconcile;
use crate::registry::TileRegistry;
use crate::roster::Roster;
use crate::speakers::ActiveSpeakerSelector;
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The event was folded into the session.
    Applied {
        event: &'static str,
    },
    /// The payload was dropped; the session is unchanged.
    Ignored(AdapterError),
}

impl IngestOutcome {
    /// True if the payload changed (or was folded into) the session.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, IngestOutcome::Applied { .. })
    }
}

/// State of one active call.
#[derive(Debug, Clone)]
pub struct CallSession {
    config: SessionConfig,
    registry: TileRegistry,
    roster: Roster,
    speakers: ActiveSpeakerSelector,
}

impl CallSession {
    /// Fresh session with no peers.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let speakers = ActiveSpeakerSelector::new(config.speaker_capacity);
        Self {
            config,
            registry: TileRegistry::new(),
            roster: Roster::new(),
            speakers,
        }
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Parse and apply one JSON payload from the SDK.
    pub fn ingest_json(&mut self, raw: &str) -> IngestOutcome {
        match parse_payload(raw) {
            Ok(payload) => self.ingest(payload),
            Err(e) => Self::reject(e),
        }
    }

    /// Normalize and apply one SDK payload. Malformed payloads are logged,
    /// counted and otherwise ignored.
    pub fn ingest(&mut self, payload: SdkPayload) -> IngestOutcome {
        match adapt(payload) {
            Ok(event) => self.apply(&event),
            Err(e) => Self::reject(e),
        }
    }

    /// Apply one normalized event.
    pub fn apply(&mut self, event: &CallEvent) -> IngestOutcome {
        let name = event.name();

        self.roster.apply(event);
        reconcile::apply(&mut self.registry, event, self.config.placeholder_policy);

        if let CallEvent::SpeakerListUpdated(raw) = event {
            if self.speakers.update(self.roster.peers(), raw) {
                metrics::record_speaker_window_change();
            }
        } else if self.speakers.retain_known(self.roster.peers()) {
            metrics::record_speaker_window_change();
        }

        debug!(
            target: "callview.session",
            event = name,
            peer_id = event.peer().map(|p| p.id.as_str()).unwrap_or_default(),
            tiles = self.registry.len(),
            "Event applied"
        );
        metrics::record_event(name);
        metrics::set_tiles_active(self.registry.len());

        IngestOutcome::Applied { event: name }
    }

    fn reject(error: AdapterError) -> IngestOutcome {
        debug!(
            target: "callview.session",
            error = %error,
            "SDK payload ignored"
        );
        metrics::record_payload_rejected(error.reason());
        IngestOutcome::Ignored(error)
    }

    /// Tiles in display order.
    #[must_use]
    pub fn tiles(&self) -> &[TileRecord] {
        self.registry.tiles()
    }

    /// The tile registry.
    #[must_use]
    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    /// Immutable copy of the tiles for readers on other tasks.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[TileRecord]> {
        self.registry.snapshot()
    }

    /// Current active-speaker window.
    #[must_use]
    pub fn active_speakers(&self) -> &[PeerIdentity] {
        self.speakers.window()
    }

    /// Grid pages over the current tiles, using the configured page size.
    #[must_use]
    pub fn pages(&self) -> Pages<'_> {
        paginate(self.registry.tiles(), self.config.page_size)
    }

    /// Known peers in join order.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The local peer, once reported.
    #[must_use]
    pub fn local_peer(&self) -> Option<&PeerIdentity> {
        self.roster.local_peer()
    }

    /// Discard all state (call ended or rejoined). Configuration is kept.
    pub fn reset(&mut self) {
        info!(
            target: "callview.session",
            tiles = self.registry.len(),
            peers = self.roster.len(),
            "Session state discarded"
        );
        self.registry.clear();
        self.roster.clear();
        self.speakers.reset();
        metrics::set_tiles_active(0);
    }
}

impl Default for CallSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
