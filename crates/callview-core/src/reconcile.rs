//! Reconciler: folds one `CallEvent` into the tile registry.
//!
//! Transitions are total. An event that names a tile or peer the registry
//! does not hold (e.g. a `TrackRemoved` arriving after the `PeerLeft` that
//! already cleaned the peer up) changes nothing.
//!
//! | Event | Effect |
//! |-------|--------|
//! | `PeerJoined` | lazy: refresh existing tiles only; eager: ensure a placeholder |
//! | `PeerLeft` | remove every tile of the peer |
//! | `PeerUpdated` | refresh the peer on its tiles; a role without publish rights removes them |
//! | `TrackAdded` | video: insert or replace the source's tile; regular audio: ensure a placeholder |
//! | `TrackRemoved` | drop the source's tile, or downgrade the regular tile to a placeholder |
//! | `TrackMuteChanged` / `TrackDegradationChanged` | replace the displayed track in place |
//! | `SpeakerListUpdated` | nothing (handled by the speaker selector) |
//!
//! Peer payloads can omit track fields; empty slots are filled from the peer
//! record already held on the peer's tiles before any event is applied.

use crate::config::PlaceholderPolicy;
use crate::events::{CallEvent, PeerUpdateKind};
use crate::model::{MediaTrackRef, PeerIdentity, TileId, TileRecord, TrackKind};
use crate::registry::{TileRegistry, Upsert};
use tracing::debug;

/// Pure form: consume a registry and return the next one.
#[must_use]
pub fn reconcile(
    mut registry: TileRegistry,
    event: &CallEvent,
    policy: PlaceholderPolicy,
) -> TileRegistry {
    apply(&mut registry, event, policy);
    registry
}

/// Apply one event to `registry` in place.
pub fn apply(registry: &mut TileRegistry, event: &CallEvent, policy: PlaceholderPolicy) {
    match event {
        CallEvent::PeerJoined(peer) => peer_joined(registry, peer, policy),
        CallEvent::PeerLeft(peer) => {
            let removed = registry.remove_peer(&peer.id);
            debug!(
                target: "callview.reconcile",
                peer_id = %peer.id,
                removed,
                "Peer left"
            );
        }
        CallEvent::PeerUpdated { peer, kind } => peer_updated(registry, peer, *kind),
        CallEvent::TrackAdded { peer, track } => track_added(registry, peer, track),
        CallEvent::TrackRemoved { peer, track } => track_removed(registry, peer, track),
        CallEvent::TrackMuteChanged { peer, track }
        | CallEvent::TrackDegradationChanged { peer, track } => {
            track_state_changed(registry, peer, track);
        }
        CallEvent::SpeakerListUpdated(_) => {}
    }
}

fn peer_joined(registry: &mut TileRegistry, peer: &PeerIdentity, policy: PlaceholderPolicy) {
    let placeholder_id = TileId::regular(&peer.id);
    if policy == PlaceholderPolicy::Eager && registry.get(&placeholder_id).is_none() {
        registry.upsert(TileRecord::placeholder(peer.clone()));
        debug!(
            target: "callview.reconcile",
            peer_id = %peer.id,
            "Placeholder tile created on join"
        );
    }
    registry.update_peer(&merge_known_tracks(registry, peer));
}

fn peer_updated(registry: &mut TileRegistry, peer: &PeerIdentity, kind: PeerUpdateKind) {
    if kind == PeerUpdateKind::RoleChanged && !peer.role.permissions.can_publish() {
        let removed = registry.remove_peer(&peer.id);
        debug!(
            target: "callview.reconcile",
            peer_id = %peer.id,
            role = %peer.role.name,
            removed,
            "Peer lost publish permissions, tiles removed"
        );
        return;
    }
    registry.update_peer(&merge_known_tracks(registry, peer));
}

fn track_added(registry: &mut TileRegistry, peer: &PeerIdentity, track: &MediaTrackRef) {
    let peer = with_regular_track(&merge_known_tracks(registry, peer), track);
    let id = TileId::new(&peer.id, &track.source);

    match (track.kind, track.source.is_regular()) {
        (TrackKind::Video, _) => {
            let outcome = registry.upsert(TileRecord {
                id: id.clone(),
                peer: peer.clone(),
                track: Some(track.clone()),
            });
            debug!(
                target: "callview.reconcile",
                tile_id = %id,
                track_id = %track.id,
                inserted = outcome == Upsert::Inserted,
                "Video track added"
            );
        }
        (TrackKind::Audio, true) => {
            if registry.get(&id).is_none() {
                registry.upsert(TileRecord::placeholder(peer.clone()));
                debug!(
                    target: "callview.reconcile",
                    tile_id = %id,
                    "Audio-only placeholder tile created"
                );
            }
        }
        // Auxiliary audio has nothing to display on its own
        (TrackKind::Audio, false) => {}
    }

    registry.update_peer(&peer);
}

fn track_removed(registry: &mut TileRegistry, peer: &PeerIdentity, track: &MediaTrackRef) {
    let mut peer = without_track(&merge_known_tracks(registry, peer), track);
    let id = TileId::new(&peer.id, &track.source);

    if let Some(displayed) = registry.get(&id).map(|tile| tile.track.clone()) {
        let shows_removed = displayed.as_ref().is_none_or(|t| t.id == track.id);
        let is_placeholder = displayed.is_none();

        if !track.source.is_regular() {
            if shows_removed {
                registry.remove(&id);
                debug!(target: "callview.reconcile", tile_id = %id, "Auxiliary tile removed");
            }
        } else if let Some(live) = displayed.filter(|t| t.id != track.id) {
            // A tile still displaying another regular track keeps the peer publishing
            if peer.video_track.is_none() && live.is_video() {
                peer.video_track = Some(live);
            }
        } else if !peer.has_regular_track() {
            registry.remove(&id);
            debug!(
                target: "callview.reconcile",
                tile_id = %id,
                "Last regular track removed, tile removed"
            );
        } else if !is_placeholder {
            registry.set_track(&id, None);
            debug!(
                target: "callview.reconcile",
                tile_id = %id,
                "Displayed track removed, tile downgraded to placeholder"
            );
        }
    }

    registry.update_peer(&peer);
}

fn track_state_changed(registry: &mut TileRegistry, peer: &PeerIdentity, track: &MediaTrackRef) {
    let peer = with_regular_track(&merge_known_tracks(registry, peer), track);
    let id = TileId::new(&peer.id, &track.source);

    let displays_track = registry
        .get(&id)
        .and_then(|tile| tile.track.as_ref())
        .is_some_and(|displayed| displayed.id == track.id);
    if displays_track {
        registry.set_track(&id, Some(track.clone()));
    }

    registry.update_peer(&peer);
}

/// Peer payloads may omit track fields. Fill the empty slots from what the
/// peer's tiles already record so a sparse payload never erases a live track.
fn merge_known_tracks(registry: &TileRegistry, peer: &PeerIdentity) -> PeerIdentity {
    let mut merged = peer.clone();
    if let Some(known) = registry.tiles_for_peer(&peer.id).next().map(|tile| &tile.peer) {
        if merged.audio_track.is_none() {
            merged.audio_track.clone_from(&known.audio_track);
        }
        if merged.video_track.is_none() {
            merged.video_track.clone_from(&known.video_track);
        }
    }
    merged
}

/// The SDK's peer payload can lag the track event; make the peer's regular
/// track slots agree with the track the event is about.
fn with_regular_track(peer: &PeerIdentity, track: &MediaTrackRef) -> PeerIdentity {
    let mut peer = peer.clone();
    if track.source.is_regular() {
        match track.kind {
            TrackKind::Audio => peer.audio_track = Some(track.clone()),
            TrackKind::Video => peer.video_track = Some(track.clone()),
        }
    }
    peer
}

fn without_track(peer: &PeerIdentity, track: &MediaTrackRef) -> PeerIdentity {
    let mut peer = peer.clone();
    if peer.audio_track.as_ref().is_some_and(|t| t.id == track.id) {
        peer.audio_track = None;
    }
    if peer.video_track.as_ref().is_some_and(|t| t.id == track.id) {
        peer.video_track = None;
    }
    peer
}
