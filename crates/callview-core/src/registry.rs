//! Tile registry: the canonical, ordered collection of tiles.
//!
//! Invariants maintained here:
//! - at most one `TileRecord` per `TileId`
//! - first-seen insertion order survives every mutation except deletion
//! - a deleted tile that comes back is appended at the end (no slot reuse)
//!
//! Calls hold a handful of peers, so lookups are linear scans over a `Vec`.

use crate::model::{MediaTrackRef, PeerIdentity, TileId, TileRecord};
use common::types::PeerId;
use std::sync::Arc;

/// Outcome of [`TileRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// New tile appended at the end.
    Inserted,
    /// Existing tile replaced at its current position.
    Replaced,
}

/// Ordered tile collection owned by one call session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRegistry {
    tiles: Vec<TileRecord>,
}

impl TileRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles in display order.
    #[must_use]
    pub fn tiles(&self) -> &[TileRecord] {
        &self.tiles
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when no tile is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Look up a tile by id.
    #[must_use]
    pub fn get(&self, id: &TileId) -> Option<&TileRecord> {
        self.tiles.iter().find(|tile| &tile.id == id)
    }

    /// Display index of a tile.
    #[must_use]
    pub fn position(&self, id: &TileId) -> Option<usize> {
        self.tiles.iter().position(|tile| &tile.id == id)
    }

    /// All tiles of one peer, in display order.
    pub fn tiles_for_peer<'a>(
        &'a self,
        peer_id: &'a PeerId,
    ) -> impl Iterator<Item = &'a TileRecord> + 'a {
        self.tiles.iter().filter(move |tile| &tile.peer.id == peer_id)
    }

    /// True if any tile belongs to `peer_id`.
    #[must_use]
    pub fn contains_peer(&self, peer_id: &PeerId) -> bool {
        self.tiles.iter().any(|tile| &tile.peer.id == peer_id)
    }

    /// Insert `record` at the end, or replace the tile with the same id in place.
    pub fn upsert(&mut self, record: TileRecord) -> Upsert {
        match self.tiles.iter_mut().find(|tile| tile.id == record.id) {
            Some(slot) => {
                *slot = record;
                Upsert::Replaced
            }
            None => {
                self.tiles.push(record);
                Upsert::Inserted
            }
        }
    }

    /// Remove one tile. Returns the removed record, `None` if it was absent.
    pub fn remove(&mut self, id: &TileId) -> Option<TileRecord> {
        let index = self.position(id)?;
        Some(self.tiles.remove(index))
    }

    /// Remove every tile of a peer. Returns how many were removed.
    pub fn remove_peer(&mut self, peer_id: &PeerId) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|tile| &tile.peer.id != peer_id);
        before - self.tiles.len()
    }

    /// Replace the `peer` field of every tile of `peer.id`, keeping tracks and
    /// positions. Returns how many tiles were touched.
    pub fn update_peer(&mut self, peer: &PeerIdentity) -> usize {
        let mut touched = 0;
        for tile in self.tiles.iter_mut().filter(|tile| tile.peer.id == peer.id) {
            tile.peer = peer.clone();
            touched += 1;
        }
        touched
    }

    /// Replace the displayed track of one tile in place. Returns false if the
    /// tile is absent.
    pub fn set_track(&mut self, id: &TileId, track: Option<MediaTrackRef>) -> bool {
        match self.tiles.iter_mut().find(|tile| &tile.id == id) {
            Some(tile) => {
                tile.track = track;
                true
            }
            None => false,
        }
    }

    /// Immutable copy for readers; later mutations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[TileRecord]> {
        Arc::from(self.tiles.as_slice())
    }

    /// Discard every tile (session ended or rejoined).
    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{TrackKind, TrackSource};
    use common::types::TrackId;

    fn track(id: &str, source: TrackSource) -> MediaTrackRef {
        MediaTrackRef {
            id: TrackId::new(id),
            kind: TrackKind::Video,
            source,
            muted: false,
            degraded: false,
        }
    }

    fn camera(peer: &str) -> TileRecord {
        TileRecord::with_track(
            PeerIdentity::new(peer, peer),
            track(&format!("{peer}-cam"), TrackSource::Regular),
        )
    }

    fn ids(registry: &TileRegistry) -> Vec<&str> {
        registry.tiles().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_upsert_appends_then_replaces_in_place() {
        let mut registry = TileRegistry::new();
        assert_eq!(registry.upsert(camera("A")), Upsert::Inserted);
        assert_eq!(registry.upsert(camera("B")), Upsert::Inserted);

        let mut replacement = camera("A");
        replacement.track = None;
        assert_eq!(registry.upsert(replacement), Upsert::Replaced);

        assert_eq!(ids(&registry), vec!["A:regular", "B:regular"]);
        assert!(registry.tiles()[0].track.is_none());
    }

    #[test]
    fn test_reinsert_after_remove_goes_to_end() {
        let mut registry = TileRegistry::new();
        registry.upsert(camera("A"));
        registry.upsert(camera("B"));

        let removed = registry.remove(&TileId::regular(&PeerId::new("A")));
        assert!(removed.is_some());
        registry.upsert(camera("A"));

        assert_eq!(ids(&registry), vec!["B:regular", "A:regular"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = TileRegistry::new();
        registry.upsert(camera("A"));

        assert!(registry.remove(&TileId::regular(&PeerId::new("Z"))).is_none());
        assert_eq!(registry.remove_peer(&PeerId::new("Z")), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_peer_removes_all_sources() {
        let mut registry = TileRegistry::new();
        let alice = PeerIdentity::new("A", "Alice");
        registry.upsert(TileRecord::with_track(
            alice.clone(),
            track("a-cam", TrackSource::Regular),
        ));
        registry.upsert(camera("B"));
        registry.upsert(TileRecord::with_track(alice, track("a-screen", TrackSource::Screen)));

        assert_eq!(registry.remove_peer(&PeerId::new("A")), 2);
        assert_eq!(ids(&registry), vec!["B:regular"]);
        assert!(!registry.contains_peer(&PeerId::new("A")));
    }

    #[test]
    fn test_update_peer_keeps_track_and_position() {
        let mut registry = TileRegistry::new();
        registry.upsert(camera("A"));
        registry.upsert(camera("B"));

        let mut renamed = PeerIdentity::new("A", "Alice Cooper");
        renamed.metadata = "{}".to_string();
        assert_eq!(registry.update_peer(&renamed), 1);

        let tile = &registry.tiles()[0];
        assert_eq!(tile.peer.name, "Alice Cooper");
        assert_eq!(tile.track.as_ref().unwrap().id.as_str(), "A-cam");
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut registry = TileRegistry::new();
        registry.upsert(camera("A"));

        let snapshot = registry.snapshot();
        registry.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_track_and_lookup() {
        let mut registry = TileRegistry::new();
        registry.upsert(camera("A"));
        let id = TileId::regular(&PeerId::new("A"));

        assert!(registry.set_track(&id, None));
        assert!(registry.get(&id).unwrap().track.is_none());
        assert_eq!(registry.position(&id), Some(0));
        assert!(!registry.set_track(&TileId::regular(&PeerId::new("Z")), None));
        assert_eq!(registry.tiles_for_peer(&PeerId::new("A")).count(), 1);
    }
}
