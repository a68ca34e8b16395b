//! Join-ordered list of peers currently in the call.
//!
//! Independent of tiles: with the lazy placeholder policy a joined peer has no
//! tile until its first track arrives, and a peer demoted to a non-publishing
//! role loses its tiles but is still in the call. The roster is what the
//! active-speaker selector backfills from.

use crate::events::CallEvent;
use crate::model::PeerIdentity;
use common::types::PeerId;

/// Known peers of one call session, in join order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    peers: Vec<PeerIdentity>,
}

impl Roster {
    /// Empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peers in join order.
    #[must_use]
    pub fn peers(&self) -> &[PeerIdentity] {
        &self.peers
    }

    /// Number of known peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// True before anyone has joined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Latest identity of a peer.
    #[must_use]
    pub fn get(&self, id: &PeerId) -> Option<&PeerIdentity> {
        self.peers.iter().find(|peer| &peer.id == id)
    }

    /// The local peer, once the SDK has reported it.
    #[must_use]
    pub fn local_peer(&self) -> Option<&PeerIdentity> {
        self.peers.iter().find(|peer| peer.is_local)
    }

    /// Record the latest identity of a peer, appending it if unseen.
    pub fn observe(&mut self, peer: &PeerIdentity) {
        match self.peers.iter_mut().find(|known| known.id == peer.id) {
            Some(known) => *known = peer.clone(),
            None => self.peers.push(peer.clone()),
        }
    }

    /// Replace the identity of a peer already in the roster. Returns false
    /// (and changes nothing) for an unknown peer.
    pub fn refresh(&mut self, peer: &PeerIdentity) -> bool {
        match self.peers.iter_mut().find(|known| known.id == peer.id) {
            Some(known) => {
                *known = peer.clone();
                true
            }
            None => false,
        }
    }

    /// Forget a peer. Returns true if the peer was present.
    pub fn remove(&mut self, id: &PeerId) -> bool {
        let before = self.peers.len();
        self.peers.retain(|peer| &peer.id != id);
        before != self.peers.len()
    }

    /// Fold one event.
    ///
    /// Only a join or a published track introduces a peer. Updates, removals
    /// and state changes refresh known peers only, so a late event for a peer
    /// that already left does not bring it back. Speaker lists never touch
    /// the roster.
    pub fn apply(&mut self, event: &CallEvent) {
        match event {
            CallEvent::PeerLeft(peer) => {
                self.remove(&peer.id);
            }
            CallEvent::PeerJoined(peer) | CallEvent::TrackAdded { peer, .. } => self.observe(peer),
            CallEvent::PeerUpdated { peer, .. }
            | CallEvent::TrackRemoved { peer, .. }
            | CallEvent::TrackMuteChanged { peer, .. }
            | CallEvent::TrackDegradationChanged { peer, .. } => {
                self.refresh(peer);
            }
            CallEvent::SpeakerListUpdated(_) => {}
        }
    }

    /// Forget every peer (rejoin).
    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
