//! Pre-configured test data fixtures for call view testing.
//!
//! Provides builders for:
//! - Peers with various roles and tracks
//! - Tracks on regular, screen and auxiliary sources
//! - SDK payloads (as `SdkPayload` or raw JSON lines)

use callview_core::events::{parse_payload, SdkPayload};
use callview_core::model::{MediaTrackRef, PeerIdentity, TrackKind, TrackSource};
use common::types::TrackId;
use serde_json::{json, Value};
use uuid::Uuid;

/// Test track fixture.
#[derive(Debug, Clone)]
pub struct TestTrack {
    /// Track ID.
    pub id: String,
    /// `audio` or `video`.
    pub kind: String,
    /// `regular`, `screen` or an auxiliary name.
    pub source: String,
    /// Muted flag.
    pub muted: bool,
    /// Degraded flag.
    pub degraded: bool,
}

impl TestTrack {
    /// Create a regular camera track.
    #[must_use]
    pub fn camera(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "video".to_string(),
            source: "regular".to_string(),
            muted: false,
            degraded: false,
        }
    }

    /// Create a regular microphone track.
    #[must_use]
    pub fn microphone(id: impl Into<String>) -> Self {
        Self {
            kind: "audio".to_string(),
            ..Self::camera(id)
        }
    }

    /// Create a screen-share video track.
    #[must_use]
    pub fn screen(id: impl Into<String>) -> Self {
        Self {
            source: "screen".to_string(),
            ..Self::camera(id)
        }
    }

    /// Create a camera track with a random ID.
    #[must_use]
    pub fn random() -> Self {
        Self::camera(format!("track-{}", Uuid::new_v4()))
    }

    /// Set the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Mark the track muted.
    #[must_use]
    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    /// Mark the track degraded.
    #[must_use]
    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    /// SDK JSON shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "kind": self.kind,
            "source": self.source,
            "muted": self.muted,
            "degraded": self.degraded,
        })
    }

    /// Normalized model value.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is neither `audio` nor `video`.
    #[must_use]
    pub fn build(&self) -> MediaTrackRef {
        let kind = match self.kind.as_str() {
            "audio" => TrackKind::Audio,
            "video" => TrackKind::Video,
            other => panic!("unsupported test track kind: {other}"),
        };
        let source = match self.source.as_str() {
            "regular" => TrackSource::Regular,
            "screen" => TrackSource::Screen,
            other => TrackSource::Auxiliary(other.to_string()),
        };
        MediaTrackRef {
            id: TrackId::new(self.id.clone()),
            kind,
            source,
            muted: self.muted,
            degraded: self.degraded,
        }
    }
}

/// Test peer fixture.
#[derive(Debug, Clone)]
pub struct TestPeer {
    /// Peer ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether this is the local peer.
    pub is_local: bool,
    /// Role name.
    pub role: String,
    /// Whether the role may publish media.
    pub can_publish: bool,
    /// Whether the role may mute, unmute, remove and change roles of others.
    pub is_host: bool,
    /// Regular audio track reported with the peer.
    pub audio_track: Option<TestTrack>,
    /// Regular video track reported with the peer.
    pub video_track: Option<TestTrack>,
}

impl TestPeer {
    /// Create a new remote publishing peer with the given ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            is_local: false,
            role: "guest".to_string(),
            can_publish: true,
            is_host: false,
            audio_track: None,
            video_track: None,
        }
    }

    /// Create a test peer with a random ID.
    #[must_use]
    pub fn random() -> Self {
        Self::new(format!("peer-{}", Uuid::new_v4()))
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark as the local peer.
    #[must_use]
    pub fn local(mut self) -> Self {
        self.is_local = true;
        self
    }

    /// Grant host permissions.
    #[must_use]
    pub fn host(mut self) -> Self {
        self.role = "host".to_string();
        self.is_host = true;
        self
    }

    /// Demote to a role without publish permissions.
    #[must_use]
    pub fn viewer(mut self) -> Self {
        self.role = "viewer".to_string();
        self.can_publish = false;
        self
    }

    /// Report a regular audio track with the peer.
    #[must_use]
    pub fn with_audio(mut self, track: TestTrack) -> Self {
        self.audio_track = Some(track);
        self
    }

    /// Report a regular video track with the peer.
    #[must_use]
    pub fn with_video(mut self, track: TestTrack) -> Self {
        self.video_track = Some(track);
        self
    }

    /// Stop reporting any regular tracks.
    #[must_use]
    pub fn without_tracks(mut self) -> Self {
        self.audio_track = None;
        self.video_track = None;
        self
    }

    /// SDK JSON shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "isLocal": self.is_local,
            "role": {
                "name": self.role,
                "permissions": {
                    "publishAudio": self.can_publish,
                    "publishVideo": self.can_publish,
                    "publishScreen": self.can_publish,
                    "mute": self.is_host,
                    "unmute": self.is_host,
                    "removeOthers": self.is_host,
                    "changeRole": self.is_host,
                },
            },
            "audioTrack": self.audio_track.as_ref().map(TestTrack::to_json),
            "videoTrack": self.video_track.as_ref().map(TestTrack::to_json),
        })
    }

    /// Normalized model value, decoded the same way the adapter decodes it.
    ///
    /// # Panics
    ///
    /// Panics if the fixture does not decode.
    #[must_use]
    pub fn build(&self) -> PeerIdentity {
        let payload = to_payload(&json!({"event": "peer", "type": "joined", "peer": self.to_json()}));
        match callview_core::events::adapt(payload) {
            Ok(callview_core::CallEvent::PeerJoined(peer)) => peer,
            other => panic!("test peer did not decode: {other:?}"),
        }
    }
}

fn to_payload(value: &Value) -> SdkPayload {
    parse_payload(&value.to_string()).expect("fixture payload must parse")
}

/// Raw JSON line for a peer event (`joined`, `left`, `role_changed`, ...).
#[must_use]
pub fn peer_event_json(event_type: &str, peer: &TestPeer) -> String {
    json!({"event": "peer", "type": event_type, "peer": peer.to_json()}).to_string()
}

/// Raw JSON line for a track event (`added`, `removed`, `muted`, ...).
#[must_use]
pub fn track_event_json(event_type: &str, peer: &TestPeer, track: &TestTrack) -> String {
    json!({
        "event": "track",
        "type": event_type,
        "peer": peer.to_json(),
        "track": track.to_json(),
    })
    .to_string()
}

/// Raw JSON line for a speaker tick, loudest first.
#[must_use]
pub fn speakers_json(peers: &[&TestPeer]) -> String {
    let speakers: Vec<Value> = peers.iter().map(|peer| json!({"id": peer.id})).collect();
    json!({"event": "speakers", "speakers": speakers}).to_string()
}

/// Peer-joined payload.
#[must_use]
pub fn peer_joined(peer: &TestPeer) -> SdkPayload {
    parse_payload(&peer_event_json("joined", peer)).expect("fixture payload must parse")
}

/// Peer-left payload.
#[must_use]
pub fn peer_left(peer: &TestPeer) -> SdkPayload {
    parse_payload(&peer_event_json("left", peer)).expect("fixture payload must parse")
}

/// Role-changed payload.
#[must_use]
pub fn role_changed(peer: &TestPeer) -> SdkPayload {
    parse_payload(&peer_event_json("role_changed", peer)).expect("fixture payload must parse")
}

/// Track-added payload.
#[must_use]
pub fn track_added(peer: &TestPeer, track: &TestTrack) -> SdkPayload {
    parse_payload(&track_event_json("added", peer, track)).expect("fixture payload must parse")
}

/// Track-removed payload.
#[must_use]
pub fn track_removed(peer: &TestPeer, track: &TestTrack) -> SdkPayload {
    parse_payload(&track_event_json("removed", peer, track)).expect("fixture payload must parse")
}

/// Track-muted or track-unmuted payload.
#[must_use]
pub fn track_muted(peer: &TestPeer, track: &TestTrack, muted: bool) -> SdkPayload {
    let event_type = if muted { "muted" } else { "unmuted" };
    parse_payload(&track_event_json(event_type, peer, track)).expect("fixture payload must parse")
}

/// Speaker-list payload, loudest first.
#[must_use]
pub fn speakers(peers: &[&TestPeer]) -> SdkPayload {
    parse_payload(&speakers_json(peers)).expect("fixture payload must parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_builds_through_adapter() {
        let peer = TestPeer::new("alice")
            .with_name("Alice")
            .host()
            .with_audio(TestTrack::microphone("mic").muted())
            .build();

        assert_eq!(peer.id.as_str(), "alice");
        assert_eq!(peer.name, "Alice");
        assert!(peer.role.permissions.remove_others);
        assert!(peer.audio_track.unwrap().muted);
    }

    #[test]
    fn test_viewer_cannot_publish() {
        let peer = TestPeer::new("v").viewer().build();
        assert!(!peer.role.permissions.can_publish());
    }

    #[test]
    fn test_random_peers_are_distinct() {
        assert_ne!(TestPeer::random().id, TestPeer::random().id);
    }

    #[test]
    fn test_track_build() {
        let track = TestTrack::screen("s").build();
        assert_eq!(track.source, TrackSource::Screen);
        assert_eq!(track.kind, TrackKind::Video);
    }
}
