//! Event adapter: RTC SDK callback payloads in, closed `CallEvent` variants out.
//!
//! The SDK delivers loosely-typed JSON where almost every field may be absent.
//! All defensive field access happens here, once. Everything downstream
//! (reconciler, selector, session) works on fully-typed `CallEvent`s and
//! matches on them exhaustively.
//!
//! Inbound shapes:
//!
//! ```text
//! {"event": "peer",     "type": "joined",  "peer": {...}}
//! {"event": "track",    "type": "muted",   "peer": {...}, "track": {...}}
//! {"event": "speakers", "speakers": [{...}, ...]}
//! ```

use crate::errors::AdapterError;
use crate::model::{
    MediaTrackRef, NetworkQuality, PeerIdentity, Role, RolePermissions, TrackKind, TrackSource,
};
use common::types::{PeerId, TrackId};
use serde::Deserialize;

/// Raw peer object as emitted by the SDK.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkPeer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub is_local: Option<bool>,
    pub role: Option<SdkRole>,
    pub metadata: Option<String>,
    pub network_quality: Option<i64>,
    pub audio_track: Option<SdkTrack>,
    pub video_track: Option<SdkTrack>,
}

/// Raw role object as emitted by the SDK.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkRole {
    pub name: Option<String>,
    pub permissions: Option<SdkPermissions>,
}

/// Raw permission flags; absent flags are treated as not granted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SdkPermissions {
    pub publish_audio: bool,
    pub publish_video: bool,
    pub publish_screen: bool,
    pub mute: bool,
    pub unmute: bool,
    pub remove_others: bool,
    pub change_role: bool,
}

/// Raw track object as emitted by the SDK.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkTrack {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub source: Option<String>,
    pub muted: Option<bool>,
    pub degraded: Option<bool>,
}

/// One SDK callback payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SdkPayload {
    Peer {
        peer: Option<SdkPeer>,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Track {
        peer: Option<SdkPeer>,
        track: Option<SdkTrack>,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Speakers {
        #[serde(default)]
        speakers: Vec<SdkPeer>,
    },
}

/// Which peer attribute a `PeerUpdated` event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerUpdateKind {
    MetadataChanged,
    NameChanged,
    NetworkQualityChanged,
    RoleChanged,
}

/// Normalized call event consumed by the reconciler and the speaker selector.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    PeerJoined(PeerIdentity),
    PeerLeft(PeerIdentity),
    PeerUpdated {
        peer: PeerIdentity,
        kind: PeerUpdateKind,
    },
    TrackAdded {
        peer: PeerIdentity,
        track: MediaTrackRef,
    },
    TrackRemoved {
        peer: PeerIdentity,
        track: MediaTrackRef,
    },
    TrackMuteChanged {
        peer: PeerIdentity,
        track: MediaTrackRef,
    },
    TrackDegradationChanged {
        peer: PeerIdentity,
        track: MediaTrackRef,
    },
    /// Loudest peers first; empty means silence.
    SpeakerListUpdated(Vec<PeerIdentity>),
}

impl CallEvent {
    /// Bounded label used for logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::PeerJoined(_) => "peer_joined",
            CallEvent::PeerLeft(_) => "peer_left",
            CallEvent::PeerUpdated { .. } => "peer_updated",
            CallEvent::TrackAdded { .. } => "track_added",
            CallEvent::TrackRemoved { .. } => "track_removed",
            CallEvent::TrackMuteChanged { .. } => "track_mute_changed",
            CallEvent::TrackDegradationChanged { .. } => "track_degradation_changed",
            CallEvent::SpeakerListUpdated(_) => "speaker_list_updated",
        }
    }

    /// The peer this event is about, if it concerns a single peer.
    #[must_use]
    pub fn peer(&self) -> Option<&PeerIdentity> {
        match self {
            CallEvent::PeerJoined(peer) | CallEvent::PeerLeft(peer) => Some(peer),
            CallEvent::PeerUpdated { peer, .. }
            | CallEvent::TrackAdded { peer, .. }
            | CallEvent::TrackRemoved { peer, .. }
            | CallEvent::TrackMuteChanged { peer, .. }
            | CallEvent::TrackDegradationChanged { peer, .. } => Some(peer),
            CallEvent::SpeakerListUpdated(_) => None,
        }
    }
}

/// Parse one JSON payload.
///
/// # Errors
///
/// Returns `AdapterError::Malformed` if the text is not a recognizable payload.
pub fn parse_payload(raw: &str) -> Result<SdkPayload, AdapterError> {
    serde_json::from_str(raw).map_err(|e| AdapterError::Malformed(e.to_string()))
}

/// Normalize an SDK payload into a `CallEvent`.
///
/// # Errors
///
/// Returns an `AdapterError` when a field the event cannot do without (peer id,
/// track id, track kind, event type) is missing or unrecognized.
pub fn adapt(payload: SdkPayload) -> Result<CallEvent, AdapterError> {
    match payload {
        SdkPayload::Peer { peer, kind } => {
            let kind = kind.ok_or(AdapterError::MissingField("type"))?;
            let peer = decode_peer(peer.ok_or(AdapterError::MissingField("peer"))?)?;
            match normalize_type(&kind).as_str() {
                "joined" => Ok(CallEvent::PeerJoined(peer)),
                "left" => Ok(CallEvent::PeerLeft(peer)),
                "role-changed" => Ok(peer_updated(peer, PeerUpdateKind::RoleChanged)),
                "metadata-changed" => Ok(peer_updated(peer, PeerUpdateKind::MetadataChanged)),
                "name-changed" => Ok(peer_updated(peer, PeerUpdateKind::NameChanged)),
                "network-quality-changed" => {
                    Ok(peer_updated(peer, PeerUpdateKind::NetworkQualityChanged))
                }
                _ => Err(AdapterError::UnknownEventType(kind)),
            }
        }
        SdkPayload::Track { peer, track, kind } => {
            let kind = kind.ok_or(AdapterError::MissingField("type"))?;
            let peer = decode_peer(peer.ok_or(AdapterError::MissingField("peer"))?)?;
            let mut track = decode_track(track.ok_or(AdapterError::MissingField("track"))?)?;
            let normalized = normalize_type(&kind);
            match normalized.as_str() {
                "added" => Ok(CallEvent::TrackAdded { peer, track }),
                "removed" => Ok(CallEvent::TrackRemoved { peer, track }),
                "muted" | "unmuted" => {
                    track.muted = normalized == "muted";
                    Ok(CallEvent::TrackMuteChanged { peer, track })
                }
                "degraded" | "restored" => {
                    track.degraded = normalized == "degraded";
                    Ok(CallEvent::TrackDegradationChanged { peer, track })
                }
                _ => Err(AdapterError::UnknownEventType(kind)),
            }
        }
        SdkPayload::Speakers { speakers } => Ok(CallEvent::SpeakerListUpdated(
            speakers
                .into_iter()
                .filter_map(|raw| decode_peer(raw).ok())
                .collect(),
        )),
    }
}

fn peer_updated(peer: PeerIdentity, kind: PeerUpdateKind) -> CallEvent {
    CallEvent::PeerUpdated { peer, kind }
}

/// SDKs disagree on `role_changed` vs `role-changed` vs `ROLE_CHANGED`.
fn normalize_type(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

/// Decode a peer. Only the id is required; a malformed nested track is
/// dropped rather than failing the whole peer.
///
/// # Errors
///
/// Returns `AdapterError::MissingField("peer.id")` if the id is absent or empty.
pub fn decode_peer(raw: SdkPeer) -> Result<PeerIdentity, AdapterError> {
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or(AdapterError::MissingField("peer.id"))?;

    let role = match raw.role {
        Some(role) => Role {
            name: role.name.unwrap_or_default(),
            permissions: role
                .permissions
                .map_or_else(RolePermissions::publisher, |p| RolePermissions {
                    publish_audio: p.publish_audio,
                    publish_video: p.publish_video,
                    publish_screen: p.publish_screen,
                    mute: p.mute,
                    unmute: p.unmute,
                    remove_others: p.remove_others,
                    change_role: p.change_role,
                }),
        },
        None => Role {
            name: String::new(),
            permissions: RolePermissions::publisher(),
        },
    };

    Ok(PeerIdentity {
        id: PeerId::new(id),
        name: raw.name.unwrap_or_default(),
        is_local: raw.is_local.unwrap_or(false),
        role,
        metadata: raw.metadata.unwrap_or_default(),
        network_quality: raw
            .network_quality
            .map_or(NetworkQuality::Unknown, NetworkQuality::from_raw),
        audio_track: raw.audio_track.and_then(|t| decode_track(t).ok()),
        video_track: raw.video_track.and_then(|t| decode_track(t).ok()),
    })
}

/// Decode a track. Id and kind are required; source defaults to regular.
///
/// # Errors
///
/// Returns `AdapterError::MissingField` for a missing id or kind and
/// `AdapterError::UnknownTrackKind` for a kind other than audio/video.
pub fn decode_track(raw: SdkTrack) -> Result<MediaTrackRef, AdapterError> {
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or(AdapterError::MissingField("track.id"))?;
    let kind = raw.kind.ok_or(AdapterError::MissingField("track.kind"))?;
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "audio" => TrackKind::Audio,
        "video" => TrackKind::Video,
        _ => return Err(AdapterError::UnknownTrackKind(kind)),
    };

    Ok(MediaTrackRef {
        id: TrackId::new(id),
        kind,
        source: decode_source(raw.source.as_deref()),
        muted: raw.muted.unwrap_or(false),
        degraded: raw.degraded.unwrap_or(false),
    })
}

fn decode_source(raw: Option<&str>) -> TrackSource {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => TrackSource::Regular,
        Some(source) => match source.as_str() {
            "" | "regular" => TrackSource::Regular,
            "screen" => TrackSource::Screen,
            _ => TrackSource::Auxiliary(source),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn adapt_json(raw: &str) -> Result<CallEvent, AdapterError> {
        adapt(parse_payload(raw)?)
    }

    #[test]
    fn test_peer_joined_with_defaults() {
        let event = adapt_json(r#"{"event":"peer","type":"joined","peer":{"id":"A"}}"#).unwrap();

        let CallEvent::PeerJoined(peer) = event else {
            panic!("expected PeerJoined, got {event:?}");
        };
        assert_eq!(peer.id.as_str(), "A");
        assert_eq!(peer.name, "");
        assert!(!peer.is_local);
        assert_eq!(peer.network_quality, NetworkQuality::Unknown);
        assert!(peer.role.permissions.can_publish());
    }

    #[test]
    fn test_peer_update_kinds() {
        let cases = [
            ("role-changed", PeerUpdateKind::RoleChanged),
            ("ROLE_CHANGED", PeerUpdateKind::RoleChanged),
            ("metadata-changed", PeerUpdateKind::MetadataChanged),
            ("name_changed", PeerUpdateKind::NameChanged),
            ("network-quality-changed", PeerUpdateKind::NetworkQualityChanged),
        ];

        for (raw, expected) in cases {
            let json = format!(r#"{{"event":"peer","type":"{raw}","peer":{{"id":"A"}}}}"#);
            let event = adapt_json(&json).unwrap();
            assert!(
                matches!(event, CallEvent::PeerUpdated { kind, .. } if kind == expected),
                "type {raw} decoded to {event:?}"
            );
        }
    }

    #[test]
    fn test_full_peer_payload() {
        let json = r#"{"event":"peer","type":"network-quality-changed","peer":{
            "id":"B","name":"Bob","isLocal":true,"metadata":"{\"hand\":true}",
            "networkQuality":3,
            "role":{"name":"guest","permissions":{"publishAudio":true,"mute":true}},
            "audioTrack":{"id":"a1","kind":"audio","muted":true},
            "videoTrack":{"id":"v1","kind":"nonsense"}
        }}"#;

        let event = adapt_json(json).unwrap();
        let peer = event.peer().unwrap();
        assert_eq!(peer.name, "Bob");
        assert!(peer.is_local);
        assert_eq!(peer.metadata, r#"{"hand":true}"#);
        assert_eq!(peer.network_quality, NetworkQuality::Score(3));
        assert_eq!(peer.role.name, "guest");
        assert!(peer.role.permissions.publish_audio);
        assert!(!peer.role.permissions.publish_video);
        assert!(peer.role.permissions.mute);
        assert!(peer.audio_track.as_ref().unwrap().muted);
        // Malformed nested track is dropped, not fatal
        assert!(peer.video_track.is_none());
    }

    #[test]
    fn test_track_events() {
        let added = adapt_json(
            r#"{"event":"track","type":"added","peer":{"id":"A"},
                "track":{"id":"s1","kind":"video","source":"screen"}}"#,
        )
        .unwrap();
        let CallEvent::TrackAdded { track, .. } = added else {
            panic!("expected TrackAdded");
        };
        assert_eq!(track.source, TrackSource::Screen);
        assert_eq!(track.kind, TrackKind::Video);

        let removed = adapt_json(
            r#"{"event":"track","type":"removed","peer":{"id":"A"},"track":{"id":"v1","kind":"video"}}"#,
        )
        .unwrap();
        assert!(matches!(removed, CallEvent::TrackRemoved { track, .. } if track.source == TrackSource::Regular));
    }

    #[test]
    fn test_mute_and_degradation_types_force_flags() {
        let muted = adapt_json(
            r#"{"event":"track","type":"muted","peer":{"id":"A"},"track":{"id":"a1","kind":"audio","muted":false}}"#,
        )
        .unwrap();
        assert!(matches!(muted, CallEvent::TrackMuteChanged { track, .. } if track.muted));

        let unmuted = adapt_json(
            r#"{"event":"track","type":"unmuted","peer":{"id":"A"},"track":{"id":"a1","kind":"audio","muted":true}}"#,
        )
        .unwrap();
        assert!(matches!(unmuted, CallEvent::TrackMuteChanged { track, .. } if !track.muted));

        let degraded = adapt_json(
            r#"{"event":"track","type":"degraded","peer":{"id":"A"},"track":{"id":"v1","kind":"video"}}"#,
        )
        .unwrap();
        assert!(
            matches!(degraded, CallEvent::TrackDegradationChanged { track, .. } if track.degraded)
        );

        let restored = adapt_json(
            r#"{"event":"track","type":"restored","peer":{"id":"A"},"track":{"id":"v1","kind":"video","degraded":true}}"#,
        )
        .unwrap();
        assert!(
            matches!(restored, CallEvent::TrackDegradationChanged { track, .. } if !track.degraded)
        );
    }

    #[test]
    fn test_auxiliary_source_keeps_name() {
        let event = adapt_json(
            r#"{"event":"track","type":"added","peer":{"id":"A"},"track":{"id":"p1","kind":"video","source":"Playlist"}}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            CallEvent::TrackAdded { track, .. } if track.source == TrackSource::Auxiliary("playlist".to_string())
        ));
    }

    #[test]
    fn test_speakers_skip_entries_without_id() {
        let event = adapt_json(
            r#"{"event":"speakers","speakers":[{"id":"A"},{"name":"ghost"},{"id":""},{"id":"B"}]}"#,
        )
        .unwrap();
        let CallEvent::SpeakerListUpdated(speakers) = event else {
            panic!("expected SpeakerListUpdated");
        };
        let ids: Vec<_> = speakers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_speaker_list_is_silence() {
        let event = adapt_json(r#"{"event":"speakers"}"#).unwrap();
        assert_eq!(event, CallEvent::SpeakerListUpdated(Vec::new()));
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert!(matches!(
            adapt_json(r#"{"event":"peer","type":"joined"}"#),
            Err(AdapterError::MissingField("peer"))
        ));
        assert!(matches!(
            adapt_json(r#"{"event":"peer","type":"joined","peer":{"name":"x"}}"#),
            Err(AdapterError::MissingField("peer.id"))
        ));
        assert!(matches!(
            adapt_json(r#"{"event":"peer","peer":{"id":"A"}}"#),
            Err(AdapterError::MissingField("type"))
        ));
        assert!(matches!(
            adapt_json(r#"{"event":"peer","type":"hand-raised","peer":{"id":"A"}}"#),
            Err(AdapterError::UnknownEventType(t)) if t == "hand-raised"
        ));
        assert!(matches!(
            adapt_json(r#"{"event":"track","type":"added","peer":{"id":"A"},"track":{"id":"t","kind":"data"}}"#),
            Err(AdapterError::UnknownTrackKind(k)) if k == "data"
        ));
        assert!(matches!(
            adapt_json(r#"{"event":"bogus"}"#),
            Err(AdapterError::Malformed(_))
        ));
        assert!(matches!(adapt_json("not json"), Err(AdapterError::Malformed(_))));
    }
}
