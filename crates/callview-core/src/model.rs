//! Data model for the call view: peers, tracks, and the tiles built from them.
//!
//! A `TileRecord` is one renderable unit: a peer's camera, a screen share, an
//! auxiliary source, or an avatar placeholder when nothing can be displayed.
//! Tiles are keyed by `TileId`, derived from `(peer id, track source)`, so a
//! peer holds at most one tile per source.

use common::types::{PeerId, TrackId};
use serde::Serialize;
use std::fmt;

/// Highest network-quality score reported by the RTC SDK.
pub const MAX_NETWORK_QUALITY: u8 = 4;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Where a track originates on the publishing side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    /// Primary camera / microphone.
    Regular,
    /// Screen share.
    Screen,
    /// Any other named auxiliary source (e.g. a second camera or a video playlist).
    Auxiliary(String),
}

impl TrackSource {
    /// Key used when deriving a `TileId`.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            TrackSource::Regular => "regular",
            TrackSource::Screen => "screen",
            TrackSource::Auxiliary(name) => name,
        }
    }

    /// Primary camera or microphone.
    #[must_use]
    pub fn is_regular(&self) -> bool {
        matches!(self, TrackSource::Regular)
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Reference to one media track published by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTrackRef {
    pub id: TrackId,
    pub kind: TrackKind,
    pub source: TrackSource,
    pub muted: bool,
    /// Set when the engine has downgraded the track because of bandwidth.
    pub degraded: bool,
}

impl MediaTrackRef {
    /// Displayable in a tile.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }

    /// Audio only; never displayed on its own.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }
}

/// Downlink quality of a peer as scored by the RTC SDK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkQuality {
    #[default]
    Unknown,
    /// 0 (disconnected) through 4 (excellent).
    Score(u8),
}

impl NetworkQuality {
    /// Decode a raw SDK score. Anything outside `0..=4` (the SDK uses `-1`
    /// while it is still measuring) is `Unknown`.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        match u8::try_from(raw) {
            Ok(score) if score <= MAX_NETWORK_QUALITY => NetworkQuality::Score(score),
            _ => NetworkQuality::Unknown,
        }
    }
}

/// Permission set attached to a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RolePermissions {
    pub publish_audio: bool,
    pub publish_video: bool,
    pub publish_screen: bool,
    /// May mute other peers.
    pub mute: bool,
    /// May ask other peers to unmute.
    pub unmute: bool,
    pub remove_others: bool,
    pub change_role: bool,
}

impl RolePermissions {
    /// Permissions that allow publishing every kind of media and nothing else.
    #[must_use]
    pub fn publisher() -> Self {
        Self {
            publish_audio: true,
            publish_video: true,
            publish_screen: true,
            ..Self::default()
        }
    }

    /// True when the role may publish any kind of media.
    #[must_use]
    pub fn can_publish(&self) -> bool {
        self.publish_audio || self.publish_video || self.publish_screen
    }
}

/// Named role of a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Role {
    pub name: String,
    pub permissions: RolePermissions,
}

/// Everything the view knows about one participant.
///
/// `audio_track` and `video_track` mirror the peer's *regular* tracks as the
/// SDK reported them with the most recent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerIdentity {
    pub id: PeerId,
    pub name: String,
    pub is_local: bool,
    pub role: Role,
    /// Free-form blob; parsing is left to the presentation layer.
    pub metadata: String,
    pub network_quality: NetworkQuality,
    pub audio_track: Option<MediaTrackRef>,
    pub video_track: Option<MediaTrackRef>,
}

impl PeerIdentity {
    /// Peer with the given id and name, remote, no tracks, publisher role.
    #[must_use]
    pub fn new(id: impl Into<PeerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_local: false,
            role: Role {
                name: String::new(),
                permissions: RolePermissions::publisher(),
            },
            metadata: String::new(),
            network_quality: NetworkQuality::Unknown,
            audio_track: None,
            video_track: None,
        }
    }

    /// True when the peer still has a regular audio or video track.
    #[must_use]
    pub fn has_regular_track(&self) -> bool {
        self.audio_track.is_some() || self.video_track.is_some()
    }
}

/// Deterministic tile key: `"{peer_id}:{source}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// Key of the tile showing `source` for `peer_id`.
    #[must_use]
    pub fn new(peer_id: &PeerId, source: &TrackSource) -> Self {
        Self(format!("{peer_id}:{}", source.key()))
    }

    /// Key of the tile that holds a peer's regular tracks or its placeholder.
    #[must_use]
    pub fn regular(peer_id: &PeerId) -> Self {
        Self::new(peer_id, &TrackSource::Regular)
    }

    /// The `"{peer_id}:{source}"` key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One renderable tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    pub id: TileId,
    pub peer: PeerIdentity,
    /// Displayed track; `None` renders an avatar placeholder.
    pub track: Option<MediaTrackRef>,
}

impl TileRecord {
    /// Tile for `peer` displaying `track`, keyed by the track's source.
    #[must_use]
    pub fn with_track(peer: PeerIdentity, track: MediaTrackRef) -> Self {
        Self {
            id: TileId::new(&peer.id, &track.source),
            peer,
            track: Some(track),
        }
    }

    /// Placeholder tile on the peer's regular source.
    #[must_use]
    pub fn placeholder(peer: PeerIdentity) -> Self {
        Self {
            id: TileId::regular(&peer.id),
            peer,
            track: None,
        }
    }

    #[must_use]
    pub fn is_screen_share(&self) -> bool {
        self.track
            .as_ref()
            .is_some_and(|track| track.source == TrackSource::Screen)
    }
}
