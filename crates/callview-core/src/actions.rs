//! Which user-intent actions a tile offers.
//!
//! The actions themselves (mute, remove, role change, volume) round-trip
//! through the RTC SDK; this only decides what the presentation layer should
//! offer, from the current snapshot and the local peer's role.

use crate::model::{PeerIdentity, TileRecord};
use serde::Serialize;

/// What the local peer may do to one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TileActions {
    pub can_mute: bool,
    pub can_unmute: bool,
    pub can_remove: bool,
    pub can_change_role: bool,
    pub can_set_volume: bool,
    pub can_pin: bool,
}

/// Actions `local` may take on `tile`.
///
/// The local peer's own tile only offers pinning: its media is controlled
/// locally, never through the remote-mute path.
#[must_use]
pub fn tile_actions(tile: &TileRecord, local: &PeerIdentity) -> TileActions {
    if tile.peer.is_local || tile.peer.id == local.id {
        return TileActions {
            can_pin: true,
            ..TileActions::default()
        };
    }

    let granted = local.role.permissions;
    let peer = &tile.peer;
    let tracks = || {
        [
            peer.audio_track.as_ref(),
            peer.video_track.as_ref(),
            tile.track.as_ref(),
        ]
        .into_iter()
        .flatten()
    };

    TileActions {
        can_mute: granted.mute && tracks().any(|track| !track.muted),
        can_unmute: granted.unmute && tracks().any(|track| track.muted),
        can_remove: granted.remove_others,
        can_change_role: granted.change_role,
        can_set_volume: peer.audio_track.is_some(),
        can_pin: true,
    }
}
