//! Avatar placeholder colors.
//!
//! The color is a pure function of the peer id, so every view of the same
//! peer agrees on it and nothing needs to be cached.

use common::types::PeerId;
use ring::digest;
use serde::Serialize;

/// RGB color for an avatar placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AvatarColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AvatarColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form for the presentation layer.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Palette chosen for contrast against white initials.
pub const PALETTE: [AvatarColor; 8] = [
    AvatarColor::rgb(0x7e, 0x47, 0xeb),
    AvatarColor::rgb(0xd7, 0x4b, 0x4b),
    AvatarColor::rgb(0x2f, 0x80, 0xed),
    AvatarColor::rgb(0x1b, 0x9a, 0x6c),
    AvatarColor::rgb(0xe0, 0x7b, 0x1f),
    AvatarColor::rgb(0xc2, 0x3b, 0x8a),
    AvatarColor::rgb(0x0e, 0x7c, 0x86),
    AvatarColor::rgb(0x5a, 0x64, 0x78),
];

/// Deterministic color for a peer: SHA-256 of the id, first byte into the palette.
#[must_use]
pub fn avatar_color(peer_id: &PeerId) -> AvatarColor {
    let hash = digest::digest(&digest::SHA256, peer_id.as_str().as_bytes());
    let first = hash.as_ref().first().copied().unwrap_or_default();
    PALETTE
        .get(usize::from(first) % PALETTE.len())
        .copied()
        .unwrap_or(AvatarColor::rgb(0x5a, 0x64, 0x78))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_stable_per_peer() {
        let peer = PeerId::new("peer-42");
        assert_eq!(avatar_color(&peer), avatar_color(&PeerId::new("peer-42")));
    }

    #[test]
    fn test_color_comes_from_palette() {
        for i in 0..64 {
            let color = avatar_color(&PeerId::new(format!("peer-{i}")));
            assert!(PALETTE.contains(&color));
        }
    }

    #[test]
    fn test_colors_spread_across_palette() {
        let mut used: Vec<AvatarColor> = (0..64)
            .map(|i| avatar_color(&PeerId::new(format!("peer-{i}"))))
            .collect();
        used.sort_by_key(AvatarColor::hex);
        used.dedup();
        assert!(used.len() > 1);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(AvatarColor::rgb(0x0e, 0x7c, 0x86).hex(), "#0e7c86");
    }
}
