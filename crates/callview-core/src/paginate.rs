//! Groups tiles into fixed-size pages for the paged grid.
//!
//! Screen shares are laid out differently from camera tiles, so each screen
//! share gets a page of its own, emitted where it is encountered. Every other
//! tile is grouped in registry order into chunks of `page_size`; a chunk in
//! progress keeps filling across a screen-share page. The last chunk may be
//! short.

use crate::model::TileRecord;
use std::slice;

/// Lazy page iterator over a tile slice.
///
/// A clone continues independently from the same point. Calling [`paginate`]
/// again starts over and yields the same pages for the same tiles.
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    tiles: slice::Iter<'a, TileRecord>,
    page_size: usize,
    chunk: Vec<&'a TileRecord>,
}

/// Page `tiles` into groups of `page_size` (a size of 0 is treated as 1).
#[must_use]
pub fn paginate(tiles: &[TileRecord], page_size: usize) -> Pages<'_> {
    let page_size = page_size.max(1);
    Pages {
        tiles: tiles.iter(),
        page_size,
        chunk: Vec::with_capacity(page_size),
    }
}

impl<'a> Iterator for Pages<'a> {
    type Item = Vec<&'a TileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for tile in self.tiles.by_ref() {
            if tile.is_screen_share() {
                return Some(vec![tile]);
            }
            self.chunk.push(tile);
            if self.chunk.len() == self.page_size {
                return Some(std::mem::replace(
                    &mut self.chunk,
                    Vec::with_capacity(self.page_size),
                ));
            }
        }

        if self.chunk.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.chunk))
        }
    }
}

impl std::iter::FusedIterator for Pages<'_> {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{MediaTrackRef, PeerIdentity, TrackKind, TrackSource};
    use common::types::TrackId;

    fn camera_tile(peer: &str) -> TileRecord {
        TileRecord::with_track(
            PeerIdentity::new(peer, peer),
            MediaTrackRef {
                id: TrackId::new(format!("{peer}-cam")),
                kind: TrackKind::Video,
                source: TrackSource::Regular,
                muted: false,
                degraded: false,
            },
        )
    }

    fn screen_tile(peer: &str) -> TileRecord {
        TileRecord::with_track(
            PeerIdentity::new(peer, peer),
            MediaTrackRef {
                id: TrackId::new(format!("{peer}-screen")),
                kind: TrackKind::Video,
                source: TrackSource::Screen,
                muted: false,
                degraded: false,
            },
        )
    }

    fn page_ids<'a>(pages: impl Iterator<Item = Vec<&'a TileRecord>>) -> Vec<Vec<String>> {
        pages
            .map(|page| page.iter().map(|t| t.id.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_ten_tiles_in_pages_of_four() {
        let tiles: Vec<_> = (0..10).map(|i| camera_tile(&format!("p{i}"))).collect();

        let sizes: Vec<usize> = paginate(&tiles, 4).map(|page| page.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_screen_share_gets_own_page_anywhere() {
        let tiles = vec![
            camera_tile("a"),
            camera_tile("b"),
            screen_tile("s"),
            camera_tile("c"),
            camera_tile("d"),
            camera_tile("e"),
        ];

        let pages = page_ids(paginate(&tiles, 4));
        assert_eq!(
            pages,
            vec![
                vec!["s:screen".to_string()],
                vec![
                    "a:regular".to_string(),
                    "b:regular".to_string(),
                    "c:regular".to_string(),
                    "d:regular".to_string()
                ],
                vec!["e:regular".to_string()],
            ]
        );
    }

    #[test]
    fn test_screen_share_page_ignores_page_size() {
        let tiles = vec![screen_tile("s1"), screen_tile("s2")];

        let sizes: Vec<usize> = paginate(&tiles, 1).map(|page| page.len()).collect();
        assert_eq!(sizes, vec![1, 1]);
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let tiles = vec![
            screen_tile("s"),
            camera_tile("a"),
            camera_tile("b"),
            camera_tile("c"),
        ];

        assert_eq!(page_ids(paginate(&tiles, 2)), page_ids(paginate(&tiles, 2)));
    }

    #[test]
    fn test_empty_and_zero_size() {
        assert_eq!(paginate(&[], 4).count(), 0);

        let tiles = vec![camera_tile("a"), camera_tile("b")];
        let sizes: Vec<usize> = paginate(&tiles, 0).map(|page| page.len()).collect();
        assert_eq!(sizes, vec![1, 1]);
    }

    #[test]
    fn test_pages_are_lazy() {
        let tiles: Vec<_> = (0..100).map(|i| camera_tile(&format!("p{i}"))).collect();

        let mut pages = paginate(&tiles, 4);
        let first = pages.next().unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(pages.count(), 24);
    }
}
