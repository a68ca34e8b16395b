//! Active-speaker selection with continuity.
//!
//! The SDK's "loudest right now" list is short, noisy and changes every tick.
//! Replacing the highlighted set wholesale on each tick makes tiles thrash, so
//! the window is rebuilt as:
//!
//! 1. current speakers (loudest first, unknown peers and duplicates dropped)
//! 2. backfill from the previous window, in its order
//! 3. backfill from the roster, in join order
//! 4. peers that were already on screen are swapped back to their previous index
//!
//! A short utterance by a new speaker swaps in at most one tile, and silence
//! evicts nobody while the roster still fills the capacity.

use crate::model::PeerIdentity;
use common::types::PeerId;
use tracing::debug;

/// Compute the next speaker window.
///
/// Never returns more than `capacity` peers, never repeats a peer, and only
/// returns peers present in `known` (as the `known` copies, so identities are
/// fresh). Fewer known peers than `capacity` yields a shorter window.
#[must_use]
pub fn select_active_speakers(
    known: &[PeerIdentity],
    raw: &[PeerIdentity],
    previous: &[PeerIdentity],
    capacity: usize,
) -> Vec<PeerIdentity> {
    let find_known = |id: &PeerId| known.iter().find(|peer| &peer.id == id);
    let target = known.len().min(capacity);

    let mut window: Vec<PeerIdentity> = Vec::with_capacity(target);
    for speaker in raw {
        if let Some(peer) = find_known(&speaker.id) {
            if !contains(&window, &peer.id) {
                window.push(peer.clone());
            }
        }
    }

    if window.len() < target {
        for candidate in previous.iter().chain(known) {
            if window.len() >= target {
                break;
            }
            if contains(&window, &candidate.id) {
                continue;
            }
            if let Some(peer) = find_known(&candidate.id) {
                window.push(peer.clone());
            }
        }
    }

    window.truncate(capacity);
    restore_previous_positions(&mut window, previous);
    window
}

/// Swap every peer that was in `previous` back to the index it held there,
/// when that index exists in `window`.
fn restore_previous_positions(window: &mut [PeerIdentity], previous: &[PeerIdentity]) {
    for (prev_index, prev_peer) in previous.iter().enumerate() {
        if prev_index >= window.len() {
            break;
        }
        if let Some(current) = window.iter().position(|peer| peer.id == prev_peer.id) {
            if current != prev_index {
                window.swap(current, prev_index);
            }
        }
    }
}

fn contains(window: &[PeerIdentity], id: &PeerId) -> bool {
    window.iter().any(|peer| &peer.id == id)
}

fn same_ids(a: &[PeerIdentity], b: &[PeerIdentity]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

/// Speaker window owned by one call session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSpeakerSelector {
    capacity: usize,
    window: Vec<PeerIdentity>,
}

impl ActiveSpeakerSelector {
    /// Empty selector holding at most `capacity` peers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            window: Vec::with_capacity(capacity),
        }
    }

    /// Maximum window size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current window, most stable positions first.
    #[must_use]
    pub fn window(&self) -> &[PeerIdentity] {
        &self.window
    }

    /// Feed one loudness tick. Returns true if the set or order of peers changed.
    pub fn update(&mut self, known: &[PeerIdentity], raw: &[PeerIdentity]) -> bool {
        let next = select_active_speakers(known, raw, &self.window, self.capacity);
        let changed = !same_ids(&next, &self.window);
        if changed {
            debug!(
                target: "callview.speakers",
                raw = raw.len(),
                window = next.len(),
                "Active speaker window changed"
            );
        }
        self.window = next;
        changed
    }

    /// Drop peers that left the call and refresh identities of those still
    /// present. A vacated slot is backfilled from the roster while survivors
    /// keep their index; the window never grows here. Returns true if a peer
    /// was dropped.
    pub fn retain_known(&mut self, known: &[PeerIdentity]) -> bool {
        let departed = self
            .window
            .iter()
            .any(|peer| !known.iter().any(|k| k.id == peer.id));

        if !departed {
            for peer in &mut self.window {
                if let Some(fresh) = known.iter().find(|k| k.id == peer.id) {
                    peer.clone_from(fresh);
                }
            }
            return false;
        }

        let next = select_active_speakers(known, &[], &self.window, self.window.len());
        debug!(
            target: "callview.speakers",
            before = self.window.len(),
            window = next.len(),
            "Departed speaker dropped from window"
        );
        self.window = next;
        true
    }

    /// Empty the window (rejoin).
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn peers(ids: &[&str]) -> Vec<PeerIdentity> {
        ids.iter().map(|id| PeerIdentity::new(*id, *id)).collect()
    }

    fn ids(window: &[PeerIdentity]) -> Vec<&str> {
        window.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_backfill_preserves_previous_relative_order() {
        let known = peers(&["A", "B", "C", "D"]);
        let previous = peers(&["B", "C"]);
        let raw = peers(&["D"]);

        let window = select_active_speakers(&known, &raw, &previous, 3);

        assert_eq!(ids(&window), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_raw_list_fills_capacity() {
        let known = peers(&["A", "B", "C", "D", "E"]);
        let raw = peers(&["E", "D", "C", "B", "A"]);

        let window = select_active_speakers(&known, &raw, &[], 3);
        assert_eq!(ids(&window), vec!["E", "D", "C"]);
    }

    #[test]
    fn test_silence_backfills_from_previous_then_roster() {
        let known = peers(&["A", "B", "C", "D", "E"]);
        let previous = peers(&["D"]);

        let window = select_active_speakers(&known, &[], &previous, 3);
        assert_eq!(ids(&window), vec!["D", "A", "B"]);
    }

    #[test]
    fn test_starvation_returns_short_window() {
        let known = peers(&["A", "B"]);
        let window = select_active_speakers(&known, &peers(&["B"]), &[], 4);

        assert_eq!(ids(&window), vec!["B", "A"]);
    }

    #[test]
    fn test_unknown_and_duplicate_speakers_dropped() {
        let known = peers(&["A", "B", "C"]);
        let raw = peers(&["ghost", "B", "B"]);

        let window = select_active_speakers(&known, &raw, &[], 2);
        assert_eq!(ids(&window), vec!["B", "A"]);
    }

    #[test]
    fn test_departed_peers_not_backfilled_from_previous() {
        let known = peers(&["A", "C", "D"]);
        let previous = peers(&["B", "C"]);

        let window = select_active_speakers(&known, &[], &previous, 2);
        assert_eq!(ids(&window), vec!["A", "C"]);
    }

    #[test]
    fn test_zero_capacity_yields_empty_window() {
        let known = peers(&["A", "B"]);
        assert!(select_active_speakers(&known, &known, &[], 0).is_empty());
    }

    #[test]
    fn test_new_speaker_swaps_in_single_tile() {
        let known = peers(&["A", "B", "C", "D", "E", "F"]);
        let previous = peers(&["A", "B", "C", "D"]);

        let window = select_active_speakers(&known, &peers(&["F"]), &previous, 4);
        assert_eq!(ids(&window), vec!["A", "B", "C", "F"]);
    }

    #[test]
    fn test_removing_silent_peer_keeps_positions() {
        let previous = peers(&["A", "B", "C", "D"]);
        let known_before = peers(&["A", "B", "C", "D", "E", "F"]);
        let known_after = peers(&["A", "B", "C", "D", "F"]);

        let before = select_active_speakers(&known_before, &[], &previous, 4);
        let after = select_active_speakers(&known_after, &[], &before, 4);

        assert_eq!(ids(&before), ids(&after));
    }

    #[test]
    fn test_returns_fresh_identities() {
        let mut known = peers(&["A"]);
        known[0].name = "Alice (renamed)".to_string();

        let window = select_active_speakers(&known, &peers(&["A"]), &[], 1);
        assert_eq!(window[0].name, "Alice (renamed)");
    }

    #[test]
    fn test_selector_reports_changes() {
        let known = peers(&["A", "B", "C"]);
        let mut selector = ActiveSpeakerSelector::new(2);

        assert!(selector.update(&known, &peers(&["C"])));
        assert_eq!(ids(selector.window()), vec!["C", "A"]);

        // Same speaker again: nothing moves
        assert!(!selector.update(&known, &peers(&["C"])));

        // Silence keeps the window
        assert!(!selector.update(&known, &[]));
        assert_eq!(ids(selector.window()), vec!["C", "A"]);
    }

    #[test]
    fn test_selector_retain_known_backfills_vacated_slot() {
        let known = peers(&["A", "B", "C"]);
        let mut selector = ActiveSpeakerSelector::new(2);
        selector.update(&known, &peers(&["B", "C"]));

        let remaining = peers(&["A", "C"]);
        assert!(selector.retain_known(&remaining));
        assert_eq!(ids(selector.window()), vec!["A", "C"]);

        selector.reset();
        assert!(selector.window().is_empty());
    }

    #[test]
    fn test_departure_inside_window_keeps_survivor_indices() {
        let known = peers(&["A", "B", "C", "D", "E", "F"]);
        let mut selector = ActiveSpeakerSelector::new(4);
        selector.update(&known, &[]);
        assert_eq!(ids(selector.window()), vec!["A", "B", "C", "D"]);

        let remaining = peers(&["A", "C", "D", "E", "F"]);
        assert!(selector.retain_known(&remaining));
        assert_eq!(ids(selector.window()), vec!["A", "E", "C", "D"]);

        // The next silent tick is a no-op
        assert!(!selector.update(&remaining, &[]));
        assert_eq!(ids(selector.window()), vec!["A", "E", "C", "D"]);
    }

    #[test]
    fn test_retain_known_refreshes_without_reordering() {
        let known = peers(&["A", "B"]);
        let mut selector = ActiveSpeakerSelector::new(2);
        selector.update(&known, &peers(&["B"]));

        let mut renamed = known.clone();
        renamed[1].name = "Bob".to_string();
        assert!(!selector.retain_known(&renamed));
        assert_eq!(ids(selector.window()), vec!["B", "A"]);
        assert_eq!(selector.window()[0].name, "Bob");
    }

    #[test]
    fn test_retain_known_does_not_grow_short_window() {
        let mut selector = ActiveSpeakerSelector::new(4);
        selector.update(&peers(&["A", "B"]), &[]);

        // A late joiner does not enter the window outside a speaker tick
        assert!(!selector.retain_known(&peers(&["A", "B", "C"])));
        assert_eq!(ids(selector.window()), vec!["A", "B"]);
    }

    #[test]
    fn test_window_never_exceeds_capacity_or_repeats() {
        let known = peers(&["A", "B", "C", "D", "E", "F", "G"]);
        let ticks: [&[&str]; 6] = [
            &["A"],
            &[],
            &["G", "F"],
            &["B", "B", "C", "D", "E"],
            &["ghost"],
            &["A", "G"],
        ];

        for capacity in 0..=8 {
            let mut selector = ActiveSpeakerSelector::new(capacity);
            for tick in ticks {
                selector.update(&known, &peers(tick));
                let window = selector.window();
                assert!(window.len() <= capacity);
                assert!(window.len() <= known.len());

                let mut seen = ids(window);
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), window.len(), "duplicate in {:?}", ids(window));
            }
        }
    }
}
