//! # Call View Test Utilities
//!
//! Shared test utilities for `callview-core`.
//!
//! ## Modules
//!
//! - `fixtures` - Peer and track builders, SDK payload builders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use callview_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let alice = TestPeer::new("alice").with_name("Alice");
//!     let camera = TestTrack::camera("alice-cam");
//!
//!     let mut session = CallSession::default();
//!     session.ingest(track_added(&alice, &camera));
//!     session.ingest(speakers(&[&alice]));
//! }
//! ```

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::*;
