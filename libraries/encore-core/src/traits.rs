//! Collaborator traits consumed by the playback engine

use crate::types::{AdDescriptor, Track};

/// Supplier of the ordered track queue
///
/// Implementations may be backed by a remote playlist, a local library, or a
/// fixed list. The engine copies the tracks it is given and never holds a
/// reference back into the source.
pub trait TrackSource {
    /// Current ordered sequence of tracks
    fn tracks(&self) -> Vec<Track>;

    /// Record a corrected MIME type for the track at `url`
    ///
    /// Sources that mirror their collection should update the matching
    /// entry so the correction survives a reload. Returns `true` when an
    /// entry was updated. The default does nothing.
    fn apply_mime_fallback(&mut self, url: &str, mime: &str) -> bool {
        let _ = (url, mime);
        false
    }
}

/// Static list of interstitial advertisements
///
/// The list must never be empty; see [`crate::StaticAdCatalog::new`].
pub trait AdCatalog {
    /// All available advertisements
    fn ads(&self) -> &[AdDescriptor];

    /// Look up an advertisement by id
    fn get(&self, id: &crate::AdId) -> Option<&AdDescriptor> {
        self.ads().iter().find(|ad| &ad.id == id)
    }
}
