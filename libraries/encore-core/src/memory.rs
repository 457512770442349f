//! In-memory collaborators
//!
//! Simple `TrackSource` and `AdCatalog` implementations backed by vectors.
//! Hosts with a fixed playlist or a compiled-in ad list use these directly.

use crate::error::{EncoreError, Result};
use crate::traits::{AdCatalog, TrackSource};
use crate::types::{AdDescriptor, Track};

/// Track source over an owned list
#[derive(Debug, Clone, Default)]
pub struct StaticTrackSource {
    tracks: Vec<Track>,
}

impl StaticTrackSource {
    /// Create a source from a list of tracks
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Parse a JSON array of tracks
    ///
    /// Entries without a URL are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        if let Some(position) = tracks.iter().position(|t| t.url.trim().is_empty()) {
            return Err(EncoreError::invalid_input(format!(
                "track {position} has no url"
            )));
        }
        Ok(Self::new(tracks))
    }

    /// Replace the whole list
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    /// Append a single track
    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Number of tracks held
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the source is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl TrackSource for StaticTrackSource {
    fn tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn apply_mime_fallback(&mut self, url: &str, mime: &str) -> bool {
        let mut updated = false;
        for track in self.tracks.iter_mut().filter(|t| t.url == url) {
            if track.mime != mime {
                *track = track.with_mime(mime);
                updated = true;
            }
        }
        updated
    }
}

/// Non-empty advertisement list
#[derive(Debug, Clone)]
pub struct StaticAdCatalog {
    ads: Vec<AdDescriptor>,
}

impl StaticAdCatalog {
    /// Create a catalog, rejecting an empty list
    pub fn new(ads: Vec<AdDescriptor>) -> Result<Self> {
        if ads.is_empty() {
            return Err(EncoreError::EmptyCatalog);
        }
        Ok(Self { ads })
    }

    /// Parse a JSON array of advertisements
    pub fn from_json(json: &str) -> Result<Self> {
        let ads: Vec<AdDescriptor> = serde_json::from_str(json)?;
        Self::new(ads)
    }
}

impl AdCatalog for StaticAdCatalog {
    fn ads(&self) -> &[AdDescriptor] {
        &self.ads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdId, FALLBACK_MIME};

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            StaticAdCatalog::new(Vec::new()),
            Err(EncoreError::EmptyCatalog)
        ));
    }

    #[test]
    fn catalog_lookup_by_id() {
        let catalog = StaticAdCatalog::new(vec![
            AdDescriptor::with_id("a", "First", "one"),
            AdDescriptor::with_id("b", "Second", "two"),
        ])
        .unwrap();

        assert_eq!(catalog.get(&AdId::new("b")).unwrap().title, "Second");
        assert!(catalog.get(&AdId::new("zzz")).is_none());
    }

    #[test]
    fn catalog_from_json() {
        let json = r#"[{"id":"promo","title":"Promo","description":"Buy now","image_url":"/img/promo.png"}]"#;
        let catalog = StaticAdCatalog::from_json(json).unwrap();
        assert_eq!(catalog.ads()[0].id.as_str(), "promo");
        assert_eq!(catalog.ads()[0].image_url.as_deref(), Some("/img/promo.png"));

        assert!(matches!(
            StaticAdCatalog::from_json("[]"),
            Err(EncoreError::EmptyCatalog)
        ));
        assert!(matches!(
            StaticAdCatalog::from_json("not json"),
            Err(EncoreError::Serialization(_))
        ));
    }

    #[test]
    fn track_list_from_json_requires_urls() {
        let json = r#"[{"title":"A","url":"a.ogg","mime":"audio/ogg"}]"#;
        let source = StaticTrackSource::from_json(json).unwrap();
        assert_eq!(source.len(), 1);

        let json = r#"[{"title":"A","url":"a.ogg","mime":"audio/ogg"},{"title":"B","url":" ","mime":"audio/ogg"}]"#;
        assert!(matches!(
            StaticTrackSource::from_json(json),
            Err(EncoreError::InvalidInput(msg)) if msg == "track 1 has no url"
        ));
    }

    #[test]
    fn mime_fallback_updates_matching_urls_only() {
        let mut source = StaticTrackSource::new(vec![
            Track::new("A", "a.ogg", "audio/ogg"),
            Track::new("B", "b.flac", "audio/flac"),
        ]);

        assert!(source.apply_mime_fallback("a.ogg", FALLBACK_MIME));
        assert!(!source.apply_mime_fallback("a.ogg", FALLBACK_MIME));
        assert!(!source.apply_mime_fallback("missing.ogg", FALLBACK_MIME));

        let tracks = source.tracks();
        assert_eq!(tracks[0].mime, FALLBACK_MIME);
        assert_eq!(tracks[1].mime, "audio/flac");
    }
}
