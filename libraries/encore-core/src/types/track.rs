//! Track domain type

use serde::{Deserialize, Serialize};

/// Generic audio MIME type used when a track's declared type fails to play
pub const FALLBACK_MIME: &str = "audio/mpeg";

/// Playable media item supplied by a track source
///
/// Tracks are values: the playback engine never edits a source's tracks in
/// place. A corrected copy is produced with [`Track::with_mime`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Media URL handed to the decoding surface
    pub url: String,

    /// Declared MIME type, e.g. `audio/ogg`
    pub mime: String,

    /// Artist name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    /// Album name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Duration in seconds, when the source knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Cover art URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(title: impl Into<String>, url: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            mime: mime.into(),
            artist: None,
            album: None,
            duration: None,
            cover: None,
        }
    }

    /// Builder-style artist setter
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Builder-style album setter
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Builder-style duration setter (seconds)
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Builder-style cover setter
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Copy of this track with a different MIME type
    #[must_use]
    pub fn with_mime(&self, mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            ..self.clone()
        }
    }

    /// Whether the track already carries the generic fallback type
    pub fn uses_fallback_mime(&self) -> bool {
        self.mime.eq_ignore_ascii_case(FALLBACK_MIME)
    }
}
