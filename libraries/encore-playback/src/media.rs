//! Media binding seam
//!
//! [`MediaBinding`] is the decoding surface (an `<audio>` element in the
//! browser, a mock in tests). [`MediaAdapter`] is the only code that talks to
//! it: it remembers what it last pushed so directives are issued on change
//! only, and it tags every play directive with a [`PlayRequestId`] so late
//! settlements can be told apart from current ones.

use crate::types::PlayRequestId;
use encore_core::Track;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform decoding surface driven by the engine
///
/// Implementors deliver lifecycle callbacks back to the engine as
/// [`crate::MediaEvent`]s. `play` is asynchronous: its outcome must be
/// reported as `PlayResolved` or `PlayRejected` carrying the same request.
pub trait MediaBinding {
    /// Point the surface at a new source
    fn load(&mut self, track: &Track);

    /// Start playback; settle later with the given request token
    fn play(&mut self, request: PlayRequestId);

    /// Pause playback (synchronous, cannot fail)
    fn pause(&mut self);

    /// Move the playhead (seconds)
    fn set_current_time(&mut self, seconds: f64);

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f64);

    /// Current playhead position in seconds
    fn current_time(&self) -> f64;

    /// Total duration in seconds (NaN or 0 when unknown)
    fn duration(&self) -> f64;

    /// Whether the surface believes it can decode `mime`
    ///
    /// Used as a throwaway probe after a failed play directive.
    fn can_play_type(&self, mime: &str) -> bool {
        let _ = mime;
        true
    }
}

/// Kind of failure reported by the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaErrorKind {
    /// Fetch aborted at the user's request
    Aborted,
    /// Network failure while fetching
    Network,
    /// Data could not be decoded
    Decode,
    /// Source type not supported
    FormatNotSupported,
}

impl MediaErrorKind {
    /// Map a `MediaError.code` value
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Aborted),
            2 => Some(Self::Network),
            3 => Some(Self::Decode),
            4 => Some(Self::FormatNotSupported),
            _ => None,
        }
    }

    /// Message shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Self::Aborted => "Playback was aborted before the track loaded.",
            Self::Network => "Network error while loading this track.",
            Self::Decode => "Audio playback failed due to a decode error.",
            Self::FormatNotSupported => "This track's format is not supported.",
        }
    }

    /// Whether swapping to the generic MIME type might help
    pub fn allows_fallback(self) -> bool {
        !matches!(self, Self::Aborted)
    }
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of matching a play settlement against the latest directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Settlement belongs to the latest directive
    Current,
    /// Settlement belongs to an older directive and must be ignored
    Stale,
}

/// Change-tracking driver for a [`MediaBinding`]
#[derive(Debug)]
pub struct MediaAdapter<B> {
    binding: B,

    /// Serial and URL of the source last loaded
    loaded: Option<(u64, String)>,

    /// Whether the last intent pushed was "play"
    playing: bool,

    /// Volume last pushed
    applied_volume: Option<f64>,

    /// Counter for play request tokens
    next_request: u64,

    /// Latest play directive still awaiting settlement
    pending_play: Option<PlayRequestId>,
}

impl<B: MediaBinding> MediaAdapter<B> {
    /// Wrap a binding
    pub fn new(binding: B) -> Self {
        Self {
            binding,
            loaded: None,
            playing: false,
            applied_volume: None,
            next_request: 0,
            pending_play: None,
        }
    }

    /// Load `track` unless it is already the loaded source
    ///
    /// `serial` changes every time a track is (re)selected, so selecting
    /// the same entry twice reloads it.
    pub fn ensure_loaded(&mut self, serial: u64, track: &Track) -> bool {
        let up_to_date = matches!(&self.loaded, Some((s, url)) if *s == serial && *url == track.url);
        if up_to_date {
            return false;
        }

        self.binding.load(track);
        self.loaded = Some((serial, track.url.clone()));
        // A fresh source starts paused and orphans any earlier play directive
        self.playing = false;
        self.pending_play = None;
        true
    }

    /// Push play/pause intent if it differs from what was last pushed
    ///
    /// Returns the request token when a play directive was issued.
    pub fn apply_playback_intent(&mut self, is_playing: bool) -> Option<PlayRequestId> {
        match (is_playing, self.playing) {
            (true, false) => {
                self.next_request += 1;
                let request = PlayRequestId(self.next_request);
                self.playing = true;
                self.pending_play = Some(request);
                self.binding.play(request);
                Some(request)
            }
            (false, true) => {
                self.playing = false;
                self.pending_play = None;
                self.binding.pause();
                None
            }
            _ => None,
        }
    }

    /// Push volume if it changed
    pub fn apply_volume(&mut self, volume: f64) {
        if self.applied_volume != Some(volume) {
            self.applied_volume = Some(volume);
            self.binding.set_volume(volume);
        }
    }

    /// Match a play settlement against the latest directive
    pub fn settle(&mut self, request: PlayRequestId) -> Settlement {
        if self.pending_play == Some(request) {
            self.pending_play = None;
            Settlement::Current
        } else {
            Settlement::Stale
        }
    }

    /// Record that the surface stopped on its own (ended, error, rejection)
    pub fn note_stopped(&mut self) {
        self.playing = false;
        self.pending_play = None;
    }

    /// Move the playhead
    pub fn seek(&mut self, seconds: f64) {
        self.binding.set_current_time(seconds);
    }

    /// Playhead position, 0 when the surface reports garbage
    pub fn position(&self) -> f64 {
        finite_or_zero(self.binding.current_time())
    }

    /// Track duration, 0 until known
    pub fn duration(&self) -> f64 {
        finite_or_zero(self.binding.duration())
    }

    /// Probe whether `mime` is decodable
    pub fn can_play_type(&self, mime: &str) -> bool {
        self.binding.can_play_type(mime)
    }

    /// Pause if needed and forget all tracked state
    ///
    /// Any in-flight play directive becomes stale.
    pub fn release(&mut self) {
        if self.playing {
            self.binding.pause();
        }
        self.playing = false;
        self.pending_play = None;
        self.loaded = None;
    }

    /// Latest unsettled play directive
    pub fn pending_play(&self) -> Option<PlayRequestId> {
        self.pending_play
    }

    /// Borrow the binding
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Mutably borrow the binding
    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Log {
        calls: Vec<String>,
        time: f64,
        duration: f64,
    }

    impl MediaBinding for Log {
        fn load(&mut self, track: &Track) {
            self.calls.push(format!("load {}", track.url));
        }
        fn play(&mut self, request: PlayRequestId) {
            self.calls.push(format!("play {}", request.0));
        }
        fn pause(&mut self) {
            self.calls.push("pause".to_string());
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.calls.push(format!("seek {seconds}"));
        }
        fn set_volume(&mut self, volume: f64) {
            self.calls.push(format!("volume {volume}"));
        }
        fn current_time(&self) -> f64 {
            self.time
        }
        fn duration(&self) -> f64 {
            self.duration
        }
    }

    fn track(url: &str) -> Track {
        Track::new("t", url, "audio/ogg")
    }

    #[test]
    fn error_codes_map_to_kinds() {
        assert_eq!(MediaErrorKind::from_code(1), Some(MediaErrorKind::Aborted));
        assert_eq!(MediaErrorKind::from_code(2), Some(MediaErrorKind::Network));
        assert_eq!(MediaErrorKind::from_code(3), Some(MediaErrorKind::Decode));
        assert_eq!(
            MediaErrorKind::from_code(4),
            Some(MediaErrorKind::FormatNotSupported)
        );
        assert_eq!(MediaErrorKind::from_code(0), None);
        assert_eq!(MediaErrorKind::from_code(9), None);
        assert!(!MediaErrorKind::Aborted.allows_fallback());
        assert!(MediaErrorKind::Decode.allows_fallback());
    }

    #[test]
    fn directives_issue_on_change_only() {
        let mut adapter = MediaAdapter::new(Log::default());
        adapter.ensure_loaded(1, &track("a"));
        adapter.ensure_loaded(1, &track("a"));
        adapter.apply_volume(0.5);
        adapter.apply_volume(0.5);
        let first = adapter.apply_playback_intent(true);
        assert_eq!(adapter.apply_playback_intent(true), None);
        adapter.apply_playback_intent(false);
        adapter.apply_playback_intent(false);

        assert_eq!(first, Some(PlayRequestId(1)));
        assert_eq!(
            adapter.binding().calls,
            vec!["load a", "volume 0.5", "play 1", "pause"]
        );
    }

    #[test]
    fn reselect_reloads_same_url() {
        let mut adapter = MediaAdapter::new(Log::default());
        assert!(adapter.ensure_loaded(1, &track("a")));
        assert!(adapter.ensure_loaded(2, &track("a")));
        assert!(adapter.ensure_loaded(2, &track("b")));
    }

    #[test]
    fn new_source_makes_old_play_stale() {
        let mut adapter = MediaAdapter::new(Log::default());
        adapter.ensure_loaded(1, &track("a"));
        let old = adapter.apply_playback_intent(true).unwrap();

        adapter.ensure_loaded(2, &track("b"));
        let new = adapter.apply_playback_intent(true).unwrap();

        assert_eq!(adapter.settle(old), Settlement::Stale);
        assert_eq!(adapter.settle(new), Settlement::Current);
        // Settling twice is stale the second time
        assert_eq!(adapter.settle(new), Settlement::Stale);
    }

    #[test]
    fn release_pauses_and_invalidates() {
        let mut adapter = MediaAdapter::new(Log::default());
        adapter.ensure_loaded(1, &track("a"));
        let request = adapter.apply_playback_intent(true).unwrap();

        adapter.release();
        assert_eq!(adapter.settle(request), Settlement::Stale);
        assert_eq!(adapter.binding().calls.last().map(String::as_str), Some("pause"));
        assert!(adapter.ensure_loaded(1, &track("a")));
    }

    #[test]
    fn garbage_times_read_as_zero() {
        let mut adapter = MediaAdapter::new(Log::default());
        adapter.binding_mut().duration = f64::NAN;
        adapter.binding_mut().time = f64::INFINITY;
        assert_eq!(adapter.duration(), 0.0);
        assert_eq!(adapter.position(), 0.0);

        adapter.binding_mut().duration = 241.0;
        adapter.binding_mut().time = 12.5;
        assert_eq!(adapter.duration(), 241.0);
        assert_eq!(adapter.position(), 12.5);
    }
}
