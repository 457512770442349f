//! Playback engine - core orchestration
//!
//! Owns the session state and coordinates the play order, volume, media
//! adapter and transition policy. Every mutation goes through a command
//! method (or [`PlaybackEngine::dispatch`]) or a media callback
//! ([`PlaybackEngine::handle_media_event`]); each one ends by re-syncing the
//! media binding and queueing a phase change event when the phase moved.

use crate::{
    error::{PlaybackError, Result},
    events::{MediaEvent, PlaybackCommand, PlaybackEvent},
    media::{MediaAdapter, MediaBinding, MediaErrorKind, Settlement},
    queue::PlayOrder,
    random::{RandomSource, StdRandom},
    transition::{ExpiredTimer, TrackEndAction, TransitionController},
    types::{PlayRequestId, PlaybackConfig, PlaybackPhase, SessionSnapshot, TimerToken},
    volume::Volume,
};
use encore_core::{AdCatalog, AdDescriptor, AdId, EncoreError, Track, TrackSource};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Central playback management
///
/// Orchestrates:
/// - Play order (sequential or shuffled, always wrapping)
/// - Volume with mute snapshot
/// - Media binding directives and lifecycle callbacks
/// - Track-end policy: repeat, interstitial ads, advance
/// - Format fallback after media failures
pub struct PlaybackEngine<B: MediaBinding> {
    config: PlaybackConfig,

    // Queue
    tracks: Vec<Track>,
    order: PlayOrder,
    current_index: Option<usize>,
    // Bumped on every selection so re-selecting a track reloads it
    track_serial: u64,

    // Flags
    is_playing: bool,
    is_shuffled: bool,
    is_repeating: bool,

    // Position
    progress: f64,
    duration: f64,

    // Errors
    error: Option<String>,
    has_error: bool,

    // Interstitials
    showing_ad: bool,
    current_ad: Option<AdDescriptor>,

    volume: Volume,
    media: MediaAdapter<B>,
    transitions: TransitionController,
    catalog: Box<dyn AdCatalog>,
    rng: Box<dyn RandomSource>,

    // (url, mime) corrections applied so far
    fallbacks: Vec<(String, String)>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
    last_phase: PlaybackPhase,
}

impl<B: MediaBinding> PlaybackEngine<B> {
    /// Create a new engine over a media binding and ad catalog
    ///
    /// Fails if the config is invalid or the catalog is empty.
    pub fn new(
        config: PlaybackConfig,
        binding: B,
        catalog: impl AdCatalog + 'static,
    ) -> Result<Self> {
        config.validate()?;
        if catalog.ads().is_empty() {
            return Err(EncoreError::EmptyCatalog.into());
        }

        Ok(Self {
            tracks: Vec::new(),
            order: PlayOrder::new(),
            current_index: None,
            track_serial: 0,
            is_playing: false,
            is_shuffled: config.shuffle,
            is_repeating: config.repeat,
            progress: 0.0,
            duration: 0.0,
            error: None,
            has_error: false,
            showing_ad: false,
            current_ad: None,
            volume: Volume::new(config.volume),
            media: MediaAdapter::new(binding),
            transitions: TransitionController::new(config.ad_probability, config.ad_duration()),
            catalog: Box::new(catalog),
            rng: Box::new(StdRandom::from_entropy()),
            fallbacks: Vec::new(),
            pending_events: Vec::new(),
            last_phase: PlaybackPhase::Idle,
            config,
        })
    }

    /// Replace the random source (tests use scripted draws)
    #[must_use]
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    // ===== Queue =====

    /// Replace the queue
    ///
    /// A length change regenerates the play order. An empty queue returns
    /// the engine to idle; a first non-empty queue selects the head of the
    /// current order. Otherwise the current index is kept when still valid.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        let old_len = self.tracks.len();
        self.tracks = tracks;
        self.reapply_fallbacks();

        let len = self.tracks.len();
        if len != old_len {
            self.order.regenerate(len, self.is_shuffled, self.rng.as_mut());
            self.emit(PlaybackEvent::QueueChanged { length: len });
        }

        if len == 0 {
            if old_len > 0 {
                info!("Queue emptied, returning to idle");
            }
            self.reset_session();
            self.commit();
            return;
        }

        match self.current_index {
            Some(index) if index < len => {}
            _ => {
                if let Some(first) = self.order.first() {
                    debug!(index = first, len, "Starting queue");
                    self.dismiss_ad(false);
                    self.start_track(first, self.config.autoplay);
                }
            }
        }
        self.commit();
    }

    /// Copy the queue from a track source
    pub fn load_from_source(&mut self, source: &dyn TrackSource) {
        self.set_tracks(source.tracks());
    }

    /// Replay format-fallback corrections into a track source
    ///
    /// Returns how many source entries changed.
    pub fn apply_fallbacks_to(&self, source: &mut dyn TrackSource) -> usize {
        self.fallbacks
            .iter()
            .filter(|(url, mime)| source.apply_mime_fallback(url, mime))
            .count()
    }

    // ===== Playback Control =====

    /// Toggle between playing and paused
    ///
    /// No effect while idle or while an ad is on screen.
    pub fn toggle_play(&mut self) {
        if self.current_index.is_none() || self.showing_ad {
            return;
        }
        self.is_playing = !self.is_playing;
        self.commit();
    }

    /// Skip to the next track in play order (wraps)
    pub fn play_next_track(&mut self) {
        let Some(current) = self.current_index else {
            return;
        };
        if let Some(next) = self.order.next_index(current) {
            self.dismiss_ad(true);
            self.start_track(next, true);
        }
        self.commit();
    }

    /// Go to the previous track in play order (wraps)
    pub fn play_previous_track(&mut self) {
        let Some(current) = self.current_index else {
            return;
        };
        if let Some(previous) = self.order.previous_index(current) {
            self.dismiss_ad(true);
            self.start_track(previous, true);
        }
        self.commit();
    }

    /// Play the track at `index`
    ///
    /// Manual selection switches shuffle off so navigation continues
    /// sequentially from the chosen track.
    pub fn handle_track_select(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        if self.is_shuffled {
            self.is_shuffled = false;
            self.order
                .regenerate(self.tracks.len(), false, self.rng.as_mut());
        }
        self.dismiss_ad(true);
        self.start_track(index, true);
        self.commit();
        Ok(())
    }

    /// Stop: pause, rewind to 0 and drop any interstitial
    pub fn handle_stop(&mut self) {
        if self.current_index.is_none() {
            return;
        }
        self.dismiss_ad(false);
        self.is_playing = false;
        self.progress = 0.0;
        self.media.seek(0.0);
        self.commit();
    }

    /// Seek within the current track
    ///
    /// Negative positions clamp to 0; positions past a known duration clamp
    /// to the duration.
    pub fn handle_progress_change(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(seconds));
        }
        if self.current_index.is_none() {
            return Err(PlaybackError::QueueEmpty);
        }

        let mut target = seconds.max(0.0);
        if self.duration > 0.0 {
            target = target.min(self.duration);
        }
        self.progress = target;
        self.media.seek(target);
        self.commit();
        Ok(())
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0); mute state is unchanged
    pub fn handle_volume_change(&mut self, volume: f64) {
        self.volume.set_level(volume);
        self.emit_volume_changed();
        self.commit();
    }

    /// Toggle mute, restoring the pre-mute volume on unmute
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.emit_volume_changed();
        self.commit();
    }

    // ===== Modes =====

    /// Toggle shuffle and regenerate the play order
    pub fn toggle_shuffle(&mut self) {
        self.is_shuffled = !self.is_shuffled;
        self.order
            .regenerate(self.tracks.len(), self.is_shuffled, self.rng.as_mut());
        debug!(shuffled = self.is_shuffled, "Shuffle toggled");
        self.commit();
    }

    /// Toggle repeat of the current track
    pub fn toggle_repeat(&mut self) {
        self.is_repeating = !self.is_repeating;
        self.commit();
    }

    // ===== Advertisements =====

    /// Put a random ad on screen without advancing afterwards
    ///
    /// The auto-close timer only dismisses the ad. No effect while idle,
    /// when an ad is already showing, or when the catalog has no ads.
    pub fn show_advertisement(&mut self) {
        if self.current_index.is_none() || self.showing_ad {
            return;
        }
        let ad_count = self.catalog.ads().len();
        if ad_count == 0 {
            warn!("Ad catalog is empty, nothing to show");
            return;
        }
        let ad_index = self.rng.index_below(ad_count);
        self.begin_ad(ad_index, false);
        self.commit();
    }

    /// Dismiss the ad and resume the current track
    pub fn close_advertisement(&mut self) {
        if !self.showing_ad {
            return;
        }
        self.dismiss_ad(false);
        self.is_playing = true;
        self.commit();
    }

    /// Advance the engine's clock, firing the ad timer when due
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(expired) = self.transitions.tick(elapsed) {
            self.on_ad_timeout(expired);
        }
    }

    /// Fire the ad timer armed with `token`; stale tokens are ignored
    pub fn handle_ad_timeout(&mut self, token: TimerToken) {
        match self.transitions.expire(token) {
            Some(expired) => self.on_ad_timeout(expired),
            None => debug!(%token, "Ignoring stale ad timer"),
        }
    }

    // ===== Media callbacks =====

    /// Read the playhead from the binding
    pub fn handle_time_update(&mut self) {
        if self.current_index.is_none() {
            return;
        }
        self.progress = self.media.position();
    }

    /// Read the duration from the binding and clear any error
    pub fn handle_loaded_metadata(&mut self) {
        if self.current_index.is_none() {
            return;
        }
        self.duration = self.media.duration();
        self.clear_error();
        self.commit();
    }

    /// Route a lifecycle callback from the media binding
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate => self.handle_time_update(),
            MediaEvent::LoadedMetadata => self.handle_loaded_metadata(),
            MediaEvent::Error { code } => self.handle_media_error(code),
            MediaEvent::Ended => self.handle_ended(),
            MediaEvent::PlayResolved { request } => self.handle_play_resolved(request),
            MediaEvent::PlayRejected { request, reason } => {
                self.handle_play_rejected(request, &reason)
            }
        }
    }

    /// Route a UI command
    pub fn dispatch(&mut self, command: PlaybackCommand) -> Result<()> {
        match command {
            PlaybackCommand::TogglePlay => self.toggle_play(),
            PlaybackCommand::Next => self.play_next_track(),
            PlaybackCommand::Previous => self.play_previous_track(),
            PlaybackCommand::SelectTrack { index } => return self.handle_track_select(index),
            PlaybackCommand::SetVolume { volume } => self.handle_volume_change(volume),
            PlaybackCommand::ToggleMute => self.toggle_mute(),
            PlaybackCommand::ToggleShuffle => self.toggle_shuffle(),
            PlaybackCommand::ToggleRepeat => self.toggle_repeat(),
            PlaybackCommand::Seek { seconds } => return self.handle_progress_change(seconds),
            PlaybackCommand::Stop => self.handle_stop(),
            PlaybackCommand::ShowAdvertisement => self.show_advertisement(),
            PlaybackCommand::CloseAdvertisement => self.close_advertisement(),
        }
        Ok(())
    }

    /// Tear the session down: cancel timers, pause, empty the queue
    ///
    /// Any in-flight play directive settles as a no-op afterwards.
    pub fn shutdown(&mut self) {
        self.transitions.cancel_auto_close();
        self.media.release();
        self.tracks.clear();
        self.order
            .regenerate(0, self.is_shuffled, self.rng.as_mut());
        self.reset_session();
        self.commit();
    }

    // ===== State Queries =====

    /// Coarse state of the transition state machine
    pub fn phase(&self) -> PlaybackPhase {
        if self.current_index.is_none() {
            PlaybackPhase::Idle
        } else if self.showing_ad {
            PlaybackPhase::AdShowing
        } else if self.is_playing {
            PlaybackPhase::Playing
        } else if self.has_error {
            PlaybackPhase::Error
        } else {
            PlaybackPhase::Paused
        }
    }

    /// Currently selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    /// Queue index of the current track
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Whole queue, with any format corrections applied
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Current visiting order
    pub fn shuffled_indices(&self) -> &[usize] {
        self.order.as_slice()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn is_repeating(&self) -> bool {
        self.is_repeating
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    pub fn previous_volume(&self) -> f64 {
        self.volume.previous_level()
    }

    /// Volume actually applied to the binding (0 while muted)
    pub fn effective_volume(&self) -> f64 {
        self.volume.effective()
    }

    /// Seconds elapsed in the current track
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Duration of the current track in seconds, 0 until metadata loads
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn showing_ad(&self) -> bool {
        self.showing_ad
    }

    pub fn current_ad_id(&self) -> Option<&AdId> {
        self.current_ad.as_ref().map(|ad| &ad.id)
    }

    /// Ad currently on screen
    pub fn current_ad(&self) -> Option<&AdDescriptor> {
        self.current_ad.as_ref()
    }

    /// Token of the armed auto-close timer
    pub fn ad_timer(&self) -> Option<TimerToken> {
        self.transitions.armed_token()
    }

    /// Latest play directive still awaiting settlement
    pub fn pending_play(&self) -> Option<PlayRequestId> {
        self.media.pending_play()
    }

    /// `(url, mime)` corrections applied so far
    pub fn fallbacks(&self) -> &[(String, String)] {
        &self.fallbacks
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Borrow the media binding
    pub fn media(&self) -> &B {
        self.media.binding()
    }

    /// Mutably borrow the media binding
    pub fn media_mut(&mut self) -> &mut B {
        self.media.binding_mut()
    }

    /// Serializable view of every observable field
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            current_track: self.current_track().cloned(),
            current_index: self.current_index,
            queue_len: self.tracks.len(),
            is_playing: self.is_playing,
            volume: self.volume.level(),
            previous_volume: self.volume.previous_level(),
            effective_volume: self.volume.effective(),
            is_muted: self.volume.is_muted(),
            progress: self.progress,
            duration: self.duration,
            error: self.error.clone(),
            has_error: self.has_error,
            is_shuffled: self.is_shuffled,
            is_repeating: self.is_repeating,
            showing_ad: self.showing_ad,
            current_ad_id: self.current_ad_id().cloned(),
        }
    }

    // ===== Events =====

    /// Drain pending events (call after each command or callback)
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal: transitions =====

    fn handle_ended(&mut self) {
        let Some(index) = self.current_index else {
            return;
        };
        // The ad's own timer decides what follows it
        if self.showing_ad {
            debug!(index, "Ignoring track end while an ad is showing");
            return;
        }
        self.media.note_stopped();

        let action =
            self.transitions
                .on_track_end(self.is_repeating, self.catalog.ads().len(), self.rng.as_mut());
        debug!(index, ?action, "Track ended");

        match action {
            TrackEndAction::Restart => {
                self.progress = 0.0;
                self.media.seek(0.0);
                self.is_playing = true;
            }
            TrackEndAction::ShowAd { ad_index } => self.begin_ad(ad_index, true),
            TrackEndAction::Advance => {
                if let Some(next) = self.order.next_index(index) {
                    self.start_track(next, true);
                }
            }
        }
        self.commit();
    }

    fn on_ad_timeout(&mut self, expired: ExpiredTimer) {
        debug!(token = %expired.token, advance = expired.advance, "Ad timer fired");
        let ad_id = self.current_ad.as_ref().map(|ad| ad.id.clone());
        self.showing_ad = false;
        self.current_ad = None;
        self.is_playing = true;

        if let Some(ad_id) = ad_id {
            self.emit(PlaybackEvent::AdClosed {
                ad_id,
                advanced: expired.advance,
            });
        }

        if expired.advance {
            if let Some(next) = self.current_index.and_then(|i| self.order.next_index(i)) {
                self.start_track(next, true);
            }
        }
        self.commit();
    }

    fn begin_ad(&mut self, ad_index: usize, advance: bool) {
        let Some(ad) = self.catalog.ads().get(ad_index).cloned() else {
            warn!(ad_index, "Ad index out of range, skipping interstitial");
            return;
        };

        info!(ad_id = %ad.id, advance, "Showing interstitial");
        self.showing_ad = true;
        self.is_playing = false;
        self.emit(PlaybackEvent::AdStarted {
            ad_id: ad.id.clone(),
        });
        self.current_ad = Some(ad);

        let token = self.transitions.arm_auto_close(advance);
        let delay_ms = u64::try_from(self.transitions.ad_duration().as_millis()).unwrap_or(u64::MAX);
        self.emit(PlaybackEvent::AdTimerArmed { token, delay_ms });
    }

    /// Drop any ad and its timer without touching playback intent
    fn dismiss_ad(&mut self, advancing: bool) {
        if self.transitions.cancel_auto_close() {
            self.emit(PlaybackEvent::AdTimerCancelled);
        }
        if let Some(ad) = self.current_ad.take() {
            self.emit(PlaybackEvent::AdClosed {
                ad_id: ad.id,
                advanced: advancing,
            });
        }
        self.showing_ad = false;
    }

    fn start_track(&mut self, index: usize, play: bool) {
        let previous_index = self.current_index;
        self.current_index = Some(index);
        self.track_serial += 1;
        self.progress = 0.0;
        self.duration = 0.0;
        self.is_playing = play;
        self.clear_error();

        if let Some(track) = self.tracks.get(index) {
            info!(index, title = %track.title, url = %track.url, "Track selected");
        }
        self.emit(PlaybackEvent::TrackChanged {
            index,
            previous_index,
        });
    }

    fn reset_session(&mut self) {
        if self.transitions.cancel_auto_close() {
            self.emit(PlaybackEvent::AdTimerCancelled);
        }
        self.media.release();
        self.current_index = None;
        self.is_playing = false;
        self.progress = 0.0;
        self.duration = 0.0;
        self.showing_ad = false;
        self.current_ad = None;
        self.clear_error();
    }

    // ===== Internal: media failures =====

    fn handle_media_error(&mut self, code: u16) {
        let Some(index) = self.current_index else {
            return;
        };

        let message = match MediaErrorKind::from_code(code) {
            Some(kind) => {
                warn!(index, code, ?kind, "Media error");
                if kind != MediaErrorKind::Aborted {
                    // The element stops on fetch/decode failures
                    self.is_playing = false;
                    self.media.note_stopped();
                }
                if kind.allows_fallback() {
                    self.apply_format_fallback(index);
                }
                kind.message().to_string()
            }
            None => {
                warn!(index, code, "Unknown media error code");
                format!("Unknown media error (code {code}).")
            }
        };

        self.set_error(message);
        self.commit();
    }

    fn handle_play_resolved(&mut self, request: PlayRequestId) {
        if self.media.settle(request) == Settlement::Stale {
            debug!(%request, "Ignoring stale play resolution");
        }
    }

    fn handle_play_rejected(&mut self, request: PlayRequestId, reason: &str) {
        if self.media.settle(request) == Settlement::Stale {
            debug!(%request, reason, "Ignoring stale play rejection");
            return;
        }
        let Some(index) = self.current_index else {
            return;
        };

        warn!(%request, index, reason, "Play directive rejected");
        self.is_playing = false;
        self.media.note_stopped();

        let probe_failed = self
            .tracks
            .get(index)
            .is_some_and(|track| !self.media.can_play_type(&track.mime));
        if probe_failed {
            self.apply_format_fallback(index);
        }

        self.set_error(format!("Playback failed: {reason}"));
        self.commit();
    }

    /// Swap the track's MIME for the generic fallback, once
    ///
    /// The corrected entry is used the next time the track is selected; the
    /// current attempt is not retried.
    fn apply_format_fallback(&mut self, index: usize) -> bool {
        let fallback = self.config.fallback_mime.clone();
        let Some(track) = self.tracks.get(index) else {
            return false;
        };
        if track.mime.eq_ignore_ascii_case(&fallback) {
            return false;
        }

        info!(index, url = %track.url, from = %track.mime, to = %fallback, "Applying format fallback");
        let corrected = track.with_mime(fallback.clone());
        let url = corrected.url.clone();
        self.tracks[index] = corrected;

        if !self.fallbacks.iter().any(|(u, _)| *u == url) {
            self.fallbacks.push((url.clone(), fallback.clone()));
        }
        self.emit(PlaybackEvent::FormatFallback {
            index,
            url,
            mime: fallback,
        });
        true
    }

    /// Carry earlier corrections over to a replaced queue
    fn reapply_fallbacks(&mut self) {
        if self.fallbacks.is_empty() {
            return;
        }
        for track in &mut self.tracks {
            if let Some((_, mime)) = self.fallbacks.iter().find(|(url, _)| *url == track.url) {
                if track.mime != *mime {
                    *track = track.with_mime(mime.clone());
                }
            }
        }
    }

    fn set_error(&mut self, message: String) {
        self.error = Some(message.clone());
        self.has_error = true;
        self.emit(PlaybackEvent::Error { message });
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.has_error = false;
    }

    // ===== Internal: sync =====

    /// Push session state to the binding and emit a phase change if any
    fn commit(&mut self) {
        self.sync_media();

        let phase = self.phase();
        if phase != self.last_phase {
            debug!(from = ?self.last_phase, to = ?phase, "Phase changed");
            self.last_phase = phase;
            self.emit(PlaybackEvent::StateChanged { phase });
        }
    }

    fn sync_media(&mut self) {
        let Some(track) = self.current_index.and_then(|i| self.tracks.get(i)) else {
            return;
        };

        self.media.ensure_loaded(self.track_serial, track);
        self.media.apply_volume(self.volume.effective());
        if let Some(request) = self.media.apply_playback_intent(self.is_playing) {
            debug!(%request, url = %track.url, "Play directive issued");
        }
    }

    fn emit_volume_changed(&mut self) {
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}
