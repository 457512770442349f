//! Playback Events
//!
//! Three message families cross the engine boundary:
//! - [`PlaybackCommand`]: UI intent, routed through `PlaybackEngine::dispatch`
//! - [`MediaEvent`]: lifecycle callbacks from the media binding
//! - [`PlaybackEvent`]: notifications queued for the UI, read with
//!   `PlaybackEngine::drain_events`

use crate::types::{PlayRequestId, PlaybackPhase, TimerToken};
use encore_core::AdId;
use serde::{Deserialize, Serialize};

/// Commands accepted from the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackCommand {
    TogglePlay,
    Next,
    Previous,
    SelectTrack { index: usize },
    SetVolume { volume: f64 },
    ToggleMute,
    ToggleShuffle,
    ToggleRepeat,
    Seek { seconds: f64 },
    Stop,
    ShowAdvertisement,
    CloseAdvertisement,
}

/// Lifecycle callbacks delivered by the media binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// Playback position moved
    TimeUpdate,

    /// Duration became known
    LoadedMetadata,

    /// Media element reported an error code
    Error {
        /// `MediaError.code` (1-4 in browsers)
        code: u16,
    },

    /// Track reached its end
    Ended,

    /// A play directive started playback
    PlayResolved {
        /// Token of the directive that settled
        request: PlayRequestId,
    },

    /// A play directive was refused
    PlayRejected {
        /// Token of the directive that settled
        request: PlayRequestId,
        /// Reason reported by the decoding surface
        reason: String,
    },
}

/// Notifications emitted for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Phase of the state machine changed
    StateChanged {
        /// The new phase
        phase: PlaybackPhase,
    },

    /// A different track was selected
    TrackChanged {
        /// Queue index of the new track
        index: usize,
        /// Queue index of the previous track (if any)
        previous_index: Option<usize>,
    },

    /// Queue length changed
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Requested level
        volume: f64,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// An interstitial went on screen
    AdStarted {
        /// Id of the selected ad
        ad_id: AdId,
    },

    /// The interstitial was dismissed
    AdClosed {
        /// Id of the ad that closed
        ad_id: AdId,
        /// Whether the queue advanced as part of closing
        advanced: bool,
    },

    /// Auto-close timer armed; hosts with real timers should call
    /// `handle_ad_timeout(token)` after `delay_ms`
    AdTimerArmed {
        /// Token to hand back
        token: TimerToken,
        /// Delay in milliseconds
        delay_ms: u64,
    },

    /// Any pending auto-close timer was cancelled
    AdTimerCancelled,

    /// A track's MIME type was replaced with the generic fallback
    FormatFallback {
        /// Queue index of the corrected track
        index: usize,
        /// URL of the corrected track
        url: String,
        /// MIME type now recorded for it
        mime: String,
    },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_tagged_json() {
        let json = serde_json::to_string(&PlaybackCommand::SelectTrack { index: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"select_track","index":2}"#);

        let parsed: PlaybackCommand = serde_json::from_str(r#"{"type":"toggle_mute"}"#).unwrap();
        assert_eq!(parsed, PlaybackCommand::ToggleMute);
    }

    #[test]
    fn media_events_round_trip_tokens() {
        let json = r#"{"type":"play_rejected","request":4,"reason":"NotAllowedError"}"#;
        let event: MediaEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            MediaEvent::PlayRejected {
                request: PlayRequestId(4),
                reason: "NotAllowedError".to_string(),
            }
        );
    }
}
