//! Core types for playback management

use crate::error::{PlaybackError, Result};
use encore_core::{AdId, Track, FALLBACK_MIME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f64,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial repeat flag (default: false)
    pub repeat: bool,

    /// Chance of an interstitial when a track ends naturally (default: 0.30)
    pub ad_probability: f64,

    /// Delay before an interstitial closes itself (default: 5000 ms)
    pub ad_duration_ms: u64,

    /// MIME type substituted after a format failure (default: `audio/mpeg`)
    pub fallback_mime: String,

    /// Start playing as soon as the first tracks arrive (default: true)
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            shuffle: false,
            repeat: false,
            ad_probability: 0.30,
            ad_duration_ms: 5000,
            fallback_mime: FALLBACK_MIME.to_string(),
            autoplay: true,
        }
    }
}

impl PlaybackConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(encore_core::EncoreError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ad_probability) {
            return Err(PlaybackError::InvalidConfig(format!(
                "ad_probability must be within 0.0-1.0, got {}",
                self.ad_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "volume must be within 0.0-1.0, got {}",
                self.volume
            )));
        }
        if self.fallback_mime.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "fallback_mime must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Ad auto-close delay
    pub fn ad_duration(&self) -> Duration {
        Duration::from_millis(self.ad_duration_ms)
    }
}

/// Coarse state of the transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Queue is empty
    Idle,

    /// Track selected and playing
    Playing,

    /// Track selected, not playing
    Paused,

    /// Interstitial on screen; media paused
    AdShowing,

    /// Last directive or media event failed; waiting for the user
    Error,
}

/// Token attached to each play directive
///
/// Settlements carrying anything but the latest token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayRequestId(pub u64);

impl fmt::Display for PlayRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "play#{}", self.0)
    }
}

/// Token identifying one armed ad auto-close timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Read-only view of the session for UI layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: PlaybackPhase,
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub queue_len: usize,
    pub is_playing: bool,
    pub volume: f64,
    pub previous_volume: f64,
    pub effective_volume: f64,
    pub is_muted: bool,
    pub progress: f64,
    pub duration: f64,
    pub error: Option<String>,
    pub has_error: bool,
    pub is_shuffled: bool,
    pub is_repeating: bool,
    pub showing_ad: bool,
    pub current_ad_id: Option<AdId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 1.0);
        assert!(!config.shuffle);
        assert!(!config.repeat);
        assert_eq!(config.ad_probability, 0.30);
        assert_eq!(config.ad_duration(), Duration::from_secs(5));
        assert_eq!(config.fallback_mime, "audio/mpeg");
        assert!(config.autoplay);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = PlaybackConfig::from_json(r#"{"repeat": true, "ad_probability": 0.5}"#).unwrap();
        assert!(config.repeat);
        assert_eq!(config.ad_probability, 0.5);
        assert_eq!(config.ad_duration_ms, 5000);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            PlaybackConfig::from_json(r#"{"ad_probability": 1.5}"#),
            Err(PlaybackError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json(r#"{"fallback_mime": "  "}"#),
            Err(PlaybackError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json("{"),
            Err(PlaybackError::Core(_))
        ));
    }
}
