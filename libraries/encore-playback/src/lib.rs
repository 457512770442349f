//! Encore - Playback Engine
//!
//! Platform-agnostic playback control for the Encore player.
//!
//! This crate provides:
//! - Play order over the queue (sequential or Fisher-Yates shuffled, wrapping)
//! - Volume control (0.0-1.0, mute with restore)
//! - Media binding adapter (play/pause/seek/volume directives, stale play
//!   settlement suppression, format fallback)
//! - Track-end policy (repeat, interstitial ads with auto-close, advance)
//! - Browser bindings behind the `wasm` feature
//!
//! # Architecture
//!
//! `encore-playback` never touches a real decoder. The host implements
//! [`MediaBinding`] for its decoding surface and feeds lifecycle callbacks
//! back as [`MediaEvent`]s. UI intent arrives as method calls or
//! [`PlaybackCommand`]s; UI notifications leave as [`PlaybackEvent`]s.
//!
//! # Example
//!
//! ```rust
//! use encore_core::{AdDescriptor, StaticAdCatalog, Track};
//! use encore_playback::{MediaBinding, MediaEvent, PlayRequestId, PlaybackConfig, PlaybackEngine};
//!
//! #[derive(Default)]
//! struct Silent;
//!
//! impl MediaBinding for Silent {
//!     fn load(&mut self, _track: &Track) {}
//!     fn play(&mut self, _request: PlayRequestId) {}
//!     fn pause(&mut self) {}
//!     fn set_current_time(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn current_time(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> f64 { 180.0 }
//! }
//!
//! let catalog = StaticAdCatalog::new(vec![AdDescriptor::new("Sponsor", "...")]).unwrap();
//! let mut engine = PlaybackEngine::new(PlaybackConfig::default(), Silent, catalog).unwrap();
//!
//! engine.set_tracks(vec![
//!     Track::new("A", "a.mp3", "audio/mpeg"),
//!     Track::new("B", "b.mp3", "audio/mpeg"),
//! ]);
//! assert_eq!(engine.current_index(), Some(0));
//! assert!(engine.is_playing());
//!
//! engine.handle_media_event(MediaEvent::LoadedMetadata);
//! assert_eq!(engine.duration(), 180.0);
//!
//! engine.play_next_track();
//! assert_eq!(engine.current_index(), Some(1));
//! ```

mod error;
mod events;
mod manager;
mod media;
mod queue;
mod random;
mod shuffle;
mod transition;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::{MediaEvent, PlaybackCommand, PlaybackEvent};
pub use manager::PlaybackEngine;
pub use media::{MediaAdapter, MediaBinding, MediaErrorKind, Settlement};
pub use queue::PlayOrder;
pub use random::{RandomSource, StdRandom};
pub use shuffle::{identity, is_permutation, permutation};
pub use transition::{AdTimer, ExpiredTimer, TrackEndAction, TransitionController};
pub use types::{PlayRequestId, PlaybackConfig, PlaybackPhase, SessionSnapshot, TimerToken};
pub use volume::Volume;
