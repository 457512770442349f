//! Shared helpers for engine integration tests

#![allow(dead_code)]

use encore_core::{AdDescriptor, StaticAdCatalog, Track};
use encore_playback::{
    MediaBinding, PlayRequestId, PlaybackConfig, PlaybackEngine, RandomSource, StdRandom,
};
use std::collections::VecDeque;
use std::sync::Once;

/// Directive issued to the media binding
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Load(String),
    Play(PlayRequestId),
    Pause,
    Seek(f64),
    Volume(f64),
}

/// Media binding that records every directive
#[derive(Debug, Default)]
pub struct RecordingBinding {
    pub directives: Vec<Directive>,
    pub current_time: f64,
    pub duration: f64,
    /// MIME types `can_play_type` answers "no" for
    pub unsupported: Vec<String>,
}

impl RecordingBinding {
    pub fn last_play(&self) -> Option<PlayRequestId> {
        self.directives.iter().rev().find_map(|d| match d {
            Directive::Play(request) => Some(*request),
            _ => None,
        })
    }

    pub fn last_volume(&self) -> Option<f64> {
        self.directives.iter().rev().find_map(|d| match d {
            Directive::Volume(v) => Some(*v),
            _ => None,
        })
    }

    pub fn last_load(&self) -> Option<&str> {
        self.directives.iter().rev().find_map(|d| match d {
            Directive::Load(url) => Some(url.as_str()),
            _ => None,
        })
    }

    pub fn plays(&self) -> usize {
        self.directives
            .iter()
            .filter(|d| matches!(d, Directive::Play(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.directives.clear();
    }
}

impl MediaBinding for RecordingBinding {
    fn load(&mut self, track: &Track) {
        self.directives.push(Directive::Load(track.url.clone()));
    }

    fn play(&mut self, request: PlayRequestId) {
        self.directives.push(Directive::Play(request));
    }

    fn pause(&mut self) {
        self.directives.push(Directive::Pause);
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.directives.push(Directive::Seek(seconds));
    }

    fn set_volume(&mut self, volume: f64) {
        self.directives.push(Directive::Volume(volume));
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn can_play_type(&self, mime: &str) -> bool {
        !self.unsupported.iter().any(|m| m == mime)
    }
}

/// Random source that replays scripted draws, then falls back to a seeded rng
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    indices: VecDeque<usize>,
    fallback: StdRandom,
}

impl ScriptedRandom {
    pub fn new(draws: &[f64], indices: &[usize]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            indices: indices.iter().copied().collect(),
            fallback: StdRandom::seeded(0xC0FFEE),
        }
    }

    /// Every coin flip lands on "no ad"
    pub fn never_ads() -> Self {
        Self::new(&[0.99; 64], &[])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_f64())
    }

    fn index_below(&mut self, upper: usize) -> usize {
        match self.indices.pop_front() {
            Some(index) => index.min(upper - 1),
            None => self.fallback.index_below(upper),
        }
    }
}

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn track(name: &str) -> Track {
    Track::new(
        format!("Track {}", name),
        format!("https://cdn.example.com/{}.ogg", name),
        "audio/ogg",
    )
}

pub fn tracks(names: &[&str]) -> Vec<Track> {
    names.iter().map(|n| track(n)).collect()
}

pub fn numbered_tracks(n: usize) -> Vec<Track> {
    (0..n).map(|i| track(&i.to_string())).collect()
}

pub fn catalog() -> StaticAdCatalog {
    StaticAdCatalog::new(vec![
        AdDescriptor::with_id("ad-coffee", "Coffee", "Fresh roast"),
        AdDescriptor::with_id("ad-shoes", "Shoes", "Run faster"),
        AdDescriptor::with_id("ad-radio", "Radio", "Tune in"),
    ])
    .unwrap()
}

pub type TestEngine = PlaybackEngine<RecordingBinding>;

pub fn engine_with(config: PlaybackConfig, rng: impl RandomSource + 'static) -> TestEngine {
    init_tracing();
    PlaybackEngine::new(config, RecordingBinding::default(), catalog())
        .unwrap()
        .with_random(rng)
}

pub fn engine(rng: impl RandomSource + 'static) -> TestEngine {
    engine_with(PlaybackConfig::default(), rng)
}

/// Engine already playing the given queue from index 0
pub fn playing(names: &[&str], rng: impl RandomSource + 'static) -> TestEngine {
    let mut engine = engine(rng);
    engine.set_tracks(tracks(names));
    engine
}
