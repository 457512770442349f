//! WASM bindings for encore-playback
//!
//! This module drives an `HtmlAudioElement` from the playback engine and
//! exposes the engine's command surface to JavaScript.

pub mod binding;
pub mod manager;

pub use binding::{EventInbox, HtmlMediaBinding};
pub use manager::WasmPlaybackEngine;
