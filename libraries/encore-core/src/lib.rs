//! Encore Core
//!
//! Platform-agnostic domain types and collaborator traits for the Encore player.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `AdDescriptor`, `AdId`
//! - **Collaborator Traits**: `TrackSource`, `AdCatalog`
//! - **In-memory collaborators**: `StaticTrackSource`, `StaticAdCatalog`
//! - **Error Handling**: `EncoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use encore_core::{AdCatalog, AdDescriptor, StaticAdCatalog, StaticTrackSource, Track, TrackSource};
//!
//! let source = StaticTrackSource::new(vec![
//!     Track::new("Intro", "https://cdn.example.com/intro.ogg", "audio/ogg"),
//!     Track::new("Theme", "https://cdn.example.com/theme.mp3", "audio/mpeg"),
//! ]);
//! assert_eq!(source.tracks().len(), 2);
//!
//! let catalog = StaticAdCatalog::new(vec![AdDescriptor::new("Sponsor", "Brought to you by...")])
//!     .expect("catalog is non-empty");
//! assert_eq!(catalog.ads().len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{EncoreError, Result};
pub use memory::{StaticAdCatalog, StaticTrackSource};
pub use traits::{AdCatalog, TrackSource};
pub use types::{AdDescriptor, AdId, Track, FALLBACK_MIME};
