//! Domain types for Encore

mod ad;
mod ids;
mod track;

pub use ad::AdDescriptor;
pub use ids::AdId;
pub use track::{Track, FALLBACK_MIME};
