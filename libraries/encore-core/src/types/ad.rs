//! Advertisement descriptor type

use super::AdId;
use serde::{Deserialize, Serialize};

/// Interstitial advertisement shown between tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdDescriptor {
    /// Unique identifier
    pub id: AdId,

    /// Headline
    pub title: String,

    /// Body copy
    pub description: String,

    /// Image shown while the ad is on screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Click-through target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

impl AdDescriptor {
    /// Create an ad with a generated id
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(AdId::generate(), title, description)
    }

    /// Create an ad with a known id
    pub fn with_id(id: impl Into<AdId>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            image_url: None,
            link_url: None,
        }
    }

    /// Builder-style image setter
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Builder-style link setter
    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link_url = Some(url.into());
        self
    }
}
