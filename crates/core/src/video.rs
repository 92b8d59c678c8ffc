//! Video descriptors supplied by callers.

use serde::{Deserialize, Serialize};

/// Attributes inferred from release names that a video may also carry.
///
/// Every field is optional; an attribute the caller doesn't know can never
/// produce a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    /// e.g. "720p", "1080p".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// e.g. "HDTV", "WEB-DL", "BluRay".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// e.g. "h264", "h265".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// e.g. "AAC", "DTS".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

/// A TV episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub series: String,
    pub season: u32,
    pub episode: u32,
    /// Episode title, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, flatten)]
    pub attributes: ReleaseAttributes,
}

/// A movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default, flatten)]
    pub attributes: ReleaseAttributes,
}

/// The video subtitles are being looked up for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Video {
    Episode(Episode),
    Movie(Movie),
}

impl Video {
    /// Build an episode without release attributes.
    pub fn episode(series: impl Into<String>, season: u32, episode: u32) -> Self {
        Video::Episode(Episode {
            series: series.into(),
            season,
            episode,
            title: None,
            attributes: ReleaseAttributes::default(),
        })
    }

    /// Build a movie without release attributes.
    pub fn movie(title: impl Into<String>) -> Self {
        Video::Movie(Movie {
            title: title.into(),
            attributes: ReleaseAttributes::default(),
        })
    }

    /// Episode title for episodes, movie title for movies.
    pub fn title(&self) -> Option<&str> {
        match self {
            Video::Episode(e) => e.title.as_deref(),
            Video::Movie(m) => Some(&m.title),
        }
    }

    pub fn attributes(&self) -> &ReleaseAttributes {
        match self {
            Video::Episode(e) => &e.attributes,
            Video::Movie(m) => &m.attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut ReleaseAttributes {
        match self {
            Video::Episode(e) => &mut e.attributes,
            Video::Movie(m) => &mut m.attributes,
        }
    }

    /// Builder-style setter for release attributes.
    pub fn with_attributes(mut self, attributes: ReleaseAttributes) -> Self {
        *self.attributes_mut() = attributes;
        self
    }
}
