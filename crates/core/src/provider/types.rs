//! Types for the subtitle provider.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::language::{Language, LanguageError};
use crate::transport::TransportError;
use crate::video::Video;

use super::matcher;

/// Kind of catalogue entry a title resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment the catalogue uses for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute a subtitle record shares with a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTag {
    Series,
    Season,
    Episode,
    Title,
    Year,
    ReleaseGroup,
    Resolution,
    Source,
    VideoCodec,
    AudioCodec,
}

impl MatchTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTag::Series => "series",
            MatchTag::Season => "season",
            MatchTag::Episode => "episode",
            MatchTag::Title => "title",
            MatchTag::Year => "year",
            MatchTag::ReleaseGroup => "release_group",
            MatchTag::Resolution => "resolution",
            MatchTag::Source => "source",
            MatchTag::VideoCodec => "video_codec",
            MatchTag::AudioCodec => "audio_codec",
        }
    }
}

impl fmt::Display for MatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Series, season and episode a record was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesContext {
    pub series: String,
    pub season: u32,
    pub episode: u32,
}

/// One distinct subtitle in the catalogue, merged across every listing
/// fragment sharing its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    pub language: Language,
    pub hearing_impaired: bool,
    /// Human-readable listing page; also sent as Referer on download.
    pub page_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub id: u64,
    /// Download authorisation token.
    pub key: String,
    /// Sum of `downloaded` over all merged fragments.
    pub download_count: u64,
    /// Distinct release names, sorted.
    pub releases: Vec<String>,
}

impl SubtitleRecord {
    /// Identifier as a string, unique per provider.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Attributes this record shares with `video`.
    pub fn matches(&self, video: &Video) -> BTreeSet<MatchTag> {
        matcher::score(self, video)
    }
}

/// A leaf of the catalogue listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSubtitleItem {
    #[serde(deserialize_with = "deserialize_truthy")]
    pub hearing_impaired: bool,
    pub id: u64,
    pub key: String,
    pub downloaded: u64,
    /// Release name.
    pub subtitle_version: String,
}

/// Listing as served by the catalogue:
/// language code → group → quality label → item id → item.
pub type RawListing =
    HashMap<String, HashMap<String, HashMap<String, HashMap<String, RawSubtitleItem>>>>;

/// The catalogue sends `hearing_impaired` as either a bool or a 0/1 integer.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// Per-query values copied onto every flattened record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingContext {
    pub page_link: String,
    pub series: Option<SeriesContext>,
    pub title: Option<String>,
}

/// Identifying parameters of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A validated query: which listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Series(SeriesContext),
    Movie { title: String },
}

impl SubtitleQuery {
    pub fn episode(series: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            series: Some(series.into()),
            season: Some(season),
            episode: Some(episode),
            title: None,
        }
    }

    pub fn movie(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Query derived from a video: the episode triple for episodes, plus the
    /// video title when there is one.
    pub fn from_video(video: &Video) -> Self {
        let title = video.title().map(str::to_string);
        match video {
            Video::Episode(e) => Self {
                series: Some(e.series.clone()),
                season: Some(e.season),
                episode: Some(e.episode),
                title,
            },
            Video::Movie(_) => Self {
                title,
                ..Default::default()
            },
        }
    }

    /// Decide which listing this query targets.
    ///
    /// A full series triple wins, the title then only labels the records. A
    /// title alone selects a movie. A partial triple or no identifier at all
    /// is rejected.
    pub fn target(&self) -> Result<QueryTarget, ProviderError> {
        let series = self.series.as_deref().filter(|s| !s.trim().is_empty());
        let title = self.title.as_deref().filter(|t| !t.trim().is_empty());

        match (series, self.season, self.episode) {
            (Some(series), Some(season), Some(episode)) => Ok(QueryTarget::Series(SeriesContext {
                series: series.to_string(),
                season,
                episode,
            })),
            (None, None, None) => match title {
                Some(title) => Ok(QueryTarget::Movie {
                    title: title.to_string(),
                }),
                None => Err(ProviderError::InvalidQuery(
                    "either series, season and episode or a title is required".to_string(),
                )),
            },
            _ => Err(ProviderError::InvalidQuery(
                "series, season and episode must be given together".to_string(),
            )),
        }
    }
}

/// Errors that can occur while talking to the catalogue.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed for user {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Archive has {entries} candidate subtitle entries, expected one")]
    AmbiguousPayload { entries: usize },

    #[error("Archive has no subtitle entry")]
    EmptyPayload,

    #[error("Failed to read archive: {0}")]
    Archive(String),

    #[error("Failed to parse listing: {0}")]
    Parse(String),

    #[error("Unknown language in listing: {0}")]
    UnknownLanguage(#[from] LanguageError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No {kind} found for title {title:?}")]
    TitleNotFound { title: String, kind: MediaKind },
}
