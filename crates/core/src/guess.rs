//! Heuristic parser for scene-style release names.
//!
//! Extracts structured hints from strings like:
//! - "Breaking.Bad.S01E01.720p.HDTV.x264-CTU"
//! - "Inception.2010.1080p.BluRay.DTS.x264-ESiR"
//! - "HDTV.XviD-LOL"
//!
//! Nothing here is authoritative: a field is only filled in when a token
//! clearly looks like it.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which kind of media the release is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessKind {
    Episode,
    Movie,
}

/// Everything that could be inferred from a release name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseGuess {
    /// Series name for episodes, movie title for movies.
    pub title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
    pub release_group: Option<String>,
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

/// S01E01, s1e02.
static SXXEXX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^s(\d{1,2})e(\d{1,3})$").unwrap());

/// 1x01, 01x02.
static NXNN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})x(\d{2,3})$").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19\d{2}|20\d{2})$").unwrap());

static RESOLUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(2160p|1080p|1080i|720p|576p|480p|360p)$").unwrap());

/// Release group after the last dash, optionally followed by a bracketed tag.
static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([A-Za-z0-9]+)(?:\s*\[[^\]]*\])?$").unwrap());

static TOKEN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s._\[\]()\-]+").unwrap());

// (canonical value, lowercase aliases). Multi-token aliases are matched on
// adjacent tokens joined together, so "web-dl" and "WEB.DL" both become "webdl".
const SOURCES: &[(&str, &[&str])] = &[
    ("WEB-DL", &["webdl"]),
    ("WEBRip", &["webrip"]),
    ("HDTV", &["hdtv", "pdtv", "hdtvrip"]),
    ("BluRay", &["bluray", "bdrip", "brrip", "bdremux"]),
    ("DVD", &["dvdrip", "dvd", "dvdr"]),
    ("WEB", &["web"]),
];

const VIDEO_CODECS: &[(&str, &[&str])] = &[
    ("h265", &["x265", "h265", "hevc"]),
    ("h264", &["x264", "h264", "avc"]),
    ("XviD", &["xvid"]),
    ("DivX", &["divx"]),
];

const AUDIO_CODECS: &[(&str, &[&str])] = &[
    ("TrueHD", &["truehd"]),
    ("DTS", &["dts"]),
    ("EAC3", &["eac3", "ddp", "ddp51"]),
    ("AC3", &["ac3", "dd51", "dd5"]),
    ("AAC", &["aac"]),
    ("FLAC", &["flac"]),
    ("MP3", &["mp3"]),
];

/// Lowercase tokens of a release name.
fn tokenize(text: &str) -> Vec<String> {
    TOKEN_SPLIT_RE
        .split(text)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Look tokens (and adjacent token pairs) up in an alias table.
fn lookup(tokens: &[String], table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    let pairs: Vec<String> = tokens.windows(2).map(|w| format!("{}{}", w[0], w[1])).collect();

    table.iter().find_map(|(canonical, aliases)| {
        let hit = pairs
            .iter()
            .chain(tokens.iter())
            .any(|t| aliases.contains(&t.as_str()));
        hit.then_some(*canonical)
    })
}

fn is_alias(token: &str) -> bool {
    [SOURCES, VIDEO_CODECS, AUDIO_CODECS]
        .iter()
        .any(|table| table.iter().any(|(_, aliases)| aliases.contains(&token)))
}

fn is_marker(token: &str) -> bool {
    SXXEXX_RE.is_match(token)
        || NXNN_RE.is_match(token)
        || YEAR_RE.is_match(token)
        || RESOLUTION_RE.is_match(token)
        || token.eq_ignore_ascii_case("4k")
        || is_alias(token)
}

/// Canonical source name for a free-form value ("web-dl" -> "WEB-DL").
pub fn canonical_source(value: &str) -> Option<&'static str> {
    lookup(&tokenize(value), SOURCES)
}

/// Canonical video codec name for a free-form value ("x264" -> "h264").
pub fn canonical_video_codec(value: &str) -> Option<&'static str> {
    lookup(&tokenize(value), VIDEO_CODECS)
}

/// Canonical audio codec name for a free-form value ("dd5.1" -> "AC3").
pub fn canonical_audio_codec(value: &str) -> Option<&'static str> {
    lookup(&tokenize(value), AUDIO_CODECS)
}

/// Guess structured attributes from a release name.
pub fn guess_release(release: &str, kind: GuessKind) -> ReleaseGuess {
    let release = release.trim();
    let tokens = tokenize(release);
    let mut guess = ReleaseGuess::default();

    for token in &tokens {
        if kind == GuessKind::Episode && guess.season.is_none() {
            if let Some(caps) = SXXEXX_RE
                .captures(token)
                .or_else(|| NXNN_RE.captures(token))
            {
                guess.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
                guess.episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
                continue;
            }
        }
        if guess.year.is_none() && YEAR_RE.is_match(token) {
            guess.year = token.parse().ok();
            continue;
        }
        if guess.resolution.is_none() {
            if RESOLUTION_RE.is_match(token) {
                guess.resolution = Some(token.to_lowercase());
            } else if token == "4k" {
                guess.resolution = Some("2160p".to_string());
            }
        }
    }

    guess.source = lookup(&tokens, SOURCES).map(str::to_string);
    guess.video_codec = lookup(&tokens, VIDEO_CODECS).map(str::to_string);
    guess.audio_codec = lookup(&tokens, AUDIO_CODECS).map(str::to_string);

    if let Some(group) = GROUP_RE.captures(release).and_then(|c| c.get(1)) {
        let group = group.as_str();
        // "WEB-DL" ends in a dash too
        let split_alias = match tokens.as_slice() {
            [.., before, last] => is_alias(&format!("{}{}", before, last)),
            _ => false,
        };
        if !split_alias && !is_marker(&group.to_lowercase()) {
            guess.release_group = Some(group.to_string());
        }
    }

    // Title is everything before the first recognizable marker.
    let words: Vec<&str> = release
        .split(|c: char| c.is_whitespace() || c == '.' || c == '_')
        .filter(|w| !w.is_empty())
        .take_while(|w| {
            let lower = w.to_lowercase();
            // "x264-GROUP" style words end the title as well
            let head = lower.split('-').next().unwrap_or_default();
            !is_marker(&lower) && !is_marker(head)
        })
        .collect();
    if !words.is_empty() {
        guess.title = Some(words.join(" "));
    }

    trace!(release = release, guess = ?guess, "Guessed release");
    guess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_scene_episode() {
        let guess = guess_release("Breaking.Bad.S01E01.720p.HDTV.x264-CTU", GuessKind::Episode);

        assert_eq!(guess.title.as_deref(), Some("Breaking Bad"));
        assert_eq!(guess.season, Some(1));
        assert_eq!(guess.episode, Some(1));
        assert_eq!(guess.resolution.as_deref(), Some("720p"));
        assert_eq!(guess.source.as_deref(), Some("HDTV"));
        assert_eq!(guess.video_codec.as_deref(), Some("h264"));
        assert_eq!(guess.release_group.as_deref(), Some("CTU"));
    }

    #[test]
    fn test_guess_nxnn_episode() {
        let guess = guess_release("Lost 2x05 WEB-DL", GuessKind::Episode);
        assert_eq!(guess.season, Some(2));
        assert_eq!(guess.episode, Some(5));
        assert_eq!(guess.source.as_deref(), Some("WEB-DL"));
        assert_eq!(guess.title.as_deref(), Some("Lost"));
        assert_eq!(guess.release_group, None);
    }

    #[test]
    fn test_guess_movie() {
        let guess = guess_release("Inception.2010.1080p.BluRay.DTS.x264-ESiR", GuessKind::Movie);

        assert_eq!(guess.title.as_deref(), Some("Inception"));
        assert_eq!(guess.year, Some(2010));
        assert_eq!(guess.resolution.as_deref(), Some("1080p"));
        assert_eq!(guess.source.as_deref(), Some("BluRay"));
        assert_eq!(guess.audio_codec.as_deref(), Some("DTS"));
        assert_eq!(guess.video_codec.as_deref(), Some("h264"));
        assert_eq!(guess.release_group.as_deref(), Some("ESiR"));
        assert_eq!(guess.season, None);
    }

    #[test]
    fn test_guess_movie_ignores_episode_markers() {
        let guess = guess_release("Show.S01E02.HDTV", GuessKind::Movie);
        assert_eq!(guess.season, None);
        assert_eq!(guess.episode, None);
    }

    #[test]
    fn test_guess_bare_quality_release() {
        let guess = guess_release("HDTV.XviD-LOL", GuessKind::Episode);
        assert_eq!(guess.title, None);
        assert_eq!(guess.source.as_deref(), Some("HDTV"));
        assert_eq!(guess.video_codec.as_deref(), Some("XviD"));
        assert_eq!(guess.release_group.as_deref(), Some("LOL"));
    }

    #[test]
    fn test_guess_split_aliases() {
        let guess = guess_release("Show.S01E01.WEB.DL.H.264-GRP", GuessKind::Episode);
        assert_eq!(guess.source.as_deref(), Some("WEB-DL"));
        assert_eq!(guess.video_codec.as_deref(), Some("h264"));
    }

    #[test]
    fn test_guess_plain_group_name() {
        let guess = guess_release("Group1", GuessKind::Episode);
        assert_eq!(guess.title.as_deref(), Some("Group1"));
        assert_eq!(guess.release_group, None);
        assert_eq!(guess.resolution, None);
    }

    #[test]
    fn test_canonical_helpers() {
        assert_eq!(canonical_source("web-dl"), Some("WEB-DL"));
        assert_eq!(canonical_source("Blu-Ray"), Some("BluRay"));
        assert_eq!(canonical_video_codec("x265"), Some("h265"));
        assert_eq!(canonical_audio_codec("DD5.1"), Some("AC3"));
        assert_eq!(canonical_source("nonsense"), None);
    }
}
