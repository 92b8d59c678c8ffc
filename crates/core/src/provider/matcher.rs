//! Match scoring of subtitle records against a video.
//!
//! Tags are additive: direct comparisons of the listing context plus
//! everything the release names reveal through the release guesser.

use std::collections::BTreeSet;

use crate::guess::{
    canonical_audio_codec, canonical_source, canonical_video_codec, guess_release, GuessKind,
    ReleaseGuess,
};
use crate::text::sanitize;
use crate::video::Video;

use super::{MatchTag, SubtitleRecord};

/// Compute the attributes `record` shares with `video`.
pub fn score(record: &SubtitleRecord, video: &Video) -> BTreeSet<MatchTag> {
    let mut matches = BTreeSet::new();

    let kind = match video {
        Video::Episode(episode) => {
            if let Some(context) = &record.series {
                if same_title(&context.series, &episode.series) {
                    matches.insert(MatchTag::Series);
                }
                if context.season == episode.season {
                    matches.insert(MatchTag::Season);
                }
                if context.episode == episode.episode {
                    matches.insert(MatchTag::Episode);
                }
            }
            GuessKind::Episode
        }
        Video::Movie(_) => GuessKind::Movie,
    };

    for release in &record.releases {
        matches.extend(guess_matches(video, &guess_release(release, kind)));
    }

    if let (Some(record_title), Some(video_title)) = (&record.title, video.title()) {
        if same_title(record_title, video_title) {
            matches.insert(MatchTag::Title);
        }
    }

    matches
}

/// Attributes a release guess shares with `video`.
pub fn guess_matches(video: &Video, guess: &ReleaseGuess) -> BTreeSet<MatchTag> {
    let mut matches = BTreeSet::new();

    match video {
        Video::Episode(episode) => {
            if guess
                .title
                .as_deref()
                .is_some_and(|t| same_title(t, &episode.series))
            {
                matches.insert(MatchTag::Series);
            }
            if guess.season == Some(episode.season) {
                matches.insert(MatchTag::Season);
            }
            if guess.episode == Some(episode.episode) {
                matches.insert(MatchTag::Episode);
            }
        }
        Video::Movie(movie) => {
            if guess
                .title
                .as_deref()
                .is_some_and(|t| same_title(t, &movie.title))
            {
                matches.insert(MatchTag::Title);
            }
        }
    }

    let attributes = video.attributes();

    if attributes.year.is_some() && guess.year == attributes.year {
        matches.insert(MatchTag::Year);
    }
    if same_value(&attributes.release_group, &guess.release_group, |_| None) {
        matches.insert(MatchTag::ReleaseGroup);
    }
    if same_value(&attributes.resolution, &guess.resolution, |_| None) {
        matches.insert(MatchTag::Resolution);
    }
    if same_value(&attributes.source, &guess.source, canonical_source) {
        matches.insert(MatchTag::Source);
    }
    if same_value(&attributes.video_codec, &guess.video_codec, canonical_video_codec) {
        matches.insert(MatchTag::VideoCodec);
    }
    if same_value(&attributes.audio_codec, &guess.audio_codec, canonical_audio_codec) {
        matches.insert(MatchTag::AudioCodec);
    }

    matches
}

fn same_title(a: &str, b: &str) -> bool {
    let a = sanitize(a);
    !a.is_empty() && a == sanitize(b)
}

/// Compare a caller-supplied attribute with a guessed one. The caller's value
/// is canonicalized first so "x264" matches a guessed "h264".
fn same_value(
    known: &Option<String>,
    guessed: &Option<String>,
    canonical: impl Fn(&str) -> Option<&'static str>,
) -> bool {
    match (known, guessed) {
        (Some(known), Some(guessed)) => {
            let known = canonical(known).unwrap_or(known.as_str());
            known.eq_ignore_ascii_case(guessed)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::provider::SeriesContext;
    use crate::video::ReleaseAttributes;

    fn record(series: Option<(&str, u32, u32)>, title: Option<&str>, releases: &[&str]) -> SubtitleRecord {
        SubtitleRecord {
            language: Language::from_alpha2("he").unwrap(),
            hearing_impaired: false,
            page_link: "http://example.com/".to_string(),
            series: series.map(|(series, season, episode)| SeriesContext {
                series: series.to_string(),
                season,
                episode,
            }),
            title: title.map(str::to_string),
            id: 1,
            key: "k".to_string(),
            download_count: 0,
            releases: releases.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_episode_direct_tags_ignore_case_and_punctuation() {
        let record = record(Some(("Breaking Bad", 1, 1)), None, &["Group1"]);
        let video = Video::episode("breaking.bad", 1, 1);

        let tags = score(&record, &video);
        assert_eq!(
            tags,
            BTreeSet::from([MatchTag::Series, MatchTag::Season, MatchTag::Episode])
        );
    }

    #[test]
    fn test_episode_season_mismatch() {
        let record = record(Some(("Breaking Bad", 2, 1)), None, &[]);
        let tags = score(&record, &Video::episode("Breaking Bad", 1, 1));
        assert!(tags.contains(&MatchTag::Series));
        assert!(!tags.contains(&MatchTag::Season));
        assert!(tags.contains(&MatchTag::Episode));
    }

    #[test]
    fn test_release_names_contribute_tags() {
        let record = record(
            Some(("Breaking Bad", 1, 1)),
            None,
            &["HDTV.XviD-LOL", "Breaking.Bad.S01E01.720p.HDTV.x264-CTU"],
        );
        let video = Video::episode("Breaking Bad", 1, 1).with_attributes(ReleaseAttributes {
            release_group: Some("ctu".to_string()),
            resolution: Some("720p".to_string()),
            source: Some("HDTV".to_string()),
            video_codec: Some("x264".to_string()),
            ..Default::default()
        });

        let tags = score(&record, &video);
        for tag in [
            MatchTag::ReleaseGroup,
            MatchTag::Resolution,
            MatchTag::Source,
            MatchTag::VideoCodec,
        ] {
            assert!(tags.contains(&tag), "missing {}", tag);
        }
        assert!(!tags.contains(&MatchTag::AudioCodec));
    }

    #[test]
    fn test_movie_title_and_year() {
        let record = record(None, Some("Inception"), &["Inception.2010.1080p.BluRay.x264-ESiR"]);
        let video = Video::movie("inception").with_attributes(ReleaseAttributes {
            year: Some(2010),
            ..Default::default()
        });

        let tags = score(&record, &video);
        assert!(tags.contains(&MatchTag::Title));
        assert!(tags.contains(&MatchTag::Year));
        assert!(!tags.contains(&MatchTag::Series));
    }

    #[test]
    fn test_movie_ignores_series_context() {
        let record = record(Some(("Inception", 1, 1)), None, &[]);
        assert!(score(&record, &Video::movie("Inception")).is_empty());
    }

    #[test]
    fn test_unknown_attributes_never_match() {
        let guess = guess_release("Show.S01E01.720p.HDTV.x264-GRP", GuessKind::Episode);
        let tags = guess_matches(&Video::episode("Other", 3, 3), &guess);
        assert!(tags.is_empty());
    }
}
