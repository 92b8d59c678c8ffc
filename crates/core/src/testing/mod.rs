//! Testing utilities and mock implementations.
//!
//! `MockTransport` stands in for the catalogue so the provider can be
//! exercised end to end without a network; `fixtures` builds the payloads
//! the catalogue would serve.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use subscout_core::testing::{fixtures, MockTransport};
//! use subscout_core::transport::HttpResponse;
//!
//! let transport = Arc::new(MockTransport::new());
//! transport
//!     .on_get(&fixtures::url("subtitle/search/"), HttpResponse::redirect("/he/subtitle/series/lost/"))
//!     .await;
//!
//! let provider = SubsCenterProvider::initialize(&fixtures::config(), transport.clone()).await?;
//! ```

mod mock_transport;

pub use mock_transport::MockTransport;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::{Cursor, Write};

    use serde_json::json;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use crate::config::Config;
    use crate::language::Language;
    use crate::provider::{SeriesContext, SubtitleRecord};

    /// Base URL used by every fixture.
    pub const BASE_URL: &str = "http://example.com/he/";

    /// Absolute URL of `path` under the fixture base URL.
    pub fn url(path: &str) -> String {
        format!("{}{}", BASE_URL, path)
    }

    /// Config pointing at the fixture base URL, anonymous.
    pub fn config() -> Config {
        let mut config = Config::default();
        config.provider.base_url = BASE_URL.to_string();
        config
    }

    /// Config pointing at the fixture base URL, with credentials.
    pub fn config_with_login(username: &str, password: &str) -> Config {
        let mut config = config();
        config.provider.username = Some(username.to_string());
        config.provider.password = Some(password.to_string());
        config
    }

    /// Listing JSON from (language, id, release, downloaded) fragments.
    ///
    /// Every fragment gets its own quality bucket so ids can repeat.
    pub fn listing_json(fragments: &[(&str, u64, &str, u64)]) -> String {
        let mut listing = json!({});
        for (n, &(language, id, release, downloaded)) in fragments.iter().enumerate() {
            listing[language]["group"][format!("quality{}", n)][n.to_string()] = json!({
                "hearing_impaired": 0,
                "id": id,
                "key": format!("key{}", id),
                "downloaded": downloaded,
                "subtitle_version": release,
            });
        }
        listing.to_string()
    }

    /// Breaking Bad S01E01: two fragments of subtitle 42.
    pub fn breaking_bad_listing() -> String {
        listing_json(&[("he", 42, "Group2", 3), ("he", 42, "Group1", 5)])
    }

    /// Search results page listing the given suggestion links.
    pub fn suggestions_page(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|href| {
                format!(
                    r#"<div class="generalWindowTop"><a href="{}">suggestion</a></div>"#,
                    href
                )
            })
            .collect();
        format!(
            r#"<html><body><div id="processes">{}</div><a href="/he/subtitle/series/decoy/">not a suggestion</a></body></html>"#,
            anchors
        )
    }

    /// A Hebrew Breaking Bad S01E01 record.
    pub fn subtitle_record(id: u64, releases: &[&str]) -> SubtitleRecord {
        SubtitleRecord {
            language: Language::from_alpha2("he").expect("he is a known language"),
            hearing_impaired: false,
            page_link: url("subtitle/series/breaking-bad/1/1/"),
            series: Some(SeriesContext {
                series: "Breaking Bad".to_string(),
                season: 1,
                episode: 1,
            }),
            title: None,
            id,
            key: format!("key{}", id),
            download_count: 0,
            releases: releases.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Zip archive holding the given (name, content) entries.
    pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            writer
                .start_file(*name, options)
                .expect("in-memory zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("in-memory zip write");
        }
        writer.finish().expect("in-memory zip finish").into_inner()
    }
}
