//! Resolution of free-text titles to catalogue slugs.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::metrics::TITLE_RESOLUTIONS;
use crate::transport::{HttpRequest, Transport};

use super::{MediaKind, ProviderError};

/// Resolves titles to slugs through the catalogue search, caching results
/// (including misses) per (title, kind).
pub struct TitleResolver {
    base_url: String,
    cache: TtlCache<(String, MediaKind), Option<String>>,
}

impl TitleResolver {
    pub fn new(base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            cache: TtlCache::new(ttl),
        }
    }

    /// Resolve `title` to the slug of a catalogue entry of the given kind.
    ///
    /// Returns `Ok(None)` when the catalogue knows no such entry.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        title: &str,
        kind: MediaKind,
    ) -> Result<Option<String>, ProviderError> {
        self.cache
            .get_or_try_insert_with((title.to_string(), kind), || {
                self.search(transport, title, kind)
            })
            .await
    }

    async fn search(
        &self,
        transport: &dyn Transport,
        title: &str,
        kind: MediaKind,
    ) -> Result<Option<String>, ProviderError> {
        info!(title = title, kind = %kind, "Searching title name");

        let url = format!("{}subtitle/search/", self.base_url);
        let request = HttpRequest::get(&url).query("q", title).without_redirects();
        let response = transport.send(request).await?.error_for_status(&url)?;

        let (slug, outcome) = if response.is_redirect() {
            let location = response.location.as_deref().unwrap_or_default();
            debug!(location = location, "Search redirected");
            (slug_for_kind(location, kind), "redirect")
        } else {
            (first_suggestion(&response.text(), kind), "suggestion")
        };

        let outcome = if slug.is_some() { outcome } else { "not_found" };
        TITLE_RESOLUTIONS
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
        debug!(title = title, slug = ?slug, outcome = outcome, "Resolved title");

        Ok(slug)
    }
}

/// Slug of a catalogue path such as `/he/subtitle/series/breaking-bad/`, if
/// its kind segment matches.
///
/// The kind and slug are the third- and second-to-last segments.
fn slug_for_kind(path: &str, kind: MediaKind) -> Option<String> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 3 {
        return None;
    }
    let (found_kind, slug) = (parts[parts.len() - 3], parts[parts.len() - 2]);
    (found_kind == kind.as_str() && !slug.is_empty()).then(|| slug.to_string())
}

/// First suggestion on a search results page whose kind matches.
fn first_suggestion(html: &str, kind: MediaKind) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("#processes div.generalWindowTop a").ok()?;

    let hrefs: Vec<&str> = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    debug!(count = hrefs.len(), "Found suggestions");

    hrefs.into_iter().find_map(|href| slug_for_kind(href, kind))
}
