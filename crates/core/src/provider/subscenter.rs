//! SubsCenter catalogue provider.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::language::Language;
use crate::metrics::{CANDIDATES_FOUND, DOWNLOADS, LISTINGS_FETCHED};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::video::Video;

use super::archive::extract_subtitle;
use super::flatten::flatten_listing;
use super::resolver::TitleResolver;
use super::session::{Credentials, Session};
use super::{
    ListingContext, MediaKind, ProviderError, QueryTarget, RawListing, SubtitleQuery,
    SubtitleRecord,
};

/// Subtitle provider for the SubsCenter catalogue.
///
/// Lifecycle: [`initialize`](Self::initialize) opens the session (logging in
/// if configured), queries run sequentially against it, and
/// [`terminate`](Self::terminate) logs out and releases it.
pub struct SubsCenterProvider {
    session: Session,
    resolver: TitleResolver,
}

impl SubsCenterProvider {
    pub const NAME: &'static str = "subscenter";

    /// Alpha-2 codes of the languages the catalogue serves.
    pub const LANGUAGES: &'static [&'static str] = &["he"];

    /// Languages the catalogue serves.
    pub fn languages() -> BTreeSet<Language> {
        Self::LANGUAGES
            .iter()
            .filter_map(|code| Language::from_alpha2(code).ok())
            .collect()
    }

    pub fn supports_language(language: &Language) -> bool {
        Self::LANGUAGES.contains(&language.alpha2())
    }

    /// Open a provider over the HTTP transport described by `config`.
    pub async fn connect(config: &Config) -> Result<Self, ProviderError> {
        let transport = ReqwestTransport::new(
            Duration::from_secs(config.provider.timeout_secs),
            &config.provider.user_agent,
        )?;
        Self::initialize(config, Arc::new(transport)).await
    }

    /// Open a provider over an existing transport.
    ///
    /// Fails with `Configuration` when only one of username and password is
    /// set, and with `Authentication` when the login is rejected.
    pub async fn initialize(
        config: &Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderError> {
        let credentials = Credentials::from_parts(
            config.provider.username.as_deref(),
            config.provider.password.as_deref(),
        )?;
        let base_url = config.provider.base_url.as_str();

        let session = Session::open(transport, base_url, credentials.as_ref()).await?;
        let resolver = TitleResolver::new(
            base_url,
            Duration::from_secs(config.cache.title_ttl_secs),
        );

        Ok(Self { session, resolver })
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Log out if logged in and release the session.
    pub async fn terminate(self) -> Result<(), ProviderError> {
        self.session.close().await
    }

    /// Fetch and merge every subtitle listed for `query`, keyed by id.
    ///
    /// The query is validated before anything is sent.
    pub async fn query(
        &self,
        query: &SubtitleQuery,
    ) -> Result<BTreeMap<u64, SubtitleRecord>, ProviderError> {
        let target = query.target()?;
        let transport = self.session.transport();
        let base_url = self.session.base_url();

        let (kind, name) = match &target {
            QueryTarget::Series(context) => (MediaKind::Series, context.series.clone()),
            QueryTarget::Movie { title } => (MediaKind::Movie, title.clone()),
        };
        let slug = self
            .resolver
            .resolve(transport, &name, kind)
            .await?
            .ok_or_else(|| ProviderError::TitleNotFound { title: name, kind })?;

        let (url, context) = match target {
            QueryTarget::Series(series) => (
                format!(
                    "{}cinemast/data/series/sb/{}/{}/{}/",
                    base_url, slug, series.season, series.episode
                ),
                ListingContext {
                    page_link: format!(
                        "{}subtitle/series/{}/{}/{}/",
                        base_url, slug, series.season, series.episode
                    ),
                    series: Some(series),
                    title: query.title.clone(),
                },
            ),
            QueryTarget::Movie { title } => (
                format!("{}cinemast/data/movie/sb/{}/", base_url, slug),
                ListingContext {
                    page_link: format!("{}subtitle/movie/{}/", base_url, slug),
                    series: None,
                    title: Some(title),
                },
            ),
        };

        debug!(url = %url, "Getting the list of subtitles");
        let response = transport
            .send(HttpRequest::get(&url))
            .await?
            .error_for_status(&url)?;
        LISTINGS_FETCHED.with_label_values(&[kind.as_str()]).inc();

        let listing: RawListing = serde_json::from_slice(&response.body)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let records = flatten_listing(listing, &context)?;

        CANDIDATES_FOUND
            .with_label_values(&[])
            .observe(records.len() as f64);
        info!(slug = %slug, count = records.len(), "Found subtitles");

        Ok(records)
    }

    /// Subtitles for `video` in any of `languages`.
    ///
    /// Filtering happens after merging, so totals include every language.
    pub async fn list_subtitles(
        &self,
        video: &Video,
        languages: &BTreeSet<Language>,
    ) -> Result<Vec<SubtitleRecord>, ProviderError> {
        let records = self.query(&SubtitleQuery::from_video(video)).await?;
        Ok(records
            .into_values()
            .filter(|r| languages.contains(&r.language))
            .collect())
    }

    /// Download and unpack the content of `record`.
    pub async fn download_subtitle(&self, record: &SubtitleRecord) -> Result<Vec<u8>, ProviderError> {
        let result = self.fetch_subtitle(record).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ProviderError::AmbiguousPayload { .. }) => "ambiguous",
            Err(_) => "failed",
        };
        DOWNLOADS.with_label_values(&[outcome]).inc();
        if let Err(e) = &result {
            warn!(id = record.id, error = %e, "Download failed");
        }

        result
    }

    async fn fetch_subtitle(&self, record: &SubtitleRecord) -> Result<Vec<u8>, ProviderError> {
        let url = format!(
            "{}subtitle/download/{}/{}/",
            self.session.base_url(),
            record.language.alpha2(),
            record.id
        );
        let release = record.releases.first().map(String::as_str).unwrap_or_default();
        let request = HttpRequest::get(&url)
            .query("v", release)
            .query("key", record.key.as_str())
            .header("Referer", record.page_link.as_str());

        debug!(id = record.id, release = release, "Downloading subtitle");
        let response = self
            .session
            .transport()
            .send(request)
            .await?
            .error_for_status(&url)?;

        let content = extract_subtitle(&response.body)?;
        info!(id = record.id, bytes = content.len(), "Downloaded subtitle");
        Ok(content)
    }
}
