//! Provider lifecycle integration tests.
//!
//! These tests drive the provider through a full session against a mock
//! catalogue: login -> resolve -> list -> score -> download -> logout

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use subscout_core::{
    testing::{fixtures, MockTransport},
    transport::{HttpResponse, Method},
    Language, MatchTag, ProviderError, ReleaseAttributes, SubsCenterProvider, SubtitleQuery,
    Video,
};

/// Test helper wiring a provider to a routed mock catalogue.
struct TestHarness {
    transport: Arc<MockTransport>,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            transport: Arc::new(MockTransport::new()),
        }
    }

    /// Serve the login handshake and logout.
    async fn with_login(self) -> Self {
        let login = fixtures::url("subscenter/accounts/login/");
        self.transport
            .on_get(&login, HttpResponse::ok("<form></form>"))
            .await;
        self.transport.set_cookie("csrftoken", "csrf-token");
        self.transport
            .on_post(&login, HttpResponse::redirect("/he/"))
            .await;
        self.transport
            .on_get(&fixtures::url("subscenter/accounts/logout/"), HttpResponse::ok(""))
            .await;
        self
    }

    /// Serve Breaking Bad S01E01 through a search redirect.
    async fn with_breaking_bad(self) -> Self {
        self.transport
            .on_get(
                &fixtures::url("subtitle/search/"),
                HttpResponse::redirect("/he/subtitle/series/breaking-bad/"),
            )
            .await;
        self.transport
            .on_get(
                &fixtures::url("cinemast/data/series/sb/breaking-bad/1/1/"),
                HttpResponse::ok(fixtures::breaking_bad_listing()),
            )
            .await;
        self
    }

    async fn provider(&self, config: &subscout_core::Config) -> Result<SubsCenterProvider, ProviderError> {
        SubsCenterProvider::initialize(config, self.transport.clone()).await
    }
}

fn hebrew() -> BTreeSet<Language> {
    BTreeSet::from([Language::from_alpha2("he").unwrap()])
}

#[tokio::test]
async fn test_breaking_bad_end_to_end() {
    let harness = TestHarness::new().with_breaking_bad().await;
    let provider = assert_ok!(harness.provider(&fixtures::config()).await);

    let video = Video::episode("Breaking Bad", 1, 1);
    let records = assert_ok!(provider.list_subtitles(&video, &hebrew()).await);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, 42);
    assert_eq!(record.id_string(), "42");
    assert_eq!(record.releases, vec!["Group1", "Group2"]);
    assert_eq!(record.download_count, 8);

    let tags = record.matches(&video);
    assert!(tags.contains(&MatchTag::Series));
    assert!(tags.contains(&MatchTag::Season));
    assert!(tags.contains(&MatchTag::Episode));

    assert_ok!(provider.terminate().await);
}

#[tokio::test]
async fn test_authenticated_session_logs_in_and_out() {
    let harness = TestHarness::new().with_login().await.with_breaking_bad().await;
    let config = fixtures::config_with_login("user", "secret");
    let provider = assert_ok!(harness.provider(&config).await);
    assert!(provider.is_logged_in());

    assert_ok!(provider.query(&SubtitleQuery::episode("Breaking Bad", 1, 1)).await);
    assert_ok!(provider.terminate().await);

    let requests = harness.transport.recorded_requests().await;
    let methods: Vec<(Method, &str)> = requests
        .iter()
        .map(|r| (r.method, r.url.trim_start_matches(fixtures::BASE_URL)))
        .collect();
    assert_eq!(
        methods,
        vec![
            (Method::Get, "subscenter/accounts/login/"),
            (Method::Post, "subscenter/accounts/login/"),
            (Method::Get, "subtitle/search/"),
            (Method::Get, "cinemast/data/series/sb/breaking-bad/1/1/"),
            (Method::Get, "subscenter/accounts/logout/"),
        ]
    );
}

#[tokio::test]
async fn test_rejected_login_fails_initialize() {
    let harness = TestHarness::new();
    let login = fixtures::url("subscenter/accounts/login/");
    harness.transport.on_get(&login, HttpResponse::ok("")).await;
    harness.transport.set_cookie("csrftoken", "csrf-token");
    harness
        .transport
        .on_post(&login, HttpResponse::ok("wrong password"))
        .await;

    let config = fixtures::config_with_login("user", "wrong");
    let err = harness
        .provider(&config)
        .await
        .err()
        .expect("login should be rejected");
    assert!(matches!(err, ProviderError::Authentication(ref u) if u == "user"));
}

#[tokio::test]
async fn test_invalid_query_sends_no_request() {
    let harness = TestHarness::new();
    let provider = assert_ok!(harness.provider(&fixtures::config()).await);

    let partial = SubtitleQuery {
        series: Some("Breaking Bad".to_string()),
        episode: Some(1),
        ..Default::default()
    };
    for query in [SubtitleQuery::default(), partial] {
        let err = assert_err!(provider.query(&query).await);
        assert!(matches!(err, ProviderError::InvalidQuery(_)));
    }

    assert_eq!(harness.transport.request_count().await, 0);
}

#[tokio::test]
async fn test_title_resolution_is_cached_across_queries() {
    let harness = TestHarness::new().with_breaking_bad().await;
    let provider = assert_ok!(harness.provider(&fixtures::config()).await);

    for _ in 0..3 {
        assert_ok!(provider.query(&SubtitleQuery::episode("Breaking Bad", 1, 1)).await);
    }

    let searches = harness
        .transport
        .requests_to(&fixtures::url("subtitle/search/"))
        .await;
    let listings = harness
        .transport
        .requests_to(&fixtures::url("cinemast/data/series/sb/breaking-bad/1/1/"))
        .await;
    assert_eq!(searches.len(), 1);
    assert_eq!(listings.len(), 3);
}

#[tokio::test]
async fn test_movie_download_flow() {
    let harness = TestHarness::new();
    harness
        .transport
        .on_get(
            &fixtures::url("subtitle/search/"),
            HttpResponse::ok(fixtures::suggestions_page(&[
                "/he/subtitle/series/inception-the-series/",
                "/he/subtitle/movie/inception/",
            ])),
        )
        .await;
    harness
        .transport
        .on_get(
            &fixtures::url("cinemast/data/movie/sb/inception/"),
            HttpResponse::ok(fixtures::listing_json(&[
                ("he", 10, "Inception.2010.720p.BluRay.x264-SPARKS", 4),
                ("he", 11, "Inception.2010.1080p.BluRay.x264-ESiR", 9),
            ])),
        )
        .await;
    harness
        .transport
        .on_get(
            &fixtures::url("subtitle/download/he/11/"),
            HttpResponse::ok(fixtures::zip_archive(&[
                ("Inception.2010.1080p.srt", "1\r\n00:00:01,000 --> 00:00:02,000\r\nDream\r\n"),
                ("subscenter.txt", "downloaded from subscenter"),
            ])),
        )
        .await;
    let provider = assert_ok!(harness.provider(&fixtures::config()).await);

    let video = Video::movie("Inception").with_attributes(ReleaseAttributes {
        year: Some(2010),
        resolution: Some("1080p".to_string()),
        ..Default::default()
    });
    let records = assert_ok!(provider.list_subtitles(&video, &hebrew()).await);
    assert_eq!(records.len(), 2);

    let best = records
        .iter()
        .max_by_key(|r| (r.matches(&video).len(), r.download_count))
        .unwrap();
    assert_eq!(best.id, 11);
    assert!(best.matches(&video).contains(&MatchTag::Resolution));

    let content = assert_ok!(provider.download_subtitle(best).await);
    assert_eq!(content, b"1\n00:00:01,000 --> 00:00:02,000\nDream\n");

    let download = &harness
        .transport
        .requests_to(&fixtures::url("subtitle/download/he/11/"))
        .await[0];
    assert_eq!(download.query_param("v"), Some("Inception.2010.1080p.BluRay.x264-ESiR"));
    assert_eq!(
        download.header_value("Referer"),
        Some(fixtures::url("subtitle/movie/inception/").as_str())
    );
}

#[tokio::test]
async fn test_ambiguous_archive() {
    let harness = TestHarness::new();
    harness
        .transport
        .on_get(
            &fixtures::url("subtitle/download/he/42/"),
            HttpResponse::ok(fixtures::zip_archive(&[("cd1.srt", "a"), ("cd2.srt", "b")])),
        )
        .await;
    let provider = assert_ok!(harness.provider(&fixtures::config()).await);

    let record = fixtures::subtitle_record(42, &["Group1"]);
    let err = assert_err!(provider.download_subtitle(&record).await);
    assert!(matches!(err, ProviderError::AmbiguousPayload { entries: 2 }));
}
