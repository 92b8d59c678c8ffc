//! Prometheus metrics for the provider.
//!
//! This module provides metrics for:
//! - Title resolution (outcomes, cache effectiveness)
//! - Listings (fetches, candidates per query)
//! - Downloads
//! - Remote requests

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Title resolution
// =============================================================================

/// Title resolutions by kind and outcome.
pub static TITLE_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subscout_title_resolutions_total",
            "Total title to slug resolutions performed against the catalogue",
        ),
        &["kind", "outcome"], // outcome: "redirect", "suggestion", "not_found"
    )
    .unwrap()
});

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_cache_lookups_total", "Total cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Listings
// =============================================================================

/// Listing fetches by kind.
pub static LISTINGS_FETCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_listings_fetched_total", "Total listings fetched"),
        &["kind"],
    )
    .unwrap()
});

/// Merged candidates per query.
pub static CANDIDATES_FOUND: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subscout_candidates_found",
            "Number of merged subtitle records per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Downloads
// =============================================================================

/// Downloads by result.
pub static DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_downloads_total", "Total subtitle downloads"),
        &["result"], // "success", "ambiguous", "failed"
    )
    .unwrap()
});

// =============================================================================
// Remote requests
// =============================================================================

/// Remote request duration.
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subscout_request_duration_seconds",
            "Duration of requests to the catalogue",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "status"], // status: HTTP code or "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TITLE_RESOLUTIONS.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(LISTINGS_FETCHED.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(DOWNLOADS.clone()),
        Box::new(REQUEST_DURATION.clone()),
    ]
}

/// Register all metrics in a fresh registry.
pub fn registry() -> prometheus::Registry {
    let registry = prometheus::Registry::new();
    for metric in all_metrics() {
        // Names are unique within this module, registration can't collide
        let _ = registry.register(metric);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_gathers_all_families() {
        TITLE_RESOLUTIONS
            .with_label_values(&["series", "redirect"])
            .inc();
        CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
        LISTINGS_FETCHED.with_label_values(&["movie"]).inc();
        CANDIDATES_FOUND.with_label_values(&[]).observe(3.0);
        DOWNLOADS.with_label_values(&["success"]).inc();
        REQUEST_DURATION
            .with_label_values(&["GET", "200"])
            .observe(0.1);

        let families = registry().gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"subscout_title_resolutions_total"));
        assert!(names.contains(&"subscout_downloads_total"));
        assert_eq!(families.len(), all_metrics().len());
    }
}
