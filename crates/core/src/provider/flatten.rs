//! Flattening of nested catalogue listings into subtitle records.

use std::collections::BTreeMap;

use tracing::debug;

use crate::language::Language;

use super::{ListingContext, ProviderError, RawListing, SubtitleRecord};

/// Flatten a listing into one record per subtitle id.
///
/// Every fragment sharing an id is merged into a single record: its release
/// is inserted at its sorted position (skipped if already present) and its
/// `downloaded` count is added to the record total. The result does not
/// depend on the order the listing is walked in.
///
/// Fails on the first unknown language code.
pub fn flatten_listing(
    listing: RawListing,
    context: &ListingContext,
) -> Result<BTreeMap<u64, SubtitleRecord>, ProviderError> {
    let mut records: BTreeMap<u64, SubtitleRecord> = BTreeMap::new();

    for (language_code, groups) in listing {
        let language = Language::from_alpha2(&language_code)?;

        for qualities in groups.into_values() {
            for (quality, items) in qualities {
                for item in items.into_values() {
                    if let Some(existing) = records.get_mut(&item.id) {
                        debug!(
                            release = %item.subtitle_version,
                            id = item.id,
                            quality = %quality,
                            "Found additional release"
                        );
                        insert_release(&mut existing.releases, item.subtitle_version);
                        existing.download_count =
                            existing.download_count.saturating_add(item.downloaded);
                        continue;
                    }

                    debug!(id = item.id, language = %language, "Found subtitle");
                    records.insert(
                        item.id,
                        SubtitleRecord {
                            language,
                            hearing_impaired: item.hearing_impaired,
                            page_link: context.page_link.clone(),
                            series: context.series.clone(),
                            title: context.title.clone(),
                            id: item.id,
                            key: item.key,
                            download_count: item.downloaded,
                            releases: vec![item.subtitle_version],
                        },
                    );
                }
            }
        }
    }

    Ok(records)
}

/// Insert into a sorted vec, keeping it sorted and free of duplicates.
fn insert_release(releases: &mut Vec<String>, release: String) {
    if let Err(pos) = releases.binary_search(&release) {
        releases.insert(pos, release);
    }
}
