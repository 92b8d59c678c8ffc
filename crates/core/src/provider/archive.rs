//! Extraction of downloaded subtitle archives.

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use crate::text::fix_line_ending;

use super::ProviderError;

/// Unpack the single subtitle file from a zip payload.
///
/// `.txt` entries (release notes) and directories are ignored. Exactly one
/// entry must remain; its content is returned with LF line endings.
pub fn extract_subtitle(payload: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut archive =
        ZipArchive::new(Cursor::new(payload)).map_err(|e| ProviderError::Archive(e.to_string()))?;

    let candidates: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with(".txt") && !name.ends_with('/'))
        .map(str::to_string)
        .collect();
    debug!(entries = archive.len(), candidates = ?candidates, "Opened archive");

    match candidates.as_slice() {
        [] => Err(ProviderError::EmptyPayload),
        [name] => {
            let mut entry = archive
                .by_name(name)
                .map_err(|e| ProviderError::Archive(e.to_string()))?;
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| ProviderError::Archive(e.to_string()))?;
            Ok(fix_line_ending(&content))
        }
        _ => Err(ProviderError::AmbiguousPayload {
            entries: candidates.len(),
        }),
    }
}
