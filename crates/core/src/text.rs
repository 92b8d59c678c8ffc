//! String helpers shared by matching and extraction.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Punctuation that separates words.
static SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"[!"#$%&()*+,./:;<=>?@\[\\\]^_`{|}~\-]"##).unwrap());

/// Apostrophes are removed rather than turned into spaces ("Grey's" == "Greys").
static APOSTROPHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"['’`]").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a title for comparison.
///
/// Case-folds, drops apostrophes, turns every other punctuation mark into a
/// space, then collapses runs of whitespace. Two titles are considered the
/// same when their sanitized forms are equal.
pub fn sanitize(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_apostrophes = APOSTROPHES_RE.replace_all(&lower, "");
    let spaced = SEPARATORS_RE.replace_all(&no_apostrophes, " ");
    WHITESPACE_RE.replace_all(spaced.trim(), " ").into_owned()
}

/// Convert CRLF line endings to LF.
pub fn fix_line_ending(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut iter = content.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_case_and_punctuation() {
        assert_eq!(sanitize("Show A"), "show a");
        assert_eq!(sanitize("  SHOW.a!  "), "show a");
        assert_eq!(sanitize("Marvel's Agents of S.H.I.E.L.D."), "marvels agents of s h i e l d");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize("The   Office\t(US)"), "the office us");
        assert_eq!(sanitize("Mr. Robot"), sanitize("mr robot"));
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("..."), "");
    }

    #[test]
    fn test_fix_line_ending() {
        assert_eq!(fix_line_ending(b"a\r\nb\r\n"), b"a\nb\n".to_vec());
        assert_eq!(fix_line_ending(b"a\nb"), b"a\nb".to_vec());
        // Lone carriage returns are kept
        assert_eq!(fix_line_ending(b"a\rb"), b"a\rb".to_vec());
        assert_eq!(fix_line_ending(b"\r\r\n"), b"\r\n".to_vec());
    }
}
