//! Utility functions for text cleanup, timestamps, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Slugification of titles into URL-safe ids
//! - Plain-text excerpts from the small HTML bodies we publish
//! - Markdown fence stripping for model responses
//! - String truncation for logging
//! - File system validation for the output directory

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use unicode_normalization::UnicodeNormalization;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.+?>").unwrap());
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

/// Default excerpt length, in characters.
pub const EXCERPT_LIMIT: usize = 160;

/// Convert a title to a URL-friendly slug.
///
/// Diacritics are folded to their base Latin letter (anything that has no
/// ASCII decomposition is dropped), the text is lowercased, every character
/// that is not a word character, whitespace or hyphen is removed, and runs of
/// whitespace/underscore/hyphen collapse into a single hyphen.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("A importância de beber água"), "a-importancia-de-beber-agua");
/// assert_eq!(slugify(""), "");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    SEPARATOR_RUN
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive a plain-text excerpt from an HTML body.
///
/// Tags are removed with a non-greedy `<...>` match, the remaining text is
/// cut to `limit` characters and trailing whitespace is trimmed. No ellipsis
/// is appended and the cut may land mid-word.
pub fn excerpt_from_html(html: &str, limit: usize) -> String {
    let text = HTML_TAG.replace_all(html, "");
    let truncated: String = text.chars().take(limit).collect();
    truncated.trim_end().to_string()
}

/// Remove markdown code-fence markers that models like to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Format a run timestamp as ISO-8601 UTC with a `Z` suffix and second precision.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters and a count of the omitted
/// bytes is appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Sync probe keeps the error surface simple
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(
            slugify("A importância de beber água todos os dias"),
            "a-importancia-de-beber-agua-todos-os-dias"
        );
        assert_eq!(slugify("Alimentação equilibrada"), "alimentacao-equilibrada");
        assert_eq!(slugify("¿Por qué dormir bien?"), "por-que-dormir-bien");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("snake_case -- and  dashes"), "snake-case-and-dashes");
        assert_eq!(slugify("  --Trim me--  "), "trim-me");
        assert_eq!(slugify("Special@#$Characters"), "specialcharacters");
    }

    #[test]
    fn test_slugify_empty_and_symbols_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_output_alphabet_and_idempotence() {
        let samples = [
            "Por que dormir bem melhora sua saúde",
            "  Água, sono & comida: 3 hábitos!  ",
            "Ünïcödé___über--alles",
            "-leading and trailing-",
            "tabs\tand\nnewlines",
        ];
        for s in samples {
            let slug = slugify(s);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'),
                "unexpected character in {slug:?}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert_eq!(slugify(&slug), slug);
        }
    }

    #[test]
    fn test_excerpt_strips_tags() {
        let html = "<p>Manter o corpo hidratado é essencial.</p><p>Beba água.</p>";
        assert_eq!(
            excerpt_from_html(html, EXCERPT_LIMIT),
            "Manter o corpo hidratado é essencial.Beba água."
        );
    }

    #[test]
    fn test_excerpt_respects_limit_in_chars() {
        let html = format!("<p>{}</p>", "ç".repeat(300));
        let excerpt = excerpt_from_html(&html, 160);
        assert_eq!(excerpt.chars().count(), 160);
        assert!(!excerpt.contains('<') && !excerpt.contains('>'));
    }

    #[test]
    fn test_excerpt_trims_trailing_whitespace_after_cut() {
        assert_eq!(excerpt_from_html("<b>abc   def</b>", 5), "abc");
        assert_eq!(excerpt_from_html("", 160), "");
    }

    #[test]
    fn test_excerpt_tags_with_attributes() {
        let html = r#"<p class="lead">Sleep <a href="/x">well</a></p>"#;
        assert_eq!(excerpt_from_html(html, 160), "Sleep well");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  []  "), "[]");
    }

    #[test]
    fn test_utc_timestamp_format() {
        let t = Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap();
        assert_eq!(utc_timestamp(t), "2025-05-06T14:30:00Z");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("ééé", 1);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
