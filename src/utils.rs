//! Small helpers shared across modules: log truncation, clock access,
//! whitespace normalisation and output directory checks.

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary, since titles are mostly Hangul) with the remaining byte count
/// appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize the first character of a string.
///
/// ```ignore
/// assert_eq!(upcase("hello"), "Hello");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Ensure the parent directory of `path` exists and is writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_parent(path: &Path) -> Result<(), Box<dyn Error>> {
    let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(dir).await?;
    // Try a small sync write using std fs (simpler error surface)
    let check_path = dir.join("..__write_check__");
    stdfs::File::create(&check_path)?;
    let _ = stdfs::remove_file(&check_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        // Each Hangul syllable is three bytes.
        let s = "정부예산안";
        let result = truncate_for_log(s, 4);
        assert!(result.starts_with("정"));
        assert!(result.contains("(+12 bytes)"));
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(squash_whitespace("   "), "");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("hello"), "Hello");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("a"), "A");
    }

    #[tokio::test]
    async fn test_ensure_writable_parent_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.json");
        ensure_writable_parent(&target).await.unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
