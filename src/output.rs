//! JSON output for command results.
//!
//! Results go to stdout unless an output file is given, in which case the
//! parent directory is created (and checked for writability) first. Logs
//! never go to stdout, so the printed JSON can be piped straight into other
//! tools.

use crate::utils::ensure_writable_parent;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use tracing::{error, info, instrument};

/// Serialize `value` as pretty JSON to `path`, or to stdout when `path` is
/// `None`.
#[instrument(level = "info", skip_all, fields(path = path.unwrap_or("-")))]
pub async fn write_json<T: Serialize>(value: &T, path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let Some(path) = path else {
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    };

    let path = Path::new(path);
    if let Err(e) = ensure_writable_parent(path).await {
        error!(error = %e, "Output directory is not writable");
        return Err(e);
    }
    fs::write(path, json.as_bytes()).await?;
    info!(bytes = json.len(), "Wrote JSON output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Acquisition, ArticleStub, Category};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_json_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("listing.json");
        let acquisition = Acquisition::live(vec![ArticleStub {
            title: "[연합뉴스] 국회, 내년도 예산안 심사 본격 착수".to_string(),
            url: "https://n.news.naver.com/mnews/article/001/1".to_string(),
            body_preview: String::new(),
            category: Category::Politics,
            publish_date: "2025-05-06".to_string(),
        }]);

        write_json(&acquisition, path.to_str()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let back: Acquisition = serde_json::from_str(&written).unwrap();
        assert_eq!(back, acquisition);
        assert!(written.contains("\"status\": \"live\""));
        assert!(written.contains("\"category\": \"POLITICS\""));
    }
}
