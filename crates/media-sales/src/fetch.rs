//! Sales sheet retrieval
//!
//! The Apps Script endpoint answers a plain GET with the sheet rows as a JSON
//! array. One request is made per run; there is no retry.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::config::SourceConfig;

/// Accepted payload shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Rows(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

impl Payload {
    fn into_rows(self) -> Vec<Value> {
        match self {
            Payload::Rows(rows) | Payload::Wrapped { data: rows } => rows,
        }
    }
}

/// Fetch the current record list from the sales endpoint
pub async fn fetch_records(source: &SourceConfig) -> Result<Vec<Value>> {
    let client = reqwest::Client::builder()
        .timeout(source.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let start = std::time::Instant::now();
    debug!("Requesting {}", source.url);

    let response = client
        .get(&source.url)
        .header("Accept", "application/json")
        .send()
        .await
        .with_context(|| format!("Request failed for {}", source.url))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("Sales endpoint returned {}: {}", status, truncate(&text, 200));
    }

    let body = response
        .text()
        .await
        .context("Failed to read sales endpoint response")?;
    let rows = parse_payload(&body)?;

    info!(
        "Fetched {} rows in {:.2}s",
        rows.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(rows)
}

/// Read a previously saved payload from disk
pub async fn load_records_file(path: &Path) -> Result<Vec<Value>> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = parse_payload(&body).with_context(|| format!("Invalid payload in {}", path.display()))?;

    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Decode a payload: a JSON array of rows, or an object with a `data` array
pub fn parse_payload(body: &str) -> Result<Vec<Value>> {
    let payload: Payload = serde_json::from_str(body).with_context(|| {
        format!(
            "Expected a JSON array of rows, got: {}",
            truncate(body.trim(), 120)
        )
    })?;
    Ok(payload.into_rows())
}

/// Truncate string for display
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let rows = parse_payload(r#"[{"紹介者": "甲"}, {"紹介者": ""}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["紹介者"], "甲");
    }

    #[test]
    fn test_parse_wrapped_array() {
        let rows = parse_payload(r#"{"data": [{"合計売上": 1}]}"#).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_payload("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_payload(r#"{"error": "quota"}"#).is_err());
        assert!(parse_payload("<html>Sign in</html>").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("契約月契約月", 3), "契約月...");
    }

    #[tokio::test]
    async fn test_load_records_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"[{"契約月": "2025/06/01"}]"#).unwrap();

        let rows = load_records_file(&path).await.unwrap();
        assert_eq!(rows.len(), 1);

        assert!(load_records_file(&dir.path().join("missing.json")).await.is_err());
    }
}
