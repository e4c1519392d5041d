//! Configuration for the media sales viewer

use anyhow::{Context, Result};
use chrono::FixedOffset;
use sales_core::{parse_utc_offset, FieldNames, MonthKey, RecordSchema, ViewOptions};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub source: SourceSection,
    /// Column headers of the sales sheet
    pub fields: FieldNames,
    pub view: ViewSection,
}

/// Where records come from
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Endpoint returning the sheet rows as JSON
    pub url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Offset ISO timestamps are reported in, e.g. "+09:00"
    pub utc_offset: Option<String>,
}

/// Deployment-wide view behavior
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewSection {
    /// Ignore records contracted before this month (YYYY-MM)
    pub month_floor: Option<MonthKey>,
    /// Offer the unrecorded referrer as a filter option
    pub include_unrecorded_referrer: bool,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            month_floor: None,
            include_unrecorded_referrer: true,
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse {}. Check for:\n\
                 - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
                 - view.month_floor not in YYYY-MM form\n\
                 - Incorrect data types (strings vs numbers)\n\n\
                 See config.toml.example for the expected format.",
                path.display()
            )
        })
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Source settings with defaults applied
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Main configuration struct with parsed values
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub schema: RecordSchema,
    pub view: ViewOptions,
}

impl Config {
    /// Create config from file config and an optional endpoint override
    pub fn from_file(file_config: &FileConfig, url: Option<String>) -> Result<Self> {
        let utc_offset = file_config
            .source
            .utc_offset
            .as_deref()
            .map(parse_offset)
            .transpose()?;

        Ok(Self {
            source: SourceConfig {
                // CLI flag wins over config file
                url: url
                    .or_else(|| file_config.source.url.clone())
                    .unwrap_or_else(|| constants::DEFAULT_SOURCE_URL.to_string()),
                timeout: Duration::from_secs(
                    file_config
                        .source
                        .timeout_secs
                        .unwrap_or(constants::DEFAULT_TIMEOUT_SECS),
                ),
            },
            schema: RecordSchema {
                fields: file_config.fields.clone(),
                utc_offset,
            },
            view: ViewOptions {
                month_floor: file_config.view.month_floor.clone(),
                include_unrecorded_referrer: file_config.view.include_unrecorded_referrer,
            },
        })
    }
}

fn parse_offset(text: &str) -> Result<FixedOffset> {
    parse_utc_offset(text).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid source.utc_offset '{}' - expected e.g. \"+09:00\" or \"Z\"",
            text
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(toml_text: &str) -> FileConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_file(&parse(""), None).unwrap();
        assert_eq!(config.source.url, constants::DEFAULT_SOURCE_URL);
        assert_eq!(config.source.timeout, Duration::from_secs(30));
        assert_eq!(config.schema.fields, FieldNames::default());
        assert!(config.schema.utc_offset.is_none());
        assert!(config.view.month_floor.is_none());
        assert!(config.view.include_unrecorded_referrer);
    }

    #[test]
    fn test_full_file() {
        let file = parse(
            r#"
            [source]
            url = "https://example.com/sales"
            timeout_secs = 5
            utc_offset = "+09:00"

            [fields]
            referrer = "媒体"

            [view]
            month_floor = "2025-06"
            include_unrecorded_referrer = false
            "#,
        );
        let config = Config::from_file(&file, None).unwrap();
        assert_eq!(config.source.url, "https://example.com/sales");
        assert_eq!(config.source.timeout, Duration::from_secs(5));
        assert_eq!(
            config.schema.utc_offset.map(|o| o.local_minus_utc()),
            Some(9 * 3600)
        );
        assert_eq!(config.schema.fields.referrer, "媒体");
        // Unset fields keep the sheet defaults
        assert_eq!(config.schema.fields.store_name, "店舗名");
        assert_eq!(
            config.view.month_floor.as_ref().map(|m| m.as_str()),
            Some("2025-06")
        );
        assert!(!config.view.include_unrecorded_referrer);
    }

    #[test]
    fn test_url_override() {
        let file = parse("[source]\nurl = \"https://example.com/a\"\n");
        let config = Config::from_file(&file, Some("https://example.com/b".to_string())).unwrap();
        assert_eq!(config.source.url, "https://example.com/b");
    }

    #[test]
    fn test_invalid_month_floor_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[view]\nmonth_floor = \"June\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let file = parse("[source]\nutc_offset = \"JST\"\n");
        assert!(Config::from_file(&file, None).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");
        assert!(FileConfig::load_or_default(&missing).unwrap().source.url.is_none());

        let mut file = std::fs::File::create(&missing).unwrap();
        writeln!(file, "[source]\ntimeout_secs = 9").unwrap();
        let loaded = FileConfig::load_or_default(&missing).unwrap();
        assert_eq!(loaded.source.timeout_secs, Some(9));
    }
}
