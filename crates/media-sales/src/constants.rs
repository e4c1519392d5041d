//! Centralized constants for the media sales viewer
//!
//! Deployment-specific settings are loaded from config.toml; these are the
//! defaults used when a setting is absent.

// =============================================================================
// Data Source
// =============================================================================

/// Apps Script web app serving the sales sheet as a JSON array
pub const DEFAULT_SOURCE_URL: &str = "https://script.google.com/macros/s/AKfycbzgP95iX3fGCHDECDyYeTZPsva2IKloBlbj5R95r5Gm-AGkZu8ak66xGrJr_o5xV3NS_g/exec";

/// Request timeout for the sales endpoint (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Display
// =============================================================================

/// Currency suffix for amounts
pub const CURRENCY_SUFFIX: &str = "円";

/// Maximum fraction digits shown for amounts
pub const AMOUNT_FRACTION_DIGITS: usize = 3;

/// Shown in place of a month or store that could not be read
pub const BLANK_CELL: &str = "-";

// =============================================================================
// File Names
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// Referrer summary CSV filename
pub const SUMMARY_FILENAME: &str = "referrer_summary.csv";

/// Itemized records CSV filename
pub const RECORDS_FILENAME: &str = "sales_records.csv";
