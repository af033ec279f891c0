//! Shared helpers used across multiple crates.

use chrono::NaiveDate;
use serde_json::Value;

// ── Date Parsing ────────────────────────────────────────────────────

/// Parse a date string in `YYYY-MM-DD` format.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ── JSON Helpers ────────────────────────────────────────────────────

/// `null` and `""` count as empty; every other value is present.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
