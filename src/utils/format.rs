//! Formatting utilities for human-readable output
//!
//! Label lines, localized dates and sizes shown on cards and in logs.

use chrono::{NaiveDate, TimeZone};

use crate::config;
use crate::photos::CreatedTimestamp;

/// Format bytes into human-readable size string (e.g., "1.5 MB", "256 KB")
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Join labels for display ("cat, sunset"); an empty list gives ""
pub fn join_labels(labels: &[String]) -> String {
    labels.join(", ")
}

/// Date-only formatting following the conventions of a locale.
///
/// Patterns reproduce browser `toLocaleDateString()` output, e.g. the
/// unpadded "3/5/2024" for en-US. chrono's `unstable-locales` formats from
/// glibc data ("03/05/2024" for en-US, two-digit years for en-GB), so it is
/// not used here. Unlisted locales get ISO dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    pattern: &'static str,
}

impl DateFormatter {
    /// Pick the date pattern for a BCP 47 tag such as "en-US" or "de_DE"
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.replace('_', "-").to_lowercase();
        let mut parts = normalized.split('-');
        let language = parts.next().unwrap_or("");
        let region = parts.next().unwrap_or("");

        let pattern = match (language, region) {
            ("en", "gb" | "au" | "nz" | "ie" | "in" | "za") => "%d/%m/%Y",
            ("en", "ca") | ("fr", "ca") => "%Y-%m-%d",
            ("en", _) => "%-m/%-d/%Y",
            ("fr" | "es" | "it" | "pt" | "el" | "vi" | "id", _) => "%d/%m/%Y",
            ("de" | "ru" | "pl" | "tr" | "nb" | "no" | "da" | "uk" | "ro", _) => "%d.%m.%Y",
            ("fi" | "cs" | "sk", _) => "%-d.%-m.%Y",
            ("nl", _) => "%d-%m-%Y",
            ("ja" | "zh", _) => "%Y/%-m/%-d",
            ("ko", _) => "%Y. %-m. %-d.",
            ("hu", _) => "%Y. %m. %d.",
            _ => "%Y-%m-%d",
        };
        Self { pattern }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.pattern).to_string()
    }

    /// Format a record timestamp as a calendar date in the local time zone
    pub fn format_timestamp(&self, timestamp: Option<&CreatedTimestamp>) -> String {
        self.format_timestamp_in(timestamp, &chrono::Local)
    }

    pub fn format_timestamp_in<Tz: TimeZone>(
        &self,
        timestamp: Option<&CreatedTimestamp>,
        tz: &Tz,
    ) -> String {
        match timestamp.and_then(|ts| ts.date_in(tz)) {
            Some(date) => self.format_date(date),
            None => config::messages::INVALID_DATE.to_string(),
        }
    }
}
