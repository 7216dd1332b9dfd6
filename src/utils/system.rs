//! System information helpers

use sys_locale::get_locale;

use crate::log_debug;

const MODULE: &str = "utils::system";

/// Get the system locale (e.g., "en-US", "it-IT", "de-DE")
pub fn get_system_locale() -> String {
    let locale = get_locale().unwrap_or_else(|| "en-US".to_string());
    log_debug!(MODULE, "Detected system locale: {}", locale);
    locale
}

/// Configured locale if any, otherwise the system one
pub fn resolve_locale(configured: Option<&str>) -> String {
    match configured.map(str::trim).filter(|l| !l.is_empty()) {
        Some(locale) => locale.to_string(),
        None => get_system_locale(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_locale_wins() {
        assert_eq!(resolve_locale(Some("de-DE")), "de-DE");
    }

    #[test]
    fn test_blank_locale_falls_back_to_system() {
        assert!(!resolve_locale(Some("  ")).is_empty());
        assert!(!resolve_locale(None).is_empty());
    }
}
