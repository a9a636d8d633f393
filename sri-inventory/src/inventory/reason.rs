//! Human-readable justification attached to each inventory entry.

/// Keyword → reason pairs, checked in order against the lowercase script
/// name. The first keyword contained in the name wins.
pub const REASONS: &[(&str, &str)] = &[
    ("main", "Main application bundle"),
    ("runtime", "Runtime"),
    ("polyfills", "Browser polyfills"),
    ("vendor", "Third-party dependencies"),
    ("styles", "Application styles"),
    ("gtm", "Google Tag Manager"),
    ("analytics", "Analytics script"),
    ("ga", "Google Analytics"),
    ("chunk", "Lazy loaded module chunk"),
    ("common", "Shared module chunk"),
];

/// Reason used when no keyword matches.
pub const DEFAULT_REASON: &str = "Application script";

pub fn reason_for(script_name: &str) -> &'static str {
    let lowered = script_name.to_lowercase();
    REASONS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, reason)| *reason)
        .unwrap_or(DEFAULT_REASON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_matches() {
        assert_eq!(reason_for("main.8f3a.js"), "Main application bundle");
        assert_eq!(reason_for("runtime.js"), "Runtime");
        assert_eq!(reason_for("polyfills-es5.js"), "Browser polyfills");
        assert_eq!(reason_for("vendor.bundle.js"), "Third-party dependencies");
        assert_eq!(reason_for("VENDOR.JS"), "Third-party dependencies");
        assert_eq!(reason_for("styles.js"), "Application styles");
        assert_eq!(reason_for("https://www.googletagmanager.com/gtm.js"), "Google Tag Manager");
        assert_eq!(reason_for("analytics.js"), "Analytics script");
        assert_eq!(reason_for("common.js"), "Shared module chunk");
        assert_eq!(reason_for("chunk.1234.js"), "Lazy loaded module chunk");
    }

    #[test]
    fn first_keyword_in_table_order_wins() {
        // Contains both "vendor" and "main"; "main" comes first in the table.
        assert_eq!(reason_for("vendor-main.js"), "Main application bundle");
        // "ga" precedes "chunk" and matches inside "mega".
        assert_eq!(reason_for("mega-chunk.js"), "Google Analytics");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(reason_for("app.js"), DEFAULT_REASON);
        assert_eq!(reason_for(""), DEFAULT_REASON);
    }
}
