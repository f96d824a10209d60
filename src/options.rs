//! # Router Options
//!
//! Behavior switches for matching and link generation, loaded from the
//! environment or a TOML file.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `ROUTEWEAVE_LOWERCASE_URLS` | `lowercase_urls` | `false` |
//! | `ROUTEWEAVE_LOWERCASE_QUERY` | `lowercase_query_strings` | `false` |
//! | `ROUTEWEAVE_TRAILING_SLASH` | `append_trailing_slash` | `false` |
//! | `ROUTEWEAVE_ELIDE_DEFAULTS` | `elide_trailing_defaults` | `true` |
//! | `ROUTEWEAVE_SLOW_MATCH_US` | `slow_match_threshold_us` | `1000` |
//!
//! Booleans accept `true`/`false`/`1`/`0`; unparsable values fall back to
//! the default.
//!
//! ## TOML
//!
//! ```toml
//! lowercase_urls = true
//! append_trailing_slash = false
//! slow_match_threshold_us = 250
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Options shared by the matcher and the link generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOptions {
    /// Lower-case generated paths (not the query string).
    pub lowercase_urls: bool,
    /// Also lower-case the query string; only applies with `lowercase_urls`.
    pub lowercase_query_strings: bool,
    /// Append `/` to generated paths.
    pub append_trailing_slash: bool,
    /// Drop trailing segments whose value equals the default when
    /// generating. When false every segment with a value is rendered.
    pub elide_trailing_defaults: bool,
    /// Matches slower than this are logged at `warn`.
    pub slow_match_threshold_us: u64,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            lowercase_urls: false,
            lowercase_query_strings: false,
            append_trailing_slash: false,
            elide_trailing_defaults: true,
            slow_match_threshold_us: 1000,
        }
    }
}

impl RouterOptions {
    /// Load options from `ROUTEWEAVE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load options from any key lookup (used by `from_env`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };
        Self {
            lowercase_urls: flag("ROUTEWEAVE_LOWERCASE_URLS", defaults.lowercase_urls),
            lowercase_query_strings: flag(
                "ROUTEWEAVE_LOWERCASE_QUERY",
                defaults.lowercase_query_strings,
            ),
            append_trailing_slash: flag(
                "ROUTEWEAVE_TRAILING_SLASH",
                defaults.append_trailing_slash,
            ),
            elide_trailing_defaults: flag(
                "ROUTEWEAVE_ELIDE_DEFAULTS",
                defaults.elide_trailing_defaults,
            ),
            slow_match_threshold_us: lookup("ROUTEWEAVE_SLOW_MATCH_US")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.slow_match_threshold_us),
        }
    }

    /// Parse options from TOML text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML, unknown fields or wrong types.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Failed to parse router options")
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router options: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse router options: {}", path.display()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
