// ABOUTME: Format strings and the per-kind resolver that expands aliases into templates.
// ABOUTME: Handles table/raw/json aliases, quiet mode, and configured per-kind overrides.

use crate::config::Config;
use std::collections::HashMap;
use std::fmt;

/// Alias selecting the aligned table layout.
pub const TABLE_FORMAT_KEY: &str = "table";
/// Alias selecting the `key: value` block layout.
pub const RAW_FORMAT_KEY: &str = "raw";
/// Alias selecting one JSON object per line.
pub const JSON_FORMAT_KEY: &str = "json";
/// Template the `json` alias expands to.
pub const JSON_FORMAT: &str = "{{json .}}";
/// Identifier-only template used by quiet mode.
pub const DEFAULT_QUIET_FORMAT: &str = "{{.ID}}";

/// A format string governing one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format(String);

impl Format {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table layouts start with `table`; the remainder is the column template.
    pub fn is_table(&self) -> bool {
        self.0.starts_with(TABLE_FORMAT_KEY)
    }

    pub fn is_json(&self) -> bool {
        self.0 == JSON_FORMAT_KEY
    }

    /// The template text actually parsed for this format.
    ///
    /// Strips the `table` prefix, expands `json`, trims surrounding spaces,
    /// and turns the two-character escapes `\t` and `\n` into a real tab and
    /// newline.
    pub fn template(&self) -> String {
        let source = if self.is_table() {
            &self.0[TABLE_FORMAT_KEY.len()..]
        } else if self.is_json() {
            JSON_FORMAT
        } else {
            self.0.as_str()
        };
        source
            .trim_matches(' ')
            .replace("\\t", "\t")
            .replace("\\n", "\n")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Format {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Format {
    fn from(source: String) -> Self {
        Self(source)
    }
}

/// Default formats registered for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFormats {
    /// Full table layout, including the `table` prefix.
    pub table: String,
    /// `key: value` block, one line per field, ending with `\n`.
    pub raw: String,
    /// Raw layout restricted to the identifier.
    pub raw_quiet: String,
    /// Identifier-only template.
    pub quiet: String,
}

impl Default for KindFormats {
    fn default() -> Self {
        Self {
            table: format!("{TABLE_FORMAT_KEY} {{{{.ID}}}}"),
            raw: "id: {{.ID}}\\n".to_string(),
            raw_quiet: "id: {{.ID}}".to_string(),
            quiet: DEFAULT_QUIET_FORMAT.to_string(),
        }
    }
}

/// Maps requested format names to concrete templates for each entity kind.
#[derive(Debug, Clone, Default)]
pub struct FormatResolver {
    defaults: HashMap<String, KindFormats>,
    overrides: HashMap<String, String>,
    fallback: KindFormats,
}

impl FormatResolver {
    /// An empty resolver; every kind uses the generic fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver with the built-in views registered.
    pub fn builtin() -> Self {
        let mut resolver = Self::new();
        resolver.register(crate::views::network::KIND, crate::views::network::formats());
        resolver.register(
            crate::views::checkpoint::KIND,
            crate::views::checkpoint::formats(),
        );
        resolver.register(crate::views::task::KIND, crate::views::task::formats());
        resolver
    }

    pub fn register(&mut self, kind: impl Into<String>, formats: KindFormats) {
        self.defaults.insert(kind.into(), formats);
    }

    /// Use `format` whenever no format is requested for `kind`.
    pub fn set_override(&mut self, kind: impl Into<String>, format: impl Into<String>) {
        self.overrides.insert(kind.into(), format.into());
    }

    /// Apply the per-kind overrides of a configuration file.
    pub fn with_config(mut self, config: &Config) -> Self {
        for (kind, format) in &config.formats {
            if !self.defaults.contains_key(kind) {
                tracing::warn!(kind = %kind, "format override for unknown entity kind");
            }
            self.set_override(kind.clone(), format.clone());
        }
        self
    }

    pub fn formats(&self, kind: &str) -> &KindFormats {
        self.defaults.get(kind).unwrap_or(&self.fallback)
    }

    /// Resolve the format for rendering `kind`.
    ///
    /// An empty request takes the configured format for the kind, which may
    /// itself be an alias. Quiet mode always yields identifier-only output:
    /// `raw` keeps its labelled single-line form, anything else becomes the
    /// quiet default.
    pub fn resolve(&self, kind: &str, requested: &str, quiet: bool) -> Format {
        let formats = self.formats(kind);
        let requested = match requested {
            "" => self.overrides.get(kind).map(String::as_str).unwrap_or(""),
            other => other,
        };
        let resolved = if quiet {
            if requested == RAW_FORMAT_KEY {
                formats.raw_quiet.clone()
            } else {
                formats.quiet.clone()
            }
        } else {
            match requested {
                "" | TABLE_FORMAT_KEY => formats.table.clone(),
                RAW_FORMAT_KEY => formats.raw.clone(),
                JSON_FORMAT_KEY => JSON_FORMAT.to_string(),
                custom => custom.to_string(),
            }
        };
        tracing::debug!(kind, requested, quiet, format = %resolved, "resolved format");
        Format(resolved)
    }
}
