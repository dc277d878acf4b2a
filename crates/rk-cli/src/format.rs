//! Output formatting utilities for the Resolute CLI.

use serde::Serialize;

/// Supported output styles for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Pretty-printed, multi-line JSON.
    Pretty,
    /// Single-line compact JSON.
    Compact,
}

impl Style {
    /// Render a serializable value according to this style.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        let rendered = match self {
            Style::Pretty => serde_json::to_string_pretty(value)?,
            Style::Compact => serde_json::to_string(value)?,
        };
        Ok(rendered)
    }

    /// Render an error message as a JSON object `{"error": ...}`.
    #[must_use]
    pub fn render_error(&self, message: &str) -> String {
        let value = serde_json::json!({ "error": message });
        match self {
            Style::Pretty => serde_json::to_string_pretty(&value).unwrap_or_default(),
            Style::Compact => serde_json::to_string(&value).unwrap_or_default(),
        }
    }
}
