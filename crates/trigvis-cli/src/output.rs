//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its
//! output accordingly: readable text for humans, stable JSON for tools.

use serde::Serialize;
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a serializable value: pretty JSON in JSON mode, the closure's
/// text otherwise.
///
/// # Errors
///
/// Returns an error when serialization or the write itself fails.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        human(value, &mut out)?;
    }
    Ok(())
}

/// A machine-readable error envelope for JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CliError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Render an error in the active output mode (stderr for humans, a JSON
/// envelope on stdout for tools).
///
/// # Errors
///
/// Returns an error when the write itself fails.
pub fn render_error(mode: OutputMode, err: &CliError) -> anyhow::Result<()> {
    if mode.is_json() {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, err)?;
        writeln!(out)?;
    } else {
        eprintln!("error: {}", err.error);
        if let Some(details) = &err.details {
            eprintln!("  {details}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_detection() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Human.is_json());
    }

    #[test]
    fn cli_error_serializes_without_empty_details() {
        let err = CliError::new("boom");
        let value = serde_json::to_value(&err).expect("serialize");
        assert_eq!(value["error"], "boom");
        assert!(value.get("details").is_none());
    }
}
