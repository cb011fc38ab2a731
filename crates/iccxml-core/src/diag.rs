//! Parse Diagnostics
//!
//! Non-fatal anomalies (unknown header elements, defaulted fields) are
//! collected per conversion in a [`ParseLog`] instead of aborting or
//! going to process-wide state. The caller creates one log per call and
//! decides whether to surface or discard it.

use std::fmt;

/// Accumulated non-fatal warnings from one conversion.
#[derive(Debug, Default)]
pub struct ParseLog {
    lines: Vec<String>,
}

impl ParseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one warning line (without trailing newline).
    pub fn warn(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// The fixed format for an unrecognized header element.
    pub fn warn_unknown_header_attr(&mut self, name: &str, value: &str) {
        self.lines
            .push(format!("Unknown Profile Header attribute: {name}=\"{value}\""));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl fmt::Display for ParseLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Tolerance knobs for parsing.
///
/// The default preserves the historical best-effort behavior: unknown
/// rendering-intent text and unwireable color-space targets are silently
/// skipped. Setting `log_unrecognized` records them in the [`ParseLog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub log_unrecognized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_newline_terminated() {
        let mut log = ParseLog::new();
        log.warn_unknown_header_attr("Wavelength", "555");
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.to_string(),
            "Unknown Profile Header attribute: Wavelength=\"555\"\n"
        );
    }
}
