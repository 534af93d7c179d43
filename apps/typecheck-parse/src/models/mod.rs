//! Shared data models for parsed checker output.

pub mod result;

pub use result::ParseResult;

use crate::error::ModelError;
use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// A position in a checked source file.
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
            end_line: None,
            end_column: None,
        }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Message severity as printed by the checker.
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    /// Parse a severity token (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "note" => Some(Severity::Note),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// An error or warning, with the notes that followed it.
pub struct Diagnostic {
    location: Location,
    severity: Severity,
    message: String,
    code: Option<String>,
    notes: Vec<String>,
}

impl Diagnostic {
    /// Build a diagnostic. Fails for `Severity::Note`.
    pub fn new(
        location: Location,
        severity: Severity,
        message: impl Into<String>,
        code: Option<String>,
    ) -> Result<Self, ModelError> {
        if severity == Severity::Note {
            return Err(ModelError::NoteSeverity);
        }
        Ok(Self {
            location,
            severity,
            message: message.into(),
            code,
            notes: Vec::new(),
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub(crate) fn push_note(&mut self, note: String) {
        self.notes.push(note);
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// A note with no diagnostic to attach to.
pub struct Note {
    location: Location,
    message: String,
}

impl Note {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn severity(&self) -> Severity {
        Severity::Note
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// A line that no matcher recognised.
pub struct ParseFailure {
    pub line_number: usize,
    pub line: String,
    pub reason: Option<String>,
    /// Position of the source output in a merged run; `None` for a single
    /// parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_rejects_note_severity() {
        let err = Diagnostic::new(Location::new("a.py", 1), Severity::Note, "x", None);
        assert_eq!(err.unwrap_err(), ModelError::NoteSeverity);
    }

    #[test]
    fn test_diagnostic_accepts_error_and_warning() {
        for sev in [Severity::Error, Severity::Warning] {
            let d = Diagnostic::new(Location::new("a.py", 1), sev, "x", None).unwrap();
            assert_eq!(d.severity(), sev);
            assert!(d.notes().is_empty());
        }
    }

    #[test]
    fn test_location_builders() {
        let loc = Location::new("test.py", 42).with_column(13).with_end(43, 20);
        assert_eq!(loc.column, Some(13));
        assert_eq!(loc.end_line, Some(43));
        assert_eq!(loc.end_column, Some(20));
        let bare = Location::new("test.py", 42);
        assert!(bare.column.is_none() && bare.end_line.is_none());
    }

    #[test]
    fn test_severity_tokens() {
        assert_eq!(Severity::from_token("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::from_token("note"), Some(Severity::Note));
        assert_eq!(Severity::from_token("fatal"), None);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_diagnostic_serializes_lowercase_severity() {
        let mut d = Diagnostic::new(
            Location::new("test.py", 10).with_column(5),
            Severity::Error,
            "Test error",
            Some("test-error".into()),
        )
        .unwrap();
        d.push_note("Test note".into());
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["severity"], "error");
        assert_eq!(v["location"]["column"], 5);
        assert_eq!(v["code"], "test-error");
        assert_eq!(v["notes"][0], "Test note");
    }
}
