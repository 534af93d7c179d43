//! Line matchers for checker output.
//!
//! Three line kinds are recognised:
//! - diagnostic: `file:line[:column]: error|warning: message  [code]`
//! - note: `file:line[:column]: note: message`
//! - summary: `Found N errors in M files (checked K source files)` or
//!   `Success: no issues found in K source files`
//!
//! Diagnostic and note matchers are mutually exclusive on the severity
//! token, so the first matching kind is the only one that can match.
//! Callers may swap any matcher for a `CustomPattern`; custom patterns
//! are checked for the named groups of their kind when they are built.

use crate::config::ParserConfig;
use crate::error::ConfigError;
use crate::models::{Location, Severity};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

const POSITION: &str = r"^(?P<file>[^:]+):(?P<line>\d+):(?:(?P<column>\d+):)?\s*";
const POSITION_WITH_END: &str = r"^(?P<file>[^:]+):(?P<line>\d+):(?:(?P<column>\d+):(?:(?P<end_line>\d+):(?P<end_column>\d+):)?)?\s*";
const DIAGNOSTIC_TAIL: &str =
    r"(?P<level>error|warning):\s*(?P<message>.*?)(?:\s+\[(?P<error_code>[^\]\s]+)\])?\s*$";
const DIAGNOSTIC_TAIL_NO_CODE: &str = r"(?P<level>error|warning):\s*(?P<message>.*?)\s*$";
const NOTE_TAIL: &str = r"note:\s*(?P<message>.*?)\s*$";

static DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| builtin(POSITION, DIAGNOSTIC_TAIL));
static DIAGNOSTIC_WITH_END: LazyLock<Regex> =
    LazyLock::new(|| builtin(POSITION_WITH_END, DIAGNOSTIC_TAIL));
static DIAGNOSTIC_NO_CODE: LazyLock<Regex> =
    LazyLock::new(|| builtin(POSITION, DIAGNOSTIC_TAIL_NO_CODE));
static DIAGNOSTIC_WITH_END_NO_CODE: LazyLock<Regex> =
    LazyLock::new(|| builtin(POSITION_WITH_END, DIAGNOSTIC_TAIL_NO_CODE));
static NOTE: LazyLock<Regex> = LazyLock::new(|| builtin(POSITION, NOTE_TAIL));
static NOTE_WITH_END: LazyLock<Regex> = LazyLock::new(|| builtin(POSITION_WITH_END, NOTE_TAIL));
static SUMMARY_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Found (?P<errors>\d+) errors? in (?P<files>\d+) files?(?: \(checked (?P<checked>\d+) source files?\))?$",
    )
    .expect("builtin summary pattern")
});
static SUMMARY_SUCCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Success: no issues found(?: in (?P<checked>\d+) source files?)?$")
        .expect("builtin success pattern")
});

fn builtin(position: &str, tail: &str) -> Regex {
    Regex::new(&format!("{}{}", position, tail)).expect("builtin entry pattern")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The kinds of line a matcher can recognise.
pub enum LineKind {
    Diagnostic,
    Note,
    Summary,
}

impl LineKind {
    /// Named groups a custom pattern of this kind must declare.
    pub fn required_groups(&self) -> &'static [&'static str] {
        match self {
            LineKind::Diagnostic => &["file", "line", "level", "message"],
            LineKind::Note => &["file", "line", "message"],
            LineKind::Summary => &[],
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineKind::Diagnostic => "diagnostic",
            LineKind::Note => "note",
            LineKind::Summary => "summary",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fields extracted from a diagnostic or note line.
pub struct EntryMatch {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
    pub severity: Severity,
    pub message: String,
    pub code: Option<String>,
}

impl EntryMatch {
    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
            end_line: self.end_line,
            end_column: self.end_column,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Counts reported by a summary line. Any of them may be absent.
pub struct SummaryMatch {
    pub errors: Option<u32>,
    pub files_with_errors: Option<u32>,
    pub checked: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of classifying one line.
pub enum LineMatch {
    Diagnostic(EntryMatch),
    Note(EntryMatch),
    Summary(SummaryMatch),
    Unmatched,
}

#[derive(Debug, Clone)]
/// A caller-supplied regex standing in for one built-in matcher.
pub struct CustomPattern {
    kind: LineKind,
    regex: Regex,
}

impl CustomPattern {
    /// Compile and validate `pattern` for `kind`.
    pub fn new(kind: LineKind, pattern: &str) -> Result<Self, ConfigError> {
        let regex =
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { kind, source })?;
        Self::from_regex(kind, regex)
    }

    /// Validate an already compiled regex for `kind`.
    pub fn from_regex(kind: LineKind, regex: Regex) -> Result<Self, ConfigError> {
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for &group in kind.required_groups() {
            if !names.contains(&group) {
                return Err(ConfigError::MissingGroup { kind, group });
            }
        }
        Ok(Self { kind, regex })
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[derive(Debug, Clone)]
enum SummaryMatcher {
    Builtin,
    Custom(Regex),
}

#[derive(Debug, Clone)]
/// The three matchers an engine classifies lines with.
pub struct PatternSet {
    diagnostic: Regex,
    note: Regex,
    summary: SummaryMatcher,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl PatternSet {
    /// Pick built-in or custom matchers per the configuration.
    pub fn from_config(config: &ParserConfig) -> Self {
        let diag_builtin: &Regex = match (config.show_error_end, config.show_error_codes) {
            (false, true) => &*DIAGNOSTIC,
            (true, true) => &*DIAGNOSTIC_WITH_END,
            (false, false) => &*DIAGNOSTIC_NO_CODE,
            (true, false) => &*DIAGNOSTIC_WITH_END_NO_CODE,
        };
        let note_builtin: &Regex = if config.show_error_end {
            &*NOTE_WITH_END
        } else {
            &*NOTE
        };
        let diagnostic = config
            .diagnostic_pattern
            .as_ref()
            .map(|p| p.regex.clone())
            .unwrap_or_else(|| diag_builtin.clone());
        let note = config
            .note_pattern
            .as_ref()
            .map(|p| p.regex.clone())
            .unwrap_or_else(|| note_builtin.clone());
        let summary = match config.summary_pattern.as_ref() {
            Some(p) => SummaryMatcher::Custom(p.regex.clone()),
            None => SummaryMatcher::Builtin,
        };
        Self {
            diagnostic,
            note,
            summary,
        }
    }

    pub fn diagnostic(&self, line: &str) -> Option<EntryMatch> {
        match_entry(&self.diagnostic, LineKind::Diagnostic, line)
    }

    pub fn note(&self, line: &str) -> Option<EntryMatch> {
        match_entry(&self.note, LineKind::Note, line)
    }

    pub fn summary(&self, line: &str) -> Option<SummaryMatch> {
        match &self.summary {
            SummaryMatcher::Builtin => match_builtin_summary(line),
            SummaryMatcher::Custom(re) => match_custom_summary(re, line),
        }
    }

    /// Try diagnostic, note and summary matchers in that order.
    pub fn classify(&self, line: &str) -> LineMatch {
        if let Some(m) = self.diagnostic(line) {
            LineMatch::Diagnostic(m)
        } else if let Some(m) = self.note(line) {
            LineMatch::Note(m)
        } else if let Some(m) = self.summary(line) {
            LineMatch::Summary(m)
        } else {
            LineMatch::Unmatched
        }
    }
}

/// Match a line against the built-in diagnostic pattern.
pub fn match_diagnostic(line: &str) -> Option<EntryMatch> {
    match_entry(&DIAGNOSTIC, LineKind::Diagnostic, line)
}

/// Match a line against the built-in note pattern.
pub fn match_note(line: &str) -> Option<EntryMatch> {
    match_entry(&NOTE, LineKind::Note, line)
}

/// Match a line against the built-in summary forms.
pub fn match_summary(line: &str) -> Option<SummaryMatch> {
    match_builtin_summary(line)
}

fn match_entry(re: &Regex, kind: LineKind, line: &str) -> Option<EntryMatch> {
    let caps = re.captures(line.trim())?;
    let file = caps.name("file")?.as_str().trim();
    if file.is_empty() {
        return None;
    }
    let line_no: u32 = caps.name("line")?.as_str().trim().parse().ok()?;
    if line_no == 0 {
        return None;
    }
    let severity = match kind {
        LineKind::Diagnostic => {
            match Severity::from_token(caps.name("level")?.as_str().trim())? {
                Severity::Note => return None,
                sev => sev,
            }
        }
        LineKind::Note => {
            if let Some(level) = caps.name("level") {
                if Severity::from_token(level.as_str().trim())? != Severity::Note {
                    return None;
                }
            }
            Severity::Note
        }
        LineKind::Summary => return None,
    };
    let code = match kind {
        LineKind::Diagnostic => caps
            .name("error_code")
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty()),
        _ => None,
    };
    Some(EntryMatch {
        file: file.to_string(),
        line: line_no,
        column: optional_number(&caps, "column")?,
        end_line: optional_number(&caps, "end_line")?,
        end_column: optional_number(&caps, "end_column")?,
        severity,
        message: caps
            .name("message")
            .map_or("", |m| m.as_str().trim())
            .to_string(),
        code,
    })
}

/// `Some(None)` when the group did not take part; `None` when it holds
/// something that is not a number.
fn optional_number(caps: &Captures<'_>, name: &str) -> Option<Option<u32>> {
    match caps.name(name) {
        None => Some(None),
        Some(m) => m.as_str().trim().parse().ok().map(Some),
    }
}

fn match_builtin_summary(line: &str) -> Option<SummaryMatch> {
    let line = line.trim();
    if let Some(caps) = SUMMARY_FOUND.captures(line) {
        return Some(SummaryMatch {
            errors: optional_number(&caps, "errors")?,
            files_with_errors: optional_number(&caps, "files")?,
            checked: optional_number(&caps, "checked")?,
        });
    }
    let caps = SUMMARY_SUCCESS.captures(line)?;
    Some(SummaryMatch {
        errors: Some(0),
        files_with_errors: Some(0),
        checked: optional_number(&caps, "checked")?,
    })
}

fn match_custom_summary(re: &Regex, line: &str) -> Option<SummaryMatch> {
    let caps = re.captures(line.trim())?;
    let has_checked = re.capture_names().flatten().any(|n| n == "checked");
    let checked = if has_checked {
        optional_number(&caps, "checked")?
    } else {
        // Fall back to the last all-digit group.
        caps.iter()
            .skip(1)
            .flatten()
            .filter(|m| !m.as_str().is_empty() && m.as_str().bytes().all(|b| b.is_ascii_digit()))
            .last()
            .and_then(|m| m.as_str().parse().ok())
    };
    Some(SummaryMatch {
        errors: optional_number(&caps, "errors")?,
        files_with_errors: optional_number(&caps, "files")?,
        checked,
    })
}
