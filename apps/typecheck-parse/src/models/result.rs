//! Aggregate result of one parse call and its derived views.

use super::{Diagnostic, Note, ParseFailure, Severity};
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Everything recognised in one checker output.
pub struct ParseResult {
    pub diagnostics: Vec<Diagnostic>,
    pub standalone_notes: Vec<Note>,
    pub files_checked: u32,
    pub failures: Vec<ParseFailure>,
}

impl ParseResult {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Distinct files with at least one error, in first-seen order.
    pub fn files_with_errors(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for d in self.errors() {
            let file = d.location().file.as_str();
            if !files.contains(&file) {
                files.push(file);
            }
        }
        files
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// One-line summary in the checker's own wording.
    pub fn format_summary(&self) -> String {
        let errors = self.error_count();
        let files = self.files_with_errors().len();
        let checked = self.files_checked as usize;
        format!(
            "Found {} {} in {} {} (checked {} source {})",
            errors,
            plural(errors, "error"),
            files,
            plural(files, "file"),
            checked,
            plural(checked, "file"),
        )
    }

    /// Combine results of independent runs: sequences concatenate in
    /// order, checked-file counts add up. Failures not yet tagged get the
    /// index of the run they came from.
    pub fn merge<I>(results: I) -> ParseResult
    where
        I: IntoIterator<Item = ParseResult>,
    {
        let mut out = ParseResult::default();
        for (idx, mut r) in results.into_iter().enumerate() {
            for f in &mut r.failures {
                if f.input.is_none() {
                    f.input = Some(idx);
                }
            }
            out.diagnostics.append(&mut r.diagnostics);
            out.standalone_notes.append(&mut r.standalone_notes);
            out.failures.append(&mut r.failures);
            out.files_checked = out.files_checked.saturating_add(r.files_checked);
        }
        out
    }
}

// Stored fields plus the derived counts, so a serialized result is
// self-contained.
impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("ParseResult", 7)?;
        st.serialize_field("diagnostics", &self.diagnostics)?;
        st.serialize_field("standalone_notes", &self.standalone_notes)?;
        st.serialize_field("files_checked", &self.files_checked)?;
        st.serialize_field("failures", &self.failures)?;
        st.serialize_field("error_count", &self.error_count())?;
        st.serialize_field("warning_count", &self.warning_count())?;
        st.serialize_field("files_with_errors", &self.files_with_errors())?;
        st.end()
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
