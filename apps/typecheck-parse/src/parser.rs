//! Parsing engine for checker output.
//!
//! Lines are classified by the `PatternSet` (diagnostic, then note, then
//! summary). Notes attach to the most recent diagnostic; a summary line
//! closes that diagnostic, so notes after it are standalone. Lines that
//! match nothing become `ParseFailure` records and parsing continues.

use crate::config::ParserConfig;
use crate::models::{Diagnostic, Note, ParseFailure, ParseResult};
use crate::patterns::{LineMatch, PatternSet};
use log::debug;
use rayon::prelude::*;
use std::fmt;

const NO_MATCH: &str = "no pattern matched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a single line was classified.
pub enum Outcome {
    Diagnostic,
    AttachedNote,
    StandaloneNote,
    Summary,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One debug trace record.
pub struct TraceEntry {
    pub line_number: usize,
    pub outcome: Outcome,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.outcome {
            Outcome::Diagnostic => "parsed as diagnostic",
            Outcome::AttachedNote => "parsed as note (attached)",
            Outcome::StandaloneNote => "parsed as note (standalone)",
            Outcome::Summary => "parsed as summary",
            Outcome::Unmatched => NO_MATCH,
        };
        write!(f, "line {}: {}", self.line_number, what)
    }
}

/// Stateful line classifier. One `parse` call at a time per instance.
#[derive(Debug, Clone)]
pub struct OutputParser {
    config: ParserConfig,
    patterns: PatternSet,
    trace: Vec<TraceEntry>,
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl OutputParser {
    pub fn new(config: ParserConfig) -> Self {
        let patterns = PatternSet::from_config(&config);
        Self {
            config,
            patterns,
            trace: Vec::new(),
        }
    }

    /// Parser for output printed without column numbers.
    pub fn minimal() -> Self {
        Self::new(ParserConfig::minimal())
    }

    /// Parser for output with columns and end positions.
    pub fn full() -> Self {
        Self::new(ParserConfig::full())
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Classification trace of the last `parse` call; empty unless the
    /// debug flag is set.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Parse a complete checker output. Never fails.
    pub fn parse(&mut self, output: &str) -> ParseResult {
        self.trace.clear();
        let mut result = ParseResult::default();
        // Index into result.diagnostics of the diagnostic notes attach to.
        let mut current: Option<usize> = None;

        for (idx, raw) in output.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let outcome = match self.patterns.classify(line) {
                LineMatch::Diagnostic(m) => {
                    match Diagnostic::new(m.location(), m.severity, m.message, m.code) {
                        Ok(d) => {
                            result.diagnostics.push(d);
                            current = Some(result.diagnostics.len() - 1);
                            Outcome::Diagnostic
                        }
                        Err(e) => {
                            result.failures.push(ParseFailure {
                                line_number,
                                line: raw.to_string(),
                                reason: Some(e.to_string()),
                                input: None,
                            });
                            Outcome::Unmatched
                        }
                    }
                }
                LineMatch::Note(m) => match current {
                    Some(i) => {
                        result.diagnostics[i].push_note(m.message);
                        Outcome::AttachedNote
                    }
                    None => {
                        result
                            .standalone_notes
                            .push(Note::new(m.location(), m.message));
                        Outcome::StandaloneNote
                    }
                },
                LineMatch::Summary(m) => {
                    if let Some(checked) = m.checked {
                        result.files_checked = checked;
                    }
                    current = None;
                    Outcome::Summary
                }
                LineMatch::Unmatched => {
                    result.failures.push(ParseFailure {
                        line_number,
                        line: raw.to_string(),
                        reason: Some(NO_MATCH.to_string()),
                        input: None,
                    });
                    Outcome::Unmatched
                }
            };
            if self.config.debug {
                let entry = TraceEntry {
                    line_number,
                    outcome,
                };
                debug!("{}", entry);
                self.trace.push(entry);
            }
        }
        result
    }
}

/// Parse independent outputs (e.g. one per checked path) with a fresh
/// engine each, then merge them in input order.
///
/// Also returns each input's debug trace, indexed like `outputs`; every
/// trace is empty unless `config.debug` is set. Merged failures carry the
/// index of the output they came from.
pub fn parse_combined<S>(
    config: &ParserConfig,
    outputs: &[S],
) -> (ParseResult, Vec<Vec<TraceEntry>>)
where
    S: AsRef<str> + Sync,
{
    let (results, traces): (Vec<ParseResult>, Vec<Vec<TraceEntry>>) = outputs
        .par_iter()
        .map(|out| {
            let mut engine = OutputParser::new(config.clone());
            let result = engine.parse(out.as_ref());
            (result, engine.trace)
        })
        .unzip();
    (ParseResult::merge(results), traces)
}
