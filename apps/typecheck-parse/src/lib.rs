//! typecheck-parse core library.
//!
//! This crate turns the line-oriented text output of a static type checker
//! into structured records: diagnostics with their notes, standalone notes,
//! the checked-file count, and lines it could not parse.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Parser configuration, presets, format detection, config files.
//! - `error`: Configuration and model errors.
//! - `models`: Diagnostic, note, failure and aggregate result records.
//! - `parser`: The line-classification engine.
//! - `patterns`: Built-in and custom line matchers.
//! - `utils`: Supporting helpers.
//!
//! Note: All documentation comments are written in English by convention.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod patterns;
pub mod utils;

pub use config::ParserConfig;
pub use error::{ConfigError, ModelError};
pub use models::{Diagnostic, Location, Note, ParseFailure, ParseResult, Severity};
pub use parser::{parse_combined, OutputParser};
