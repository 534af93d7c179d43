//! Error types for configuration and model construction.
//!
//! Unparseable checker output is never an error: it is recorded as
//! `ParseFailure` data inside the result. Errors here are raised while a
//! configuration is being built, before any parsing happens.

use crate::patterns::LineKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {kind} pattern: {source}")]
    InvalidPattern {
        kind: LineKind,
        #[source]
        source: regex::Error,
    },
    #[error("{kind} pattern is missing required named group `{group}`")]
    MissingGroup { kind: LineKind, group: &'static str },
    #[error("unknown preset '{0}' (expected minimal|full|detect)")]
    UnknownPreset(String),
    #[error("preset 'detect' needs a sample of checker output")]
    MissingSample,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("notes cannot be diagnostics; use a standalone note instead")]
    NoteSeverity,
}
