//! Parser configuration and configuration-file resolution.
//!
//! `ParserConfig` describes the output dialect the engine should expect
//! and carries validated matcher overrides. It can be built directly,
//! from a preset, by sniffing a sample of real output, or from a
//! `typecheck-parse.toml|yaml|yml` file found at the repository root (or
//! closest ancestor) merged with CLI flags.
//!
//! Defaults:
//! - `show_column_numbers`: true
//! - `show_error_end`: false
//! - `show_error_codes`: true
//! - `debug`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::patterns::{CustomPattern, LineKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENTRY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*[^:\s][^:]*:\d+:.*?\b(?:error|warning|note):").expect("entry hint")
});
static COLUMN_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+:\d+:\d+:\s*(?:error|warning|note):").expect("column hint")
});
static END_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+:\d+:\d+:\d+:\d+:\s*(?:error|warning|note):").expect("end hint")
});
static CODE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\s\[[^\]\s]+\]\s*$").expect("code hint"));

#[derive(Debug, Clone)]
/// Settings an `OutputParser` is built with.
pub struct ParserConfig {
    pub show_column_numbers: bool,
    pub show_error_end: bool,
    pub show_error_codes: bool,
    pub debug: bool,
    pub(crate) diagnostic_pattern: Option<CustomPattern>,
    pub(crate) note_pattern: Option<CustomPattern>,
    pub(crate) summary_pattern: Option<CustomPattern>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            show_column_numbers: true,
            show_error_end: false,
            show_error_codes: true,
            debug: false,
            diagnostic_pattern: None,
            note_pattern: None,
            summary_pattern: None,
        }
    }
}

impl ParserConfig {
    /// Output printed without column numbers.
    pub fn minimal() -> Self {
        Self {
            show_column_numbers: false,
            ..Default::default()
        }
    }

    /// Output with columns and end positions.
    pub fn full() -> Self {
        Self {
            show_column_numbers: true,
            show_error_end: true,
            ..Default::default()
        }
    }

    /// Propose a configuration from a sample of real output.
    ///
    /// Samples without any `file:line:` entry are inconclusive and yield
    /// the defaults.
    pub fn detect(sample: &str) -> Self {
        if !ENTRY_HINT.is_match(sample) {
            return Self::default();
        }
        let show_error_end = END_HINT.is_match(sample);
        Self {
            show_column_numbers: show_error_end || COLUMN_HINT.is_match(sample),
            show_error_end,
            show_error_codes: CODE_HINT.is_match(sample),
            ..Default::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Install a validated override in the slot for its kind.
    pub fn with_custom(mut self, pattern: CustomPattern) -> Self {
        match pattern.kind() {
            LineKind::Diagnostic => self.diagnostic_pattern = Some(pattern),
            LineKind::Note => self.note_pattern = Some(pattern),
            LineKind::Summary => self.summary_pattern = Some(pattern),
        }
        self
    }

    pub fn with_diagnostic_pattern(self, pattern: &str) -> Result<Self, ConfigError> {
        Ok(self.with_custom(CustomPattern::new(LineKind::Diagnostic, pattern)?))
    }

    pub fn with_note_pattern(self, pattern: &str) -> Result<Self, ConfigError> {
        Ok(self.with_custom(CustomPattern::new(LineKind::Note, pattern)?))
    }

    pub fn with_summary_pattern(self, pattern: &str) -> Result<Self, ConfigError> {
        Ok(self.with_custom(CustomPattern::new(LineKind::Summary, pattern)?))
    }

    pub fn custom_pattern(&self, kind: LineKind) -> Option<&CustomPattern> {
        match kind {
            LineKind::Diagnostic => self.diagnostic_pattern.as_ref(),
            LineKind::Note => self.note_pattern.as_ref(),
            LineKind::Summary => self.summary_pattern.as_ref(),
        }
    }

    /// Resolve a named preset; `detect` needs a sample.
    pub fn from_preset(name: &str, sample: Option<&str>) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "minimal" => Ok(Self::minimal()),
            "full" => Ok(Self::full()),
            "detect" => sample.map(Self::detect).ok_or(ConfigError::MissingSample),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Dialect flags under `[parser]`.
pub struct ParserCfg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_column_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_error_end: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_error_codes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl From<&ParserConfig> for ParserCfg {
    fn from(cfg: &ParserConfig) -> Self {
        Self {
            preset: None,
            show_column_numbers: Some(cfg.show_column_numbers),
            show_error_end: Some(cfg.show_error_end),
            show_error_codes: Some(cfg.show_error_codes),
            debug: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Matcher overrides under `[patterns]`, as regex strings.
pub struct PatternsCfg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Root configuration loaded from `typecheck-parse.toml|yaml`.
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserCfg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<PatternsCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// The config file that was loaded, if one was found.
    pub config_file: Option<PathBuf>,
    pub parser: ParserConfig,
}

const CONFIG_NAMES: [&str; 3] = [
    "typecheck-parse.toml",
    "typecheck-parse.yaml",
    "typecheck-parse.yml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of searching for configuration from a start directory.
pub struct Discovery {
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
}

/// Search `start` and its ancestors for a config file.
///
/// The nearest directory holding a config file or a `.git` entry becomes
/// the root. Within one directory the TOML name is preferred. When neither
/// is found, `start` itself is the root.
pub fn discover(start: &Path) -> Discovery {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let found = start.ancestors().find_map(|dir| {
        let config_file = CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file());
        if config_file.is_some() || dir.join(".git").exists() {
            Some(Discovery {
                root: dir.to_path_buf(),
                config_file,
            })
        } else {
            None
        }
    });
    found.unwrap_or(Discovery {
        root: start,
        config_file: None,
    })
}

/// Load a `FileConfig`; `.yaml`/`.yml` files are read as YAML, anything
/// else as TOML.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&s)?),
        _ => Ok(toml::from_str(&s)?),
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// `sample` is only consulted for the `detect` preset.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_preset: Option<&str>,
    cli_debug: Option<bool>,
    cli_patterns: &PatternsCfg,
    sample: Option<&str>,
) -> Result<Effective, ConfigError> {
    let Discovery { root, config_file } = discover(Path::new(cli_repo_root.unwrap_or(".")));
    let file = match &config_file {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let file_parser = file.parser.unwrap_or_default();
    let file_patterns = file.patterns.unwrap_or_default();

    let mut parser = match cli_preset {
        Some(preset) => ParserConfig::from_preset(preset, sample)?,
        None => {
            let mut base = match file_parser.preset.as_deref() {
                Some(preset) => ParserConfig::from_preset(preset, sample)?,
                None => ParserConfig::default(),
            };
            if let Some(v) = file_parser.show_column_numbers {
                base.show_column_numbers = v;
            }
            if let Some(v) = file_parser.show_error_end {
                base.show_error_end = v;
            }
            if let Some(v) = file_parser.show_error_codes {
                base.show_error_codes = v;
            }
            base
        }
    };
    parser.debug = cli_debug.or(file_parser.debug).unwrap_or(false);

    let diagnostic = cli_patterns.diagnostic.as_ref().or(file_patterns.diagnostic.as_ref());
    if let Some(p) = diagnostic {
        parser = parser.with_diagnostic_pattern(p)?;
    }
    let note = cli_patterns.note.as_ref().or(file_patterns.note.as_ref());
    if let Some(p) = note {
        parser = parser.with_note_pattern(p)?;
    }
    let summary = cli_patterns.summary.as_ref().or(file_patterns.summary.as_ref());
    if let Some(p) = summary {
        parser = parser.with_summary_pattern(p)?;
    }

    Ok(Effective {
        repo_root: root,
        config_file,
        parser,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_presets() {
        let d = ParserConfig::default();
        assert!(d.show_column_numbers && !d.show_error_end && !d.debug);
        assert!(!ParserConfig::minimal().show_column_numbers);
        let full = ParserConfig::full();
        assert!(full.show_column_numbers && full.show_error_end);
    }

    #[test]
    fn test_detect_columns_and_codes() {
        let cfg = ParserConfig::detect("src/a.py:10:5: error: Bad  [assignment]\n");
        assert!(cfg.show_column_numbers);
        assert!(!cfg.show_error_end);
        assert!(cfg.show_error_codes);

        let cfg = ParserConfig::detect("src/a.py:10: error: Bad\nFound 1 error in 1 file\n");
        assert!(!cfg.show_column_numbers);
        assert!(!cfg.show_error_codes);
    }

    #[test]
    fn test_detect_end_positions() {
        let cfg = ParserConfig::detect("a.py:1:2:3:4: error: spans  [misc]");
        assert!(cfg.show_error_end);
        assert!(cfg.show_column_numbers);
    }

    #[test]
    fn test_detect_inconclusive_falls_back_to_defaults() {
        for sample in ["", "Success: no issues found in 3 source files", "garbage\n\n"] {
            let cfg = ParserConfig::detect(sample);
            let d = ParserConfig::default();
            assert_eq!(cfg.show_column_numbers, d.show_column_numbers);
            assert_eq!(cfg.show_error_end, d.show_error_end);
            assert_eq!(cfg.show_error_codes, d.show_error_codes);
        }
    }

    #[test]
    fn test_custom_pattern_without_line_fails_at_configuration() {
        let err = ParserConfig::default()
            .with_diagnostic_pattern(r"^(?P<file>[^:]+): (?P<level>error): (?P<message>.*)$")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingGroup { group: "line", .. }));
    }

    #[test]
    fn test_with_custom_routes_by_kind() {
        let cfg = ParserConfig::default()
            .with_note_pattern(r"^(?P<file>\S+) (?P<line>\d+) hint (?P<message>.*)$")
            .unwrap();
        assert!(cfg.custom_pattern(LineKind::Note).is_some());
        assert!(cfg.custom_pattern(LineKind::Diagnostic).is_none());
    }

    #[test]
    fn test_from_preset_errors() {
        assert!(matches!(
            ParserConfig::from_preset("detect", None),
            Err(ConfigError::MissingSample)
        ));
        assert!(matches!(
            ParserConfig::from_preset("verbose", None),
            Err(ConfigError::UnknownPreset(_))
        ));
        assert!(ParserConfig::from_preset("Full", None).unwrap().show_error_end);
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("typecheck-parse.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
[parser]
show_column_numbers = false
debug = true
[patterns]
summary = '^(?P<checked>\d+) files checked$'
    "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None, &PatternsCfg::default(), None)
            .unwrap();
        assert_eq!(
            eff.config_file.as_deref().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new("typecheck-parse.toml"))
        );
        assert!(!eff.parser.show_column_numbers);
        assert!(eff.parser.debug);
        assert!(eff.parser.custom_pattern(LineKind::Summary).is_some());
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("typecheck-parse.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
parser:
  preset: full
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None, &PatternsCfg::default(), None)
            .unwrap();
        assert!(eff.parser.show_error_end);
        assert!(eff.parser.show_error_codes);
        assert!(!eff.parser.debug);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(dir.path().to_str(), None, None, &PatternsCfg::default(), None)
            .unwrap();
        assert!(eff.config_file.is_none());
        assert!(eff.parser.show_column_numbers);
        assert!(eff.parser.custom_pattern(LineKind::Diagnostic).is_none());
    }

    #[test]
    fn test_cli_precedence_over_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("typecheck-parse.toml"),
            "[parser]\ndebug = true\nshow_error_end = true\n",
        )
        .unwrap();
        let cli = PatternsCfg {
            diagnostic: Some(
                r"^(?P<file>\S+) (?P<line>\d+) (?P<level>\w+) (?P<message>.*)$".into(),
            ),
            ..Default::default()
        };
        let eff =
            resolve_effective(root.to_str(), Some("minimal"), Some(false), &cli, None).unwrap();
        assert!(!eff.parser.debug);
        assert!(!eff.parser.show_error_end);
        assert!(!eff.parser.show_column_numbers);
        assert!(eff.parser.custom_pattern(LineKind::Diagnostic).is_some());
    }

    #[test]
    fn test_invalid_file_pattern_is_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("typecheck-parse.toml"),
            "[patterns]\nnote = '^(?P<file>\\S+): (?P<message>.*)$'\n",
        )
        .unwrap();
        let err = resolve_effective(root.to_str(), None, None, &PatternsCfg::default(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingGroup {
                kind: LineKind::Note,
                group: "line"
            }
        ));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("typecheck-parse.toml"), "[parser\n").unwrap();
        let found = discover(dir.path());
        let path = found.config_file.unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_discover_walks_up_to_nearest_marker() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("typecheck-parse.yml"), "parser:\n  debug: true\n").unwrap();
        fs::write(root.join("typecheck-parse.toml"), "[parser]\n").unwrap();
        let nested = root.join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();

        let found = discover(&nested);
        assert_eq!(found.root, root);
        assert_eq!(found.config_file, Some(root.join("typecheck-parse.toml")));

        fs::create_dir(root.join("pkg").join(".git")).unwrap();
        let found = discover(&nested);
        assert_eq!(found.root, root.join("pkg"));
        assert!(found.config_file.is_none());
    }

    #[test]
    fn test_yaml_config_loaded_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typecheck-parse.yml");
        fs::write(&path, "parser:\n  show_error_codes: false\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.parser.unwrap().show_error_codes, Some(false));
    }

    #[test]
    fn test_detected_config_serializes_as_parser_section() {
        let cfg = ParserConfig::detect("a.py:1: error: x");
        let file = FileConfig {
            parser: Some(ParserCfg::from(&cfg)),
            patterns: None,
        };
        let s = toml::to_string(&file).unwrap();
        assert!(s.contains("[parser]"));
        assert!(s.contains("show_column_numbers = false"));
        assert!(!s.contains("[patterns]"));
    }
}
