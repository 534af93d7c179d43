//! typecheck-parse CLI binary entry point.
//! Reads captured checker output, parses it, and prints the summary.

use clap::Parser;
use std::fs;
use std::io;
use typecheck_parse::cli::{Cli, Commands};
use typecheck_parse::config::{self, FileConfig, ParserCfg, ParserConfig, PatternsCfg};
use typecheck_parse::parser::parse_combined;
use typecheck_parse::utils::{debug_prefix, error_prefix, info_prefix, note_prefix};

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => io::read_to_string(io::stdin()),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", error_prefix(), message);
    std::process::exit(2);
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Parse {
            files,
            repo_root,
            preset,
            debug,
            diagnostic_pattern,
            note_pattern,
            summary_pattern,
        } => {
            let outputs: Vec<String> = if files.is_empty() {
                match read_input(None) {
                    Ok(s) => vec![s],
                    Err(e) => fail(format!("failed to read stdin: {}", e)),
                }
            } else {
                files
                    .iter()
                    .map(|f| {
                        read_input(Some(f))
                            .unwrap_or_else(|e| fail(format!("failed to read {}: {}", f, e)))
                    })
                    .collect()
            };
            let cli_patterns = PatternsCfg {
                diagnostic: diagnostic_pattern,
                note: note_pattern,
                summary: summary_pattern,
            };
            let sample = outputs.join("\n");
            let eff = match config::resolve_effective(
                repo_root.as_deref(),
                preset.as_deref(),
                if debug { Some(true) } else { None },
                &cli_patterns,
                Some(&sample),
            ) {
                Ok(eff) => eff,
                Err(e) => fail(e),
            };
            if eff.parser.debug {
                match &eff.config_file {
                    Some(path) => eprintln!("{} Using {}", info_prefix(), path.display()),
                    None => eprintln!(
                        "{} No typecheck-parse.toml found; using defaults.",
                        note_prefix()
                    ),
                }
            }

            let labels: Vec<&str> = if files.is_empty() {
                vec!["<stdin>"]
            } else {
                files.iter().map(String::as_str).collect()
            };
            let (result, traces) = parse_combined(&eff.parser, &outputs);

            for (label, trace) in labels.iter().zip(&traces) {
                for entry in trace {
                    eprintln!("{} {}: {}", debug_prefix(), label, entry);
                }
            }
            for failure in &result.failures {
                let label = failure
                    .input
                    .and_then(|i| labels.get(i))
                    .copied()
                    .unwrap_or("<stdin>");
                eprintln!(
                    "{} {}: unparsed line {}: {}",
                    note_prefix(),
                    label,
                    failure.line_number,
                    failure.line.trim()
                );
            }
            if !result.standalone_notes.is_empty() {
                eprintln!(
                    "{} {} standalone note(s)",
                    info_prefix(),
                    result.standalone_notes.len()
                );
            }
            println!("{}", result.format_summary());
            if !result.is_clean() {
                std::process::exit(1);
            }
        }
        Commands::Detect { file } => {
            let sample = match read_input(file.as_deref()) {
                Ok(s) => s,
                Err(e) => fail(format!("failed to read sample: {}", e)),
            };
            let detected = ParserConfig::detect(&sample);
            let out = FileConfig {
                parser: Some(ParserCfg::from(&detected)),
                patterns: None,
            };
            match toml::to_string(&out) {
                Ok(s) => print!("{}", s),
                Err(e) => fail(e),
            }
        }
    }
}
