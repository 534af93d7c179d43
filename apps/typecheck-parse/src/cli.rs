//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "typecheck-parse",
    version,
    about = "Parse type checker output into structured results",
    long_about = "typecheck-parse reads the captured text output of a type checker run (mypy dialect) and\nclassifies every line as a diagnostic, a note, or a summary.\n\nConfiguration precedence: CLI > typecheck-parse.toml > defaults.",
    after_help = "Examples:\n  mypy src | typecheck-parse parse\n  typecheck-parse parse out-a.txt out-b.txt --preset detect\n  typecheck-parse detect out.txt > typecheck-parse.toml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current version.")]
    Version,
    /// Parse captured checker output
    #[command(
        about = "Parse checker output",
        long_about = "Parse one or more captured outputs (stdin when no file is given) and print the summary line. Exits 1 when errors were found.",
        after_help = "Examples:\n  typecheck-parse parse mypy.log\n  typecheck-parse parse --debug --preset minimal mypy.log"
    )]
    Parse {
        #[arg(help = "Files holding captured output (default: stdin)")]
        files: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Dialect preset: default|minimal|full|detect")]
        preset: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Trace how each line was classified")]
        debug: bool,
        #[arg(long, help = "Regex overriding the diagnostic matcher")]
        diagnostic_pattern: Option<String>,
        #[arg(long, help = "Regex overriding the note matcher")]
        note_pattern: Option<String>,
        #[arg(long, help = "Regex overriding the summary matcher")]
        summary_pattern: Option<String>,
    },
    /// Detect the output dialect
    #[command(
        about = "Detect output dialect",
        long_about = "Inspect a sample of checker output and print a matching [parser] section."
    )]
    Detect {
        #[arg(help = "File holding sample output (default: stdin)")]
        file: Option<String>,
    },
}
