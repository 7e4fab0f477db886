use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use usc_emitter::NewLine;

/// CLI arguments for the usc binary.
#[derive(Parser, Debug)]
#[command(
    name = "usc",
    version,
    about = "Converts resolved script dumps (*.usc.json) into C# source"
)]
pub struct CliArgs {
    /// Module dumps or directories to search for `*.usc.json` files.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Directory for generated `.cs` files; prints to stdout when absent.
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Path to a `usc.json` project file.
    #[arg(short = 'p', long, value_name = "FILE")]
    pub project: Option<PathBuf>,

    /// Convert modules even when the analyzer reported errors.
    #[arg(long = "best-effort")]
    pub best_effort: bool,

    /// Drop all source comments.
    #[arg(long = "remove-comments")]
    pub remove_comments: bool,

    /// Spaces per indentation level.
    #[arg(long = "indent", value_name = "N", value_parser = clap::value_parser!(u32).range(1..=16))]
    pub indent: Option<u32>,

    #[arg(long = "new-line", value_enum)]
    pub new_line: Option<NewLineArg>,

    /// Escape prepended to identifiers that are C# keywords.
    #[arg(long = "reserved-word-prefix", value_name = "PREFIX")]
    pub reserved_word_prefix: Option<String>,

    /// Worker threads; defaults to the number of CPUs.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Report diagnostics as JSON lines instead of text.
    #[arg(long = "diagnostics-json")]
    pub diagnostics_json: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the modules that would be converted and exit.
    #[arg(long = "list-files")]
    pub list_files: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum NewLineArg {
    Lf,
    Crlf,
}

impl From<NewLineArg> for NewLine {
    fn from(value: NewLineArg) -> Self {
        match value {
            NewLineArg::Lf => NewLine::Lf,
            NewLineArg::Crlf => NewLine::Crlf,
        }
    }
}
