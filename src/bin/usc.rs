#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{IsTerminal, Write};

use usc::cli::args::CliArgs;
use usc::cli::config::resolve_config;
use usc::cli::driver::{self, EXIT_FATAL, TranspileResult};
use usc::cli::reporter::Reporter;
use usc::common::ModuleDiagnostics;

/// One line of `--diagnostics-json` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleDiagnosticsLine<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(flatten)]
    diagnostics: &'a ModuleDiagnostics,
}

fn main() -> Result<()> {
    // Only installs a subscriber when USC_LOG or RUST_LOG is set.
    usc::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    if args.list_files {
        return list_files(&args, &cwd);
    }

    let result = match driver::run(&args, &cwd) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    };

    write_generated_text(&result)?;

    if args.diagnostics_json {
        write_json_diagnostics(&result)?;
    } else {
        let color = !args.no_color && std::io::stderr().is_terminal();
        let reporter = Reporter::new(color);
        let output = reporter.render(&result);
        if !output.is_empty() {
            eprintln!("{output}");
        }
        if let Some(summary) = reporter.format_summary(&result) {
            eprintln!("\n{summary}");
        }
    }

    std::process::exit(result.exit_code());
}

fn list_files(args: &CliArgs, cwd: &std::path::Path) -> Result<()> {
    let config = resolve_config(args, cwd)?;
    for module in driver::discover_modules(&config.inputs)? {
        println!("{}", module.path.display());
    }
    Ok(())
}

/// Without `--out-dir` the generated C# goes to stdout, one module after
/// another in input order.
fn write_generated_text(result: &TranspileResult) -> Result<()> {
    let texts: Vec<_> = result
        .modules
        .iter()
        .filter_map(|m| m.text.as_deref().map(|text| (m, text)))
        .collect();
    if texts.is_empty() {
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let with_headers = texts.len() > 1;
    for (i, (module, text)) in texts.iter().enumerate() {
        if with_headers {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "// {}", module.file_name)?;
        }
        out.write_all(text.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn write_json_diagnostics(result: &TranspileResult) -> Result<()> {
    let stderr = std::io::stderr();
    let mut err = stderr.lock();
    for module in &result.modules {
        if module.error.is_none() && module.diagnostics.is_empty() {
            continue;
        }
        let line = ModuleDiagnosticsLine {
            file: &module.file_name,
            error: module.error.as_deref(),
            diagnostics: &module.diagnostics,
        };
        writeln!(err, "{}", serde_json::to_string(&line)?)?;
    }
    Ok(())
}
