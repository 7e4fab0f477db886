//! Batch driver: discover dumps, convert them in parallel, write `.cs` files.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use usc_ast::ResolvedModule;
use usc_common::ModuleDiagnostics;
use usc_emitter::{TranspileOptions, transpile_module};

use super::args::CliArgs;
use super::config::{ResolvedConfig, resolve_config};

/// Suffix of resolved-tree dumps written by the analyzer.
pub const DUMP_SUFFIX: &str = ".usc.json";

pub const EXIT_SUCCESS: i32 = 0;
/// Output was generated but some constructs or comments were reported.
pub const EXIT_DIAGNOSTICS: i32 = 1;
/// At least one module produced no output.
pub const EXIT_FATAL: i32 = 2;

/// One dump to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInput {
    pub path: PathBuf,
    /// Path relative to the input root, used to lay out the output tree.
    pub relative: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub input: PathBuf,
    /// Script file name recorded in the dump, or the input path when the
    /// dump could not be read.
    pub file_name: String,
    /// Generated text; `None` when the module failed.
    pub text: Option<String>,
    pub output_path: Option<PathBuf>,
    pub diagnostics: ModuleDiagnostics,
    pub error: Option<String>,
}

impl ModuleReport {
    fn failed(input: &ModuleInput, file_name: String, error: String) -> Self {
        ModuleReport {
            input: input.path.clone(),
            file_name,
            text: None,
            output_path: None,
            diagnostics: ModuleDiagnostics::default(),
            error: Some(error),
        }
    }
}

/// Outcome of a whole run, in input order.
#[derive(Debug, Default)]
pub struct TranspileResult {
    pub modules: Vec<ModuleReport>,
}

impl TranspileResult {
    pub fn failed_count(&self) -> usize {
        self.modules.iter().filter(|m| m.error.is_some()).count()
    }

    pub fn diagnostics_count(&self) -> usize {
        self.modules.iter().map(|m| m.diagnostics.len()).sum()
    }

    /// All diagnostics, module by module.
    pub fn merged_diagnostics(&self) -> ModuleDiagnostics {
        let mut merged = ModuleDiagnostics::default();
        for module in &self.modules {
            merged.merge(module.diagnostics.clone());
        }
        merged
    }

    pub fn emitted_files(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().filter_map(|m| m.output_path.as_deref())
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed_count() > 0 {
            EXIT_FATAL
        } else if self.diagnostics_count() > 0 {
            EXIT_DIAGNOSTICS
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Resolve configuration from `args` and convert every discovered module.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<TranspileResult> {
    let config = resolve_config(args, cwd)?;
    let inputs = discover_modules(&config.inputs)?;
    transpile_all(&inputs, &config, args.jobs)
}

/// Expand files and directories into the list of dumps, sorted within each
/// directory and deduplicated.
pub fn discover_modules(roots: &[PathBuf]) -> Result<Vec<ModuleInput>> {
    let mut seen = FxHashSet::default();
    let mut modules = Vec::new();

    for root in roots {
        if root.is_file() {
            let relative = root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| root.clone());
            if seen.insert(root.clone()) {
                modules.push(ModuleInput {
                    path: root.clone(),
                    relative,
                });
            }
            continue;
        }
        if !root.is_dir() {
            bail!("input not found: {}", root.display());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry =
                entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
            if !entry.file_type().is_file() || !is_dump(entry.path()) {
                continue;
            }
            let path = entry.path().to_path_buf();
            let relative = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| {
                path.file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| path.clone())
            });
            found.push(ModuleInput { path, relative });
        }
        found.sort_by(|a, b| a.relative.cmp(&b.relative));
        debug!(root = %root.display(), count = found.len(), "discovered dumps");
        for module in found {
            if seen.insert(module.path.clone()) {
                modules.push(module);
            }
        }
    }

    Ok(modules)
}

fn is_dump(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DUMP_SUFFIX) && name.len() > DUMP_SUFFIX.len())
}

/// `Scripts/Player.usc.json` becomes `Scripts/Player.cs`.
pub fn output_relative_path(relative: &Path) -> PathBuf {
    let file_name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = match file_name.strip_suffix(DUMP_SUFFIX) {
        Some(stem) => stem,
        None => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name),
    };
    relative.with_file_name(format!("{stem}.cs"))
}

/// Convert `inputs` on a pool of `jobs` threads. Module results keep the
/// order of `inputs`; one failing module never stops the others.
pub fn transpile_all(
    inputs: &[ModuleInput],
    config: &ResolvedConfig,
    jobs: Option<usize>,
) -> Result<TranspileResult> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build().context("failed to start worker threads")?;

    if let Some(out_dir) = &config.out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    }

    info!(modules = inputs.len(), "transpiling");
    let modules = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| transpile_one(input, &config.options, config.out_dir.as_deref()))
            .collect::<Vec<_>>()
    });

    Ok(TranspileResult { modules })
}

#[tracing::instrument(level = "debug", skip_all, fields(input = %input.path.display()))]
fn transpile_one(
    input: &ModuleInput,
    options: &TranspileOptions,
    out_dir: Option<&Path>,
) -> ModuleReport {
    let input_name = input.path.display().to_string();
    let mut module = match ResolvedModule::read(&input.path) {
        Ok(module) => module,
        Err(e) => {
            warn!(error = %e, "unreadable dump");
            return ModuleReport::failed(input, input_name, format!("failed to read dump: {e}"));
        }
    };

    let file_name = module.file_name.clone();
    let output = match transpile_module(&mut module, options) {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "module not converted");
            return ModuleReport::failed(input, file_name, e.to_string());
        }
    };

    let mut report = ModuleReport {
        input: input.path.clone(),
        file_name,
        text: None,
        output_path: None,
        diagnostics: output.diagnostics,
        error: None,
    };

    match out_dir {
        Some(out_dir) => {
            let path = out_dir.join(output_relative_path(&input.relative));
            match write_output(&path, &output.text) {
                Ok(()) => report.output_path = Some(path),
                Err(e) => report.error = Some(format!("{e:#}")),
            }
        }
        None => report.text = Some(output.text),
    }
    report
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote module");
    Ok(())
}
