//! Batch driver tests: discovery, parallel conversion, output layout.

use clap::Parser;
use std::path::{Path, PathBuf};

use usc::ast::{ResolvedModule, TreeBuilder, well_known};
use usc::cli::args::CliArgs;
use usc::cli::config::ResolvedConfig;
use usc::cli::driver::{
    EXIT_DIAGNOSTICS, EXIT_FATAL, EXIT_SUCCESS, discover_modules, output_relative_path, run,
    transpile_all,
};
use usc::emitter::TranspileOptions;

const PLAYER_CS: &str = "public class Player {\n    \
                         public void Move(long steps) {\n        \
                         int i = (int)steps;\n    \
                         }\n\
                         }\n";

fn player_module(errors: &[&str]) -> ResolvedModule {
    let mut b = TreeBuilder::new("Player.us");
    for error in errors {
        b.upstream_error(*error);
    }
    let steps = b.param_ref("steps", well_known::LONG);
    let decl = b.decl("i", well_known::INT, steps);
    let body = b.block(vec![decl]);
    let param = b.param("steps", well_known::LONG);
    let method = b.method("Move", vec![param], well_known::VOID, body);
    let class = b.class("Player", vec![method]);
    let root = b.source_file(vec![class]);
    b.finish(root)
}

fn odd_module() -> ResolvedModule {
    let mut b = TreeBuilder::new("Odd.us");
    let odd = b.unsupported("yield 1");
    let odd = b.expr_stmt(odd);
    let body = b.block(vec![odd]);
    let method = b.method("Run", vec![], well_known::VOID, body);
    let class = b.class("Odd", vec![method]);
    let root = b.source_file(vec![class]);
    b.finish(root)
}

fn write_dump(dir: &Path, relative: &str, module: &ResolvedModule) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dump directory");
    }
    let json = module.to_json().expect("serialize module");
    std::fs::write(&path, json).expect("write dump");
    path
}

fn config(inputs: Vec<PathBuf>, out_dir: Option<PathBuf>) -> ResolvedConfig {
    ResolvedConfig {
        options: TranspileOptions::default(),
        inputs,
        out_dir,
    }
}

#[test]
fn output_path_replaces_dump_suffix() {
    assert_eq!(
        output_relative_path(Path::new("Scripts/Player.usc.json")),
        PathBuf::from("Scripts/Player.cs")
    );
    assert_eq!(
        output_relative_path(Path::new("Enemy.json")),
        PathBuf::from("Enemy.cs")
    );
}

#[test]
fn discovery_walks_directories_in_order() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path().join("dumps");
    let player = player_module(&[]);
    write_dump(&root, "b/Zed.usc.json", &player);
    write_dump(&root, "a/Player.usc.json", &player);
    write_dump(&root, "Top.usc.json", &player);
    std::fs::write(root.join("notes.json"), "{}").expect("write stray file");
    std::fs::write(root.join("readme.txt"), "hi").expect("write stray file");

    let modules = discover_modules(&[root.clone()]).expect("discover");
    let relative: Vec<_> = modules.iter().map(|m| m.relative.clone()).collect();
    assert_eq!(
        relative,
        vec![
            PathBuf::from("Top.usc.json"),
            PathBuf::from("a/Player.usc.json"),
            PathBuf::from("b/Zed.usc.json"),
        ]
    );

    // The same file named twice is converted once.
    let explicit = root.join("Top.usc.json");
    let modules = discover_modules(&[explicit.clone(), root.clone()]).expect("discover");
    assert_eq!(modules.len(), 3);
    assert_eq!(modules[0].path, explicit);
}

#[test]
fn discovery_rejects_missing_inputs() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("nowhere");
    let err = discover_modules(&[missing]).expect_err("missing input must fail");
    assert!(err.to_string().contains("input not found"), "{err}");
}

#[test]
fn modules_are_written_under_out_dir() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dumps = temp.path().join("dumps");
    let out = temp.path().join("out");
    write_dump(&dumps, "Scripts/Player.usc.json", &player_module(&[]));

    let inputs = discover_modules(&[dumps.clone()]).expect("discover");
    let result = transpile_all(&inputs, &config(vec![dumps], Some(out.clone())), Some(2))
        .expect("transpile");

    assert_eq!(result.exit_code(), EXIT_SUCCESS);
    let written = out.join("Scripts/Player.cs");
    assert_eq!(result.emitted_files().collect::<Vec<_>>(), vec![written.as_path()]);
    let text = std::fs::read_to_string(&written).expect("read output");
    assert_eq!(text, PLAYER_CS);
    assert!(result.modules[0].text.is_none());
}

#[test]
fn without_out_dir_text_is_kept() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dump = write_dump(temp.path(), "Player.usc.json", &player_module(&[]));

    let inputs = discover_modules(&[dump.clone()]).expect("discover");
    let result = transpile_all(&inputs, &config(vec![dump], None), Some(1)).expect("transpile");

    assert_eq!(result.modules.len(), 1);
    assert_eq!(result.modules[0].text.as_deref(), Some(PLAYER_CS));
    assert_eq!(result.modules[0].file_name, "Player.us");
    assert_eq!(result.emitted_files().count(), 0);
}

#[test]
fn failing_module_does_not_stop_others() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dumps = temp.path().join("dumps");
    let out = temp.path().join("out");
    write_dump(&dumps, "A.usc.json", &player_module(&["A.us(1,1): bad"]));
    write_dump(&dumps, "B.usc.json", &player_module(&[]));
    std::fs::write(dumps.join("C.usc.json"), "{ not json").expect("write broken dump");

    let inputs = discover_modules(&[dumps.clone()]).expect("discover");
    let result =
        transpile_all(&inputs, &config(vec![dumps], Some(out.clone())), None).expect("transpile");

    assert_eq!(result.modules.len(), 3);
    assert_eq!(result.failed_count(), 2);
    assert_eq!(result.exit_code(), EXIT_FATAL);

    let upstream = result.modules[0].error.as_deref().unwrap_or_default();
    assert!(upstream.contains("upstream error"), "{upstream}");
    assert!(result.modules[1].error.is_none());
    assert!(out.join("B.cs").is_file());
    assert!(!out.join("A.cs").exists());
    let unreadable = result.modules[2].error.as_deref().unwrap_or_default();
    assert!(unreadable.starts_with("failed to read dump"), "{unreadable}");
}

#[test]
fn best_effort_converts_modules_with_upstream_errors() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dump = write_dump(temp.path(), "A.usc.json", &player_module(&["bad"]));

    let mut config = config(vec![dump.clone()], None);
    config.options.best_effort = true;
    let inputs = discover_modules(&[dump]).expect("discover");
    let result = transpile_all(&inputs, &config, Some(1)).expect("transpile");

    assert_eq!(result.failed_count(), 0);
    assert_eq!(result.exit_code(), EXIT_DIAGNOSTICS);
    assert_eq!(result.merged_diagnostics().warnings.len(), 1);
}

#[test]
fn unsupported_constructs_give_diagnostics_exit_code() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dumps = temp.path().join("dumps");
    write_dump(&dumps, "Odd.usc.json", &odd_module());
    write_dump(&dumps, "Player.usc.json", &player_module(&[]));

    let inputs = discover_modules(&[dumps.clone()]).expect("discover");
    let result = transpile_all(&inputs, &config(vec![dumps], None), None).expect("transpile");

    assert_eq!(result.exit_code(), EXIT_DIAGNOSTICS);
    let merged = result.merged_diagnostics();
    assert_eq!(merged.unsupported.len(), 1);
    assert_eq!(merged.unsupported[0].description, "yield 1");
    // Output is still produced for the module.
    let odd = result.modules[0].text.as_deref().unwrap_or_default();
    assert!(odd.contains("public void Run()"), "{odd}");
}

#[test]
fn run_applies_cli_flags() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_dump(temp.path(), "Player.usc.json", &player_module(&[]));

    let args = CliArgs::try_parse_from([
        "usc",
        "--indent",
        "2",
        "--out-dir",
        "cs",
        "Player.usc.json",
    ])
    .expect("args");
    let result = run(&args, temp.path()).expect("run");

    assert_eq!(result.exit_code(), EXIT_SUCCESS);
    let text = std::fs::read_to_string(temp.path().join("cs/Player.cs")).expect("read output");
    assert_eq!(
        text,
        "public class Player {\n  \
         public void Move(long steps) {\n    \
         int i = (int)steps;\n  \
         }\n\
         }\n"
    );
}

#[test]
fn run_without_inputs_or_project_fails() {
    let temp = tempfile::tempdir().expect("temp dir");
    let args = CliArgs::try_parse_from(["usc"]).expect("args");
    let err = run(&args, temp.path()).expect_err("nothing to do");
    assert!(err.to_string().contains("no inputs"), "{err}");
}
