//! `usc.json` parsing and merging with command-line flags.

use clap::Parser;
use std::path::PathBuf;

use usc::cli::args::CliArgs;
use usc::cli::config::{parse_project_config, resolve_config, resolve_transpile_options};
use usc::emitter::{NewLine, TranspileOptions};

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create directory");
    }
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn parses_project_file_with_comments() {
    let config = parse_project_config(
        r#"{
            // Converter settings
            "transpilerOptions": {
                "bestEffort": "true",
                "removeComments": false,
                "indentSize": 2,
                "newLine": "crlf",
                "reservedWordPrefix": "_",
            },
            /* inputs */
            "include": ["Scripts", "Extra.usc.json"],
            "outDir": "Generated",
        }"#,
    )
    .expect("config should parse");

    let options = resolve_transpile_options(config.transpiler_options.as_ref())
        .expect("options should resolve");
    assert_eq!(
        options,
        TranspileOptions {
            best_effort: true,
            remove_comments: false,
            indent_size: 2,
            new_line: NewLine::Crlf,
            reserved_word_prefix: "_".to_string(),
        }
    );
    assert_eq!(
        config.include,
        Some(vec!["Scripts".to_string(), "Extra.usc.json".to_string()])
    );
    assert_eq!(config.out_dir.as_deref(), Some("Generated"));
}

#[test]
fn missing_options_use_defaults() {
    let config = parse_project_config("{}").expect("empty config should parse");
    let options = resolve_transpile_options(config.transpiler_options.as_ref())
        .expect("options should resolve");
    assert_eq!(options, TranspileOptions::default());
}

#[test]
fn rejects_bad_values() {
    let config = parse_project_config(r#"{"transpilerOptions": {"indentSize": 0}}"#)
        .expect("config should parse");
    assert!(resolve_transpile_options(config.transpiler_options.as_ref()).is_err());

    let config = parse_project_config(r#"{"transpilerOptions": {"reservedWordPrefix": "-"}}"#)
        .expect("config should parse");
    assert!(resolve_transpile_options(config.transpiler_options.as_ref()).is_err());

    assert!(parse_project_config(r#"{"transpilerOptions": {"newLine": "cr"}}"#).is_err());
    assert!(parse_project_config(r#"{"transpilerOptions": {"bestEffort": "perhaps"}}"#).is_err());
}

#[test]
fn project_in_working_directory_is_found() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_file(
        temp.path(),
        "usc.json",
        r#"{ "include": ["dumps"], "outDir": "cs", "transpilerOptions": { "removeComments": true } }"#,
    );

    let args = CliArgs::try_parse_from(["usc"]).expect("args");
    let resolved = resolve_config(&args, temp.path()).expect("config");

    assert_eq!(resolved.inputs, vec![temp.path().join("dumps")]);
    assert_eq!(resolved.out_dir, Some(temp.path().join("cs")));
    assert!(resolved.options.remove_comments);
}

#[test]
fn paths_are_relative_to_project_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_file(
        temp.path(),
        "game/usc.json",
        r#"{ "include": ["dumps"], "outDir": "cs" }"#,
    );

    let args = CliArgs::try_parse_from(["usc", "--project", "game"]).expect("args");
    let resolved = resolve_config(&args, temp.path()).expect("config");

    let game = temp.path().join("game");
    assert_eq!(resolved.inputs, vec![game.join("dumps")]);
    assert_eq!(resolved.out_dir, Some(game.join("cs")));
}

#[test]
fn flags_override_project_values() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_file(
        temp.path(),
        "usc.json",
        r#"{
            "include": ["dumps"],
            "outDir": "cs",
            "transpilerOptions": { "indentSize": 8, "newLine": "crlf", "bestEffort": false }
        }"#,
    );

    let args = CliArgs::try_parse_from([
        "usc",
        "-p",
        "usc.json",
        "--indent",
        "3",
        "--new-line",
        "lf",
        "--best-effort",
        "--out-dir",
        "elsewhere",
        "One.usc.json",
    ])
    .expect("args");
    let resolved = resolve_config(&args, temp.path()).expect("config");

    assert_eq!(resolved.options.indent_size, 3);
    assert_eq!(resolved.options.new_line, NewLine::Lf);
    assert!(resolved.options.best_effort);
    assert_eq!(resolved.out_dir, Some(temp.path().join("elsewhere")));
    // Explicit inputs replace the project's include list.
    assert_eq!(resolved.inputs, vec![temp.path().join("One.usc.json")]);
}

#[test]
fn project_without_inputs_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_file(temp.path(), "usc.json", "{}");

    let args = CliArgs::try_parse_from(["usc"]).expect("args");
    let err = resolve_config(&args, temp.path()).expect_err("no inputs");
    assert!(err.to_string().contains("lists no inputs"), "{err}");
}

#[test]
fn unreadable_project_file_reports_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let args = CliArgs::try_parse_from(["usc", "-p", "missing.json", "x.usc.json"]).expect("args");
    let err = resolve_config(&args, temp.path()).expect_err("missing project");
    assert!(format!("{err:#}").contains("missing.json"), "{err:#}");
}
