//! End-to-end tests for `transpile_module`.

use usc_ast::{NodeIndex, ResolvedModule, TreeBuilder, TypeDefKind, Visibility, well_known};
use usc_common::SourceSpan;
use usc_emitter::{PipelineError, TranspileOptions, transpile_module};

const PLAYER_SOURCE: &[&str] = &[
    "class Player {",
    "    // Moves the player",
    "    def Move(steps as long, target as Foo):",
    "        i as int = steps",
    "        if target:",
    "            Go(i)",
    "    end",
    "}",
];

/// A module exercising comments, casts and boolean coercion.
fn player_module(errors: &[&str]) -> ResolvedModule {
    let mut source = PLAYER_SOURCE.join("\n");
    source.push('\n');
    let mut b = TreeBuilder::new("Player.us").with_source(source);
    for error in errors {
        b.upstream_error(*error);
    }
    b.import("UnityEngine");
    let foo = b.types().class("Foo");

    let steps = b.param_ref("steps", well_known::LONG);
    let decl = b.decl("i", well_known::INT, steps);
    b.at_line(decl, 4, 9, 25);

    let target = b.param_ref("target", foo);
    let go = b.method_ref("Go", well_known::VOID, vec![well_known::INT]);
    let i = b.local("i", well_known::INT);
    let call = b.call(go, vec![i]);
    let call = b.expr_stmt(call);
    b.at_line(call, 6, 13, 18);
    let then_branch = b.block(vec![call]);
    let branch = b.if_(target, then_branch, NodeIndex::NONE);
    b.at(branch, SourceSpan::new(5, 9, 6, 18));

    let body = b.block(vec![decl, branch]);
    let steps_param = b.param("steps", well_known::LONG);
    let target_param = b.param("target", foo);
    let method = b.method("Move", vec![steps_param, target_param], well_known::VOID, body);
    b.at(method, SourceSpan::new(3, 5, 7, 8));
    let class = b.class("Player", vec![method]);
    b.at(class, SourceSpan::new(1, 1, 8, 2));
    let root = b.source_file(vec![class]);
    b.finish(root)
}

#[test]
fn test_module_is_transformed_and_printed() {
    let mut module = player_module(&[]);
    let output = match transpile_module(&mut module, &TranspileOptions::default()) {
        Ok(output) => output,
        Err(e) => panic!("transpile failed: {e}"),
    };

    assert_eq!(
        output.text,
        "using UnityEngine;\n\
         \n\
         public class Player {\n\
         \x20   // Moves the player\n\
         \x20   public void Move(long steps, Foo target) {\n\
         \x20       int i = (int)steps;\n\
         \x20       if (target != null) {\n\
         \x20           Go(i);\n\
         \x20       }\n\
         \x20   }\n\
         }\n"
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
}

#[test]
fn test_upstream_errors_stop_the_module() {
    let mut module = player_module(&["Player.us(4,9): unknown name 'x'", "second"]);
    let result = transpile_module(&mut module, &TranspileOptions::default());

    match result {
        Err(PipelineError::UpstreamErrors { file, count, first }) => {
            assert_eq!(file, "Player.us");
            assert_eq!(count, 2);
            assert_eq!(first, "Player.us(4,9): unknown name 'x'");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[test]
fn test_best_effort_turns_upstream_errors_into_warnings() {
    let mut module = player_module(&["broken"]);
    let options = TranspileOptions {
        best_effort: true,
        ..TranspileOptions::default()
    };
    let output = match transpile_module(&mut module, &options) {
        Ok(output) => output,
        Err(e) => panic!("transpile failed: {e}"),
    };

    assert_eq!(output.diagnostics.warnings.len(), 1);
    assert_eq!(output.diagnostics.warnings[0].message, "upstream error: broken");
    assert!(output.text.contains("int i = (int)steps;"));
}

#[test]
fn test_remove_comments_drops_all_comments() {
    let mut module = player_module(&[]);
    let options = TranspileOptions {
        remove_comments: true,
        ..TranspileOptions::default()
    };
    let output = match transpile_module(&mut module, &options) {
        Ok(output) => output,
        Err(e) => panic!("transpile failed: {e}"),
    };

    assert!(!output.text.contains("//"), "{}", output.text);
    assert!(output.diagnostics.orphan_comments.is_empty());
}

#[test]
fn test_missing_root_is_rejected() {
    let b = TreeBuilder::new("Empty.us");
    let mut module = b.finish(NodeIndex::NONE);
    let result = transpile_module(&mut module, &TranspileOptions::default());
    assert!(matches!(result, Err(PipelineError::InvalidRoot { .. })));
}

#[test]
fn test_private_top_level_type_and_reserved_name() {
    let mut b = TreeBuilder::new("Hidden.us");
    let ty = b.types().class("Hidden");
    let field = b.field("object", well_known::INT, NodeIndex::NONE);
    let def = b.type_def("Hidden", TypeDefKind::Class, Visibility::Private, vec![field], ty);
    let root = b.source_file(vec![def]);
    let mut module = b.finish(root);

    let output = match transpile_module(&mut module, &TranspileOptions::default()) {
        Ok(output) => output,
        Err(e) => panic!("transpile failed: {e}"),
    };
    assert_eq!(
        output.text,
        "internal class Hidden {\n    public int @object;\n}\n"
    );
}

#[test]
fn test_unsupported_construct_is_reported_not_printed() {
    let mut b = TreeBuilder::new("Odd.us");
    let odd = b.unsupported("yield 1");
    let odd = b.expr_stmt(odd);
    b.at_line(odd, 3, 9, 16);
    let body = b.block(vec![odd]);
    let method = b.method("Run", vec![], well_known::VOID, body);
    let class = b.class("Odd", vec![method]);
    let root = b.source_file(vec![class]);
    let mut module = b.finish(root);

    let output = match transpile_module(&mut module, &TranspileOptions::default()) {
        Ok(output) => output,
        Err(e) => panic!("transpile failed: {e}"),
    };
    assert!(!output.text.contains("yield"));
    assert_eq!(output.diagnostics.unsupported.len(), 1);
    assert_eq!(output.diagnostics.unsupported[0].description, "yield 1");
}

#[test]
fn test_options_deserialize_from_camel_case() {
    let options: TranspileOptions = match serde_json::from_str(
        r#"{ "bestEffort": true, "indentSize": 2, "newLine": "crlf" }"#,
    ) {
        Ok(options) => options,
        Err(e) => panic!("bad options: {e}"),
    };
    assert!(options.best_effort);
    assert!(!options.remove_comments);
    assert_eq!(options.indent_size, 2);
    assert_eq!(options.new_line, usc_emitter::NewLine::Crlf);
    assert_eq!(options.reserved_word_prefix, "@");
}
