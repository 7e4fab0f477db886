//! Tests for comment tokenization and name helpers.

use usc_common::comments::format_block_comment;
use usc_common::{CommentIndex, CommentKind, NameScope, SourceSpan, sanitize_synthetic_name};

#[test]
fn test_scan_line_and_block_comments() {
    let source = "// header\nvar x = 1; /* inline */\n";
    let index = CommentIndex::scan(source);

    assert_eq!(index.len(), 2);
    let header = &index.comments[0];
    assert_eq!(header.text, "// header");
    assert_eq!(header.kind, CommentKind::Line);
    assert_eq!(header.span, SourceSpan::new(1, 1, 1, 10));

    let inline = &index.comments[1];
    assert_eq!(inline.text, "/* inline */");
    assert_eq!(inline.kind, CommentKind::Block);
    assert_eq!(inline.span.line, 2);
    assert_eq!(inline.span.column, 12);
    assert_eq!(inline.span.end_column, 24);
}

#[test]
fn test_scan_skips_comment_markers_in_strings() {
    let source = "var url = \"http://example.com\"; var c = '/*';\n";
    let index = CommentIndex::scan(source);
    assert!(index.is_empty(), "unexpected comments: {:?}", index.comments);
}

#[test]
fn test_scan_multi_line_block_comment_span() {
    let source = "/* one\n   two */\nfoo();";
    let index = CommentIndex::scan(source);

    assert_eq!(index.len(), 1);
    let span = index.comments[0].span;
    assert_eq!(span.line, 1);
    assert_eq!(span.end_line, 2);
    assert_eq!(index.comments[0].text, "/* one\n   two */");
}

#[test]
fn test_scan_crlf_line_endings() {
    let source = "// a\r\n// b\r\n";
    let index = CommentIndex::scan(source);

    assert_eq!(index.len(), 2);
    assert_eq!(index.comments[0].text, "// a");
    assert_eq!(index.comments[1].text, "// b");
    assert_eq!(index.comments[1].span.line, 2);
}

#[test]
fn test_scan_unterminated_block_comment_runs_to_end() {
    let index = CommentIndex::scan("x; /* never closed");
    assert_eq!(index.len(), 1);
    assert_eq!(index.comments[0].text, "/* never closed");
}

#[test]
fn test_format_block_comment_reindents_continuation_lines() {
    let formatted = format_block_comment("/**\n     * doc\n     */", "    ");
    assert_eq!(formatted, "/**\n     * doc\n     */");
}

#[test]
fn test_sanitize_synthetic_names() {
    assert_eq!(sanitize_synthetic_name("$switch$1"), "switch1");
    assert_eq!(sanitize_synthetic_name("$temp$12"), "temp12");
    assert_eq!(sanitize_synthetic_name("$1"), "_1");
    assert_eq!(sanitize_synthetic_name("$"), "_");
}

#[test]
fn test_name_scope_unique_suffixes() {
    let mut scope = NameScope::new();
    scope.reserve("temp1");
    assert_eq!(scope.unique("temp1"), "temp1_1");
    assert_eq!(scope.unique("temp1"), "temp1_2");
    assert_eq!(scope.unique("other"), "other");
}
