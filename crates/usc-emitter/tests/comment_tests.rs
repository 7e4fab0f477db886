//! Tests for comment attachment and printing of attached comments.

use usc_ast::{AttachedComment, BinaryOperator, NodeArena, NodeIndex, TreeBuilder, UnaryOperator, well_known};
use usc_common::{AnchorSide, CommentIndex, SourceSpan};
use usc_emitter::{EmitContext, Printer, TranspileOptions, attach_comments};

fn source(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn call_stmt(b: &mut TreeBuilder, name: &str) -> (NodeIndex, NodeIndex) {
    let target = b.method_ref(name, well_known::VOID, vec![]);
    let call = b.call(target, vec![]);
    (b.expr_stmt(call), call)
}

fn print_module(arena: &NodeArena, root: NodeIndex, comments: &CommentIndex) -> String {
    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    Printer::new(arena, comments, &mut ctx).print_module(root)
}

fn anchors(arena: &NodeArena, idx: NodeIndex) -> Vec<AnchorSide> {
    arena
        .get(idx)
        .map(|n| n.comments.iter().map(|c| c.anchor).collect())
        .unwrap_or_default()
}

#[test]
fn test_comments_around_statements() {
    let text = source(&[
        "class Program {",
        "    // Runs the thing",
        "    void Run() {",
        "        int a = 1; // first",
        "        /* lead */ Go();",
        "        // dangling",
        "    }",
        "}",
    ]);
    let comments = CommentIndex::scan(&text);
    assert_eq!(comments.len(), 4);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let one = b.int(1);
    let decl = b.decl("a", well_known::INT, one);
    b.at_line(decl, 4, 9, 19);
    let (go, _) = call_stmt(&mut b, "Go");
    b.at_line(go, 5, 20, 25);
    let body = b.block(vec![decl, go]);
    let run = b.method("Run", vec![], well_known::VOID, body);
    b.at(run, SourceSpan::new(3, 5, 7, 6));
    let class = b.class("Program", vec![run]);
    b.at(class, SourceSpan::new(1, 1, 8, 2));
    let root = b.source_file(vec![class]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 4);
    assert!(ctx.diagnostics.orphan_comments.is_empty());
    assert_eq!(anchors(&arena, run), vec![AnchorSide::Above]);
    assert_eq!(anchors(&arena, decl), vec![AnchorSide::Right]);
    assert_eq!(anchors(&arena, go), vec![AnchorSide::Left, AnchorSide::Trailing]);

    assert_eq!(
        print_module(&arena, root, &comments),
        "public class Program {\n\
         \x20   // Runs the thing\n\
         \x20   public void Run() {\n\
         \x20       int a = 1; // first\n\
         \x20       /* lead */ Go();\n\
         \x20       // dangling\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn test_equal_distance_keeps_outermost_node() {
    let text = source(&["Go(); // why"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let (go, call) = call_stmt(&mut b, "Go");
    b.at_line(go, 1, 1, 6);
    b.at_line(call, 1, 1, 6);
    let root = b.block(vec![go]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 1);
    assert_eq!(anchors(&arena, go), vec![AnchorSide::Right]);
    assert!(anchors(&arena, call).is_empty());

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    let printed = Printer::new(&arena, &comments, &mut ctx).print_statement(go);
    assert_eq!(printed, "Go(); // why\n");
}

#[test]
fn test_closer_node_wins_same_line_comment() {
    let text = source(&["    x = y; /* c */"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let x = b.local("x", well_known::INT);
    let y = b.local("y", well_known::INT);
    b.at_line(y, 1, 9, 10);
    let assign = b.assign(x, y);
    b.at_line(assign, 1, 5, 10);
    let stmt = b.expr_stmt(assign);
    b.at_line(stmt, 1, 5, 11);
    let root = b.block(vec![stmt]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    attach_comments(&mut arena, root, &comments, &mut ctx);
    // The statement ends right before the comment; the expressions end one
    // column earlier.
    assert_eq!(anchors(&arena, stmt), vec![AnchorSide::Right]);
    assert!(anchors(&arena, assign).is_empty());
    assert!(anchors(&arena, y).is_empty());
}

#[test]
fn test_block_comment_is_reindented() {
    let text = source(&[
        "class Program {",
        "        /*",
        "          * Doc",
        "          */",
        "    void Run() {",
        "    }",
        "}",
    ]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let body = b.block(vec![]);
    let run = b.method("Run", vec![], well_known::VOID, body);
    b.at(run, SourceSpan::new(5, 5, 6, 6));
    let class = b.class("Program", vec![run]);
    b.at(class, SourceSpan::new(1, 1, 7, 2));
    let root = b.source_file(vec![class]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 1);
    assert_eq!(
        print_module(&arena, root, &comments),
        "public class Program {\n\
         \x20   /*\n\
         \x20    * Doc\n\
         \x20    */\n\
         \x20   public void Run() {\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn test_comment_without_positioned_nodes_is_orphan() {
    let text = source(&["// lost"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let decl = b.decl("a", well_known::INT, NodeIndex::NONE);
    let root = b.block(vec![decl]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 0);
    assert_eq!(ctx.diagnostics.orphan_comments.len(), 1);
    let orphan = &ctx.diagnostics.orphan_comments[0];
    assert_eq!(orphan.text, "// lost");
    assert_eq!(orphan.position.line, 1);

    // Orphans are reported, never printed.
    assert_eq!(print_module(&arena, root, &comments), "{\n    int a;\n}\n");
}

#[test]
fn test_comment_outside_module_span_is_orphan() {
    let text = source(&["int a;", "", "", "// far away"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let decl = b.decl("a", well_known::INT, NodeIndex::NONE);
    b.at_line(decl, 1, 1, 7);
    let root = b.source_file(vec![decl]);
    b.at(root, SourceSpan::new(1, 1, 2, 1));
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 0);
    assert_eq!(ctx.diagnostics.orphan_comments.len(), 1);
    assert_eq!(ctx.diagnostics.orphan_comments[0].position.line, 4);
}

#[test]
fn test_comment_after_last_member_trails_it() {
    let text = source(&["int a;", "// closing remark"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let decl = b.decl("a", well_known::INT, NodeIndex::NONE);
    b.at_line(decl, 1, 1, 7);
    let root = b.source_file(vec![decl]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 1);
    assert_eq!(anchors(&arena, decl), vec![AnchorSide::Trailing]);
    assert_eq!(
        print_module(&arena, root, &comments),
        "int a;\n// closing remark\n"
    );
}

#[test]
fn test_loop_header_declarations_keep_comments() {
    let text = source(&[
        "for (int i = 0; // start",
        "     i < n; i++) { }",
        "foreach (/* each */ string s in names) { }",
    ]);
    let comments = CommentIndex::scan(&text);
    assert_eq!(comments.len(), 2);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let zero = b.int(0);
    let init = b.decl("i", well_known::INT, zero);
    let i = b.local("i", well_known::INT);
    let n = b.local("n", well_known::INT);
    let condition = b.binary(BinaryOperator::LessThan, i, n, well_known::BOOL);
    let i = b.local("i", well_known::INT);
    let step = b.unary(UnaryOperator::PostIncrement, i, well_known::INT);
    let body = b.block(vec![]);
    let counted = b.for_(vec![init], condition, vec![step], body);

    let variable = b.decl("s", well_known::STRING, NodeIndex::NONE);
    let names = b.local("names", well_known::OBJECT);
    let body = b.block(vec![]);
    let each = b.for_each(variable, names, body);
    let root = b.block(vec![counted, each]);
    let mut arena = b.finish(root).arena;

    for (idx, comment, anchor) in [(init, 0, AnchorSide::Right), (variable, 1, AnchorSide::Left)] {
        if let Some(node) = arena.get_mut(idx) {
            node.comments.push(AttachedComment { comment, anchor });
        }
    }

    let printed = print_module(&arena, root, &comments);
    let header = printed
        .lines()
        .find(|line| line.contains("for ("))
        .unwrap_or_default();
    assert!(header.contains("for (int i = 0; i < n; i++)"), "{printed}");
    assert!(header.ends_with("// start"), "{printed}");
    assert!(printed.contains("foreach (/* each */ string s in names)"), "{printed}");
}

#[test]
fn test_comment_between_lines_of_a_call_stays_inside_it() {
    let text = source(&["Call(", "    // first", "    a,", "    b);", "Go();"]);
    let comments = CommentIndex::scan(&text);

    let mut b = TreeBuilder::new("test.us").with_source(text.clone());
    let target = b.method_ref("Call", well_known::VOID, vec![well_known::INT, well_known::INT]);
    let a = b.local("a", well_known::INT);
    b.at_line(a, 3, 5, 6);
    let second = b.local("b", well_known::INT);
    b.at_line(second, 4, 5, 6);
    let call = b.call(target, vec![a, second]);
    b.at(call, SourceSpan::new(1, 1, 4, 7));
    let stmt = b.expr_stmt(call);
    b.at(stmt, SourceSpan::new(1, 1, 4, 8));
    let (go, _) = call_stmt(&mut b, "Go");
    b.at_line(go, 5, 1, 6);
    let root = b.block(vec![stmt, go]);
    let mut arena = b.finish(root).arena;

    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    assert_eq!(attach_comments(&mut arena, root, &comments, &mut ctx), 1);
    assert_eq!(anchors(&arena, a), vec![AnchorSide::Above]);
    assert!(anchors(&arena, go).is_empty());
    assert_eq!(
        print_module(&arena, root, &comments),
        "{\n    Call(\n    // first\n    a, b);\n    Go();\n}\n"
    );
}
