//! Tests for C# printing of expressions, statements and declarations.

use usc_ast::{
    BinaryOperator, Binding, Modifiers, NodeArena, NodeIndex, TreeBuilder, TypeDefKind,
    UnaryOperator, Visibility, well_known,
};
use usc_common::CommentIndex;
use usc_emitter::emitter::{escape_char, escape_string, format_float};
use usc_emitter::{EmitContext, NewLine, Printer, TranspileOptions};

fn print(arena: &NodeArena, idx: NodeIndex) -> String {
    print_with(arena, idx, TranspileOptions::default())
}

fn print_with(arena: &NodeArena, idx: NodeIndex, options: TranspileOptions) -> String {
    let comments = CommentIndex::new();
    let mut ctx = EmitContext::new("test.us", options);
    Printer::new(arena, &comments, &mut ctx).print_statement(idx)
}

fn print_expr(arena: &NodeArena, idx: NodeIndex) -> String {
    let comments = CommentIndex::new();
    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    Printer::new(arena, &comments, &mut ctx).print_expression(idx)
}

fn print_module(arena: &NodeArena, root: NodeIndex) -> String {
    let comments = CommentIndex::new();
    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    Printer::new(arena, &comments, &mut ctx).print_module(root)
}

fn call_stmt(b: &mut TreeBuilder, name: &str) -> NodeIndex {
    let target = b.method_ref(name, well_known::VOID, vec![]);
    let call = b.call(target, vec![]);
    b.expr_stmt(call)
}

fn ints(b: &mut TreeBuilder, names: &[&str]) -> Vec<NodeIndex> {
    names.iter().map(|n| b.local(*n, well_known::INT)).collect()
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_binary_precedence_parenthesizes_looser_operands() {
    let mut b = TreeBuilder::new("test.us");
    let v = ints(&mut b, &["a", "b", "c"]);
    let sum = b.binary(BinaryOperator::Add, v[0], v[1], well_known::INT);
    let product = b.binary(BinaryOperator::Multiply, sum, v[2], well_known::INT);
    let arena = b.finish(product).arena;

    assert_eq!(print_expr(&arena, product), "(a + b) * c");
}

#[test]
fn test_left_associative_operators() {
    let mut b = TreeBuilder::new("test.us");
    let v = ints(&mut b, &["a", "b", "c", "d", "e", "f"]);
    let left = b.binary(BinaryOperator::Subtract, v[0], v[1], well_known::INT);
    let chained = b.binary(BinaryOperator::Subtract, left, v[2], well_known::INT);
    let right = b.binary(BinaryOperator::Subtract, v[4], v[5], well_known::INT);
    let nested = b.binary(BinaryOperator::Subtract, v[3], right, well_known::INT);
    let arena = b.finish(chained).arena;

    assert_eq!(print_expr(&arena, chained), "a - b - c");
    assert_eq!(print_expr(&arena, nested), "d - (e - f)");
}

#[test]
fn test_assignment_is_right_associative() {
    let mut b = TreeBuilder::new("test.us");
    let v = ints(&mut b, &["a", "b", "c"]);
    let inner = b.assign(v[1], v[2]);
    let outer = b.assign(v[0], inner);
    let arena = b.finish(outer).arena;

    assert_eq!(print_expr(&arena, outer), "a = b = c");
}

#[test]
fn test_unary_operators() {
    let mut b = TreeBuilder::new("test.us");
    let x = b.local("x", well_known::INT);
    let neg = b.unary(UnaryOperator::UnaryNegation, x, well_known::INT);
    let double_neg = b.unary(UnaryOperator::UnaryNegation, neg, well_known::INT);
    let minus_five = b.int(-5);
    let neg_literal = b.unary(UnaryOperator::UnaryNegation, minus_five, well_known::INT);
    let y = b.local("y", well_known::INT);
    let post = b.unary(UnaryOperator::PostIncrement, y, well_known::INT);
    let p = b.local("p", well_known::BOOL);
    let q = b.local("q", well_known::BOOL);
    let both = b.and(p, q);
    let not_both = b.not(both);
    let arena = b.finish(double_neg).arena;

    assert_eq!(print_expr(&arena, double_neg), "-(-x)");
    assert_eq!(print_expr(&arena, neg_literal), "-(-5)");
    assert_eq!(print_expr(&arena, post), "y++");
    assert_eq!(print_expr(&arena, not_both), "!(p && q)");
}

#[test]
fn test_conditional_inside_binary_is_parenthesized() {
    let mut b = TreeBuilder::new("test.us");
    let c = b.local("c", well_known::BOOL);
    let one = b.int(1);
    let two = b.int(2);
    let choice = b.conditional(c, one, two);
    let three = b.int(3);
    let sum = b.binary(BinaryOperator::Add, choice, three, well_known::INT);
    let arena = b.finish(sum).arena;

    assert_eq!(print_expr(&arena, sum), "(c ? 1 : 2) + 3");
}

#[test]
fn test_cast_operand_is_parenthesized_when_looser() {
    let mut b = TreeBuilder::new("test.us");
    let v = ints(&mut b, &["a", "b"]);
    let sum = b.binary(BinaryOperator::Add, v[0], v[1], well_known::INT);
    let cast = b.cast(well_known::LONG, sum);
    let x = b.local("x", well_known::INT);
    let simple = b.cast(well_known::SHORT, x);
    let arena = b.finish(cast).arena;

    assert_eq!(print_expr(&arena, cast), "(long)(a + b)");
    assert_eq!(print_expr(&arena, simple), "(short)x");
}

#[test]
fn test_literal_suffixes() {
    let mut b = TreeBuilder::new("test.us");
    let long = b.int_typed(10, well_known::LONG);
    let unsigned = b.int_typed(7, well_known::UINT);
    let float = b.int_typed(2, well_known::FLOAT);
    let plain = b.int(42);
    let double = b.float(2.5);
    let text = b.string("say \"hi\"\n");
    let ch = b.char('\'');
    let yes = b.bool(true);
    let null = b.null();
    let arena = b.finish(plain).arena;

    assert_eq!(print_expr(&arena, long), "10L");
    assert_eq!(print_expr(&arena, unsigned), "7U");
    assert_eq!(print_expr(&arena, float), "2f");
    assert_eq!(print_expr(&arena, plain), "42");
    assert_eq!(print_expr(&arena, double), "2.5");
    assert_eq!(print_expr(&arena, text), "\"say \\\"hi\\\"\\n\"");
    assert_eq!(print_expr(&arena, ch), "'\\''");
    assert_eq!(print_expr(&arena, yes), "true");
    assert_eq!(print_expr(&arena, null), "null");
}

#[test]
fn test_float_formatting() {
    assert_eq!(format_float(1.0), "1.0");
    assert_eq!(format_float(0.25), "0.25");
    assert_eq!(format_float(1e20), "1e20");
    assert_eq!(format_float(f64::NAN), "double.NaN");
    assert_eq!(format_float(f64::INFINITY), "double.PositiveInfinity");
    assert_eq!(format_float(f64::NEG_INFINITY), "double.NegativeInfinity");
}

#[test]
fn test_escapes() {
    assert_eq!(escape_string("a\\b\tc"), "\"a\\\\b\\tc\"");
    assert_eq!(escape_string("\u{1}"), "\"\\u0001\"");
    assert_eq!(escape_char('\n'), "'\\n'");
    assert_eq!(escape_char('"'), "'\"'");
}

#[test]
fn test_array_creation() {
    let mut b = TreeBuilder::new("test.us");
    let int_array = b.types().array_of(well_known::INT, 1);
    let n = b.local("n", well_known::INT);
    let sized = b.new_array(int_array, vec![n]);

    let jagged = b.types().array_of(int_array, 2);
    let two = b.int(2);
    let three = b.int(3);
    let grid = b.new_array(jagged, vec![two, three]);

    let strings = b.types().array_of(well_known::STRING, 1);
    let first = b.string("a");
    let second = b.string("b");
    let listed = b.array_literal(strings, vec![first, second]);
    let empty = b.array_literal(strings, vec![]);
    let arena = b.finish(sized).arena;

    assert_eq!(print_expr(&arena, sized), "new int[n]");
    assert_eq!(print_expr(&arena, grid), "new int[2, 3][]");
    assert_eq!(print_expr(&arena, listed), "new string[] { \"a\", \"b\" }");
    assert_eq!(print_expr(&arena, empty), "new string[] {}");
}

#[test]
fn test_generic_call_member_and_element_access() {
    let mut b = TreeBuilder::new("test.us");
    let player = b.types().class("Player");
    let get = b.method_ref("GetComponent", player, vec![]);
    let call = b.generic_call(get, vec![], vec![player]);
    let this = b.this(player);
    let name = b.member(this, "name", Binding::field(well_known::STRING));
    let grid = b.local("grid", well_known::OBJECT);
    let v = ints(&mut b, &["i", "j"]);
    let cell = b.element(grid, v, well_known::INT);
    let default = b.default_value(player);
    let arena = b.finish(call).arena;

    assert_eq!(print_expr(&arena, call), "GetComponent<Player>()");
    assert_eq!(print_expr(&arena, name), "this.name");
    assert_eq!(print_expr(&arena, cell), "grid[i, j]");
    assert_eq!(print_expr(&arena, default), "default(Player)");
}

#[test]
fn test_closure_with_block_body() {
    let mut b = TreeBuilder::new("test.us");
    let ret = b.ret(NodeIndex::NONE);
    let body = b.block(vec![ret]);
    let closure = b.closure(vec![], well_known::VOID, body);
    let closure_ty = b.arena().type_of(closure);
    let run = b.method_ref("Run", well_known::VOID, vec![closure_ty]);
    let call = b.call(run, vec![closure]);
    let stmt = b.expr_stmt(call);
    let arena = b.finish(stmt).arena;

    assert_eq!(print(&arena, stmt), "Run(() => {\n    return;\n});\n");
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_else_if_chain_prints_inline() {
    let mut b = TreeBuilder::new("test.us");
    let a = b.local("a", well_known::BOOL);
    let c = b.local("c", well_known::BOOL);
    let first = call_stmt(&mut b, "A");
    let first = b.block(vec![first]);
    let second = call_stmt(&mut b, "B");
    let second = b.block(vec![second]);
    let last = call_stmt(&mut b, "C");
    let last = b.block(vec![last]);
    let inner = b.if_(c, second, last);
    let outer = b.if_(a, first, inner);
    let arena = b.finish(outer).arena;

    assert_eq!(
        print(&arena, outer),
        "if (a) {\n    A();\n} else if (c) {\n    B();\n} else {\n    C();\n}\n"
    );
}

#[test]
fn test_single_statement_branch_gets_braces() {
    let mut b = TreeBuilder::new("test.us");
    let a = b.local("a", well_known::BOOL);
    let ret = b.ret(NodeIndex::NONE);
    let stmt = b.if_(a, ret, NodeIndex::NONE);
    let arena = b.finish(stmt).arena;

    assert_eq!(print(&arena, stmt), "if (a) {\n    return;\n}\n");
}

#[test]
fn test_for_merges_declarators_of_same_type() {
    let mut b = TreeBuilder::new("test.us");
    let zero = b.int(0);
    let i = b.decl("i", well_known::INT, zero);
    let ten = b.int(10);
    let j = b.decl("j", well_known::INT, ten);
    let iv = b.local("i", well_known::INT);
    let jv = b.local("j", well_known::INT);
    let cond = b.binary(BinaryOperator::LessThan, iv, jv, well_known::BOOL);
    let iv = b.local("i", well_known::INT);
    let inc = b.unary(UnaryOperator::PostIncrement, iv, well_known::INT);
    let jv = b.local("j", well_known::INT);
    let dec = b.unary(UnaryOperator::PostDecrement, jv, well_known::INT);
    let body = b.block(vec![]);
    let stmt = b.for_(vec![i, j], cond, vec![inc, dec], body);
    let arena = b.finish(stmt).arena;

    assert_eq!(
        print(&arena, stmt),
        "for (int i = 0, j = 10; i < j; i++, j--) {\n}\n"
    );
}

#[test]
fn test_empty_for_header() {
    let mut b = TreeBuilder::new("test.us");
    let brk = b.brk();
    let body = b.block(vec![brk]);
    let stmt = b.for_(vec![], NodeIndex::NONE, vec![], body);
    let arena = b.finish(stmt).arena;

    assert_eq!(print(&arena, stmt), "for (;;) {\n    break;\n}\n");
}

#[test]
fn test_do_while_and_foreach() {
    let mut b = TreeBuilder::new("test.us");
    let a = call_stmt(&mut b, "A");
    let body = b.block(vec![a]);
    let x = b.local("x", well_known::BOOL);
    let looped = b.do_while(body, x);

    let list = b.types().array_of(well_known::INT, 1);
    let item = b.decl("item", well_known::INT, NodeIndex::NONE);
    let items = b.local("items", list);
    let cont = b.cont();
    let each_body = b.block(vec![cont]);
    let each = b.for_each(item, items, each_body);
    let arena = b.finish(looped).arena;

    assert_eq!(print(&arena, looped), "do {\n    A();\n} while (x);\n");
    assert_eq!(
        print(&arena, each),
        "foreach (int item in items) {\n    continue;\n}\n"
    );
}

#[test]
fn test_leftover_goto_is_printed_with_warning() {
    let mut b = TreeBuilder::new("test.us");
    let jump = b.goto("retry");
    let a = call_stmt(&mut b, "A");
    let label = b.label("retry");
    let block = b.block(vec![label, a, jump]);
    let arena = b.finish(block).arena;

    let comments = CommentIndex::new();
    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    let text = Printer::new(&arena, &comments, &mut ctx).print_statement(block);
    assert_eq!(text, "{\n    retry:\n    A();\n    goto retry;\n}\n");
    assert_eq!(ctx.diagnostics.warnings.len(), 1);
    assert!(ctx.diagnostics.warnings[0].message.contains("goto retry"));
}

#[test]
fn test_label_at_end_of_block_gets_empty_statement() {
    let mut b = TreeBuilder::new("test.us");
    let a = call_stmt(&mut b, "A");
    let label = b.label("done");
    let block = b.block(vec![a, label]);
    let arena = b.finish(block).arena;

    assert_eq!(print(&arena, block), "{\n    A();\n    done: ;\n}\n");
}

#[test]
fn test_switch_statement() {
    let mut b = TreeBuilder::new("test.us");
    let x = b.local("x", well_known::INT);
    let one = b.int(1);
    let a = call_stmt(&mut b, "A");
    let brk = b.brk();
    let case = b.section(vec![one], false, vec![a, brk]);
    let throw_target = b.types().class("System.Exception");
    let error = b.new_object(throw_target, vec![]);
    let throw = b.throw(error);
    let default = b.section(vec![], true, vec![throw]);
    let stmt = b.switch(x, vec![case, default]);
    let arena = b.finish(stmt).arena;

    assert_eq!(
        print(&arena, stmt),
        "switch (x) {\n\
         \x20   case 1:\n\
         \x20       A();\n\
         \x20       break;\n\
         \x20   default:\n\
         \x20       throw new System.Exception();\n\
         }\n"
    );
}

#[test]
fn test_unsupported_statement_is_skipped_and_reported() {
    let mut b = TreeBuilder::new("test.us");
    let odd = b.unsupported("yield");
    let odd = b.expr_stmt(odd);
    let a = call_stmt(&mut b, "A");
    let block = b.block(vec![odd, a]);
    let arena = b.finish(block).arena;

    let comments = CommentIndex::new();
    let mut ctx = EmitContext::new("test.us", TranspileOptions::default());
    let text = Printer::new(&arena, &comments, &mut ctx).print_statement(block);
    assert_eq!(text, "{\n    A();\n}\n");
    assert_eq!(ctx.diagnostics.unsupported.len(), 1);
    assert_eq!(ctx.diagnostics.unsupported[0].node_kind, "Unsupported");
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_usings_and_type_layout() {
    let mut b = TreeBuilder::new("test.us");
    b.import("System");
    b.import("UnityEngine");
    let x = b.field("x", well_known::INT, NodeIndex::NONE);
    let y = b.field("y", well_known::INT, NodeIndex::NONE);
    let three = b.int(3);
    let max = b.field_with(
        "Max",
        Visibility::Public,
        Modifiers::CONST | Modifiers::STATIC,
        well_known::INT,
        three,
    );
    let body = b.block(vec![]);
    let update = b.method_with(
        "Update",
        Visibility::Private,
        Modifiers::empty(),
        vec![],
        well_known::VOID,
        body,
    );
    let ctor_body = b.block(vec![]);
    let ctor = b.constructor("Player", vec![], ctor_body);
    let class = b.class("Player", vec![x, y, max, update, ctor]);
    let root = b.source_file(vec![class]);
    let arena = b.finish(root).arena;

    assert_eq!(
        print_module(&arena, root),
        "using System;\n\
         using UnityEngine;\n\
         \n\
         public class Player {\n\
         \x20   public int x;\n\
         \x20   public int y;\n\
         \x20   public const int Max = 3;\n\
         \n\
         \x20   private void Update() {\n\
         \x20   }\n\
         \n\
         \x20   public Player() {\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn test_abstract_method_without_body() {
    let mut b = TreeBuilder::new("test.us");
    let area = b.method_with(
        "Area",
        Visibility::Public,
        Modifiers::ABSTRACT,
        vec![],
        well_known::FLOAT,
        NodeIndex::NONE,
    );
    let arena = b.finish(area).arena;

    assert_eq!(print(&arena, area), "public abstract float Area();\n");
}

#[test]
fn test_enum_declaration() {
    let mut b = TreeBuilder::new("test.us");
    let color = b.types().enum_type("Color", &[("Red", 0), ("Green", 1)]);
    let zero = b.int(0);
    let red = b.field("Red", color, zero);
    let one = b.int(1);
    let green = b.field("Green", color, one);
    let def = b.type_def("Color", TypeDefKind::Enum, Visibility::Public, vec![red, green], color);
    let root = b.source_file(vec![def]);
    let arena = b.finish(root).arena;

    assert_eq!(
        print_module(&arena, root),
        "public enum Color {\n    Red = 0,\n    Green = 1,\n}\n"
    );
}

#[test]
fn test_members_are_separated_by_blank_lines() {
    let mut b = TreeBuilder::new("test.us");
    let first = b.class("First", vec![]);
    let second = b.class("Second", vec![]);
    let root = b.source_file(vec![first, second]);
    let arena = b.finish(root).arena;

    assert_eq!(
        print_module(&arena, root),
        "public class First {\n}\n\npublic class Second {\n}\n"
    );
}

#[test]
fn test_indent_and_newline_options() {
    let mut b = TreeBuilder::new("test.us");
    let a = call_stmt(&mut b, "A");
    let block = b.block(vec![a]);
    let arena = b.finish(block).arena;

    let options = TranspileOptions {
        indent_size: 2,
        new_line: NewLine::Crlf,
        ..TranspileOptions::default()
    };
    assert_eq!(print_with(&arena, block, options), "{\r\n  A();\r\n}\r\n");
}
