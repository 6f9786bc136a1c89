//! Tree shapes produced by the parser, and how it behaves on bad input.

use rstest::rstest;
use tiny::{parse, NodeId, ParseTree, Reporter};

fn parse_ok(source: &str) -> (ParseTree, NodeId) {
    let mut reporter = Reporter::buffered();
    let parsed = parse(source, &mut reporter);
    assert_eq!(reporter.count(), 0, "unexpected errors: {:?}", reporter.diagnostics());
    parsed
}

fn label(tree: &ParseTree, id: NodeId) -> String {
    tree.label(id).unwrap_or_default()
}

fn child_labels(tree: &ParseTree, id: NodeId) -> Vec<String> {
    tree.children(id).iter().map(|child| label(tree, *child)).collect()
}

#[test]
fn test_assignment_precedence() {
    let (tree, root) = parse_ok("x := 3 + 4 * 2");

    assert_eq!(label(&tree, root), "assign(x)");
    assert_eq!(child_labels(&tree, root), vec!["op(+)"]);

    let plus = tree.children(root)[0];
    assert_eq!(child_labels(&tree, plus), vec!["const(3)", "op(*)"]);

    let times = tree.children(plus)[1];
    assert_eq!(child_labels(&tree, times), vec!["const(4)", "const(2)"]);
}

#[test]
fn test_if_without_else() {
    let (tree, root) = parse_ok("if x < 1 then write x end");

    assert_eq!(label(&tree, root), "if");
    assert_eq!(child_labels(&tree, root), vec!["op(<)", "write"]);

    let [cond, write] = tree.children(root) else {
        panic!("if should have two children");
    };
    assert_eq!(child_labels(&tree, *cond), vec!["id(x)", "const(1)"]);
    assert_eq!(child_labels(&tree, *write), vec!["id(x)"]);
}

#[test]
fn test_if_with_else() {
    let (tree, root) = parse_ok("if x = 0 then write 1 else write 2; write 3 end");

    assert_eq!(child_labels(&tree, root), vec!["op(=)", "write", "stmt_sequence"]);
    let else_branch = tree.children(root)[2];
    assert!(tree.is_sequence_wrapper(else_branch));
    assert_eq!(child_labels(&tree, else_branch), vec!["write", "write"]);
}

#[test]
fn test_repeat() {
    let (tree, root) = parse_ok("repeat x := x - 1; write x until x = 0");

    assert_eq!(label(&tree, root), "repeat");
    assert_eq!(child_labels(&tree, root), vec!["stmt_sequence", "op(=)"]);
    let body = tree.children(root)[0];
    assert_eq!(child_labels(&tree, body), vec!["assign(x)", "write"]);
}

#[test]
fn test_sequence_wrapping() {
    let (tree, root) = parse_ok("read x; write x");
    assert!(tree.is_sequence_wrapper(root));
    assert_eq!(label(&tree, root), "stmt_sequence");
    assert_eq!(child_labels(&tree, root), vec!["read(x)", "write"]);

    let (tree, root) = parse_ok("read x");
    assert_eq!(label(&tree, root), "read(x)");
    assert!(!tree.is_sequence_wrapper(root));
    assert!(tree.nodes().all(|node| !node.is_sequence_wrapper()));
}

#[test]
fn test_long_sequence_has_one_wrapper() {
    let (tree, root) = parse_ok("read a; read b; read c; read d");
    assert_eq!(
        child_labels(&tree, root),
        vec!["read(a)", "read(b)", "read(c)", "read(d)"]
    );
    assert_eq!(tree.nodes().filter(|node| node.is_sequence_wrapper()).count(), 1);
}

#[rstest]
#[case("write a - b - c", "op(-)", "op(-)", "id(c)")]
#[case("write a / b * c", "op(*)", "op(/)", "id(c)")]
#[case("write a + b * c", "op(+)", "id(a)", "op(*)")]
#[case("write (a + b) * c", "op(*)", "op(+)", "id(c)")]
fn test_operator_folding(
    #[case] source: &str,
    #[case] top: &str,
    #[case] left: &str,
    #[case] right: &str,
) {
    let (tree, root) = parse_ok(source);
    let expr = tree.children(root)[0];

    assert_eq!(label(&tree, expr), top);
    assert_eq!(child_labels(&tree, expr), vec![left, right]);
}

#[test]
fn test_parentheses_make_no_node() {
    let (tree, root) = parse_ok("write ((x))");
    assert_eq!(child_labels(&tree, root), vec!["id(x)"]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_node_ids_are_unique_and_single_parented() {
    let (tree, root) = parse_ok(
        "read x; if 0 < x then fact := 1; repeat fact := fact * x; x := x - 1 until x = 0; write fact end",
    );

    let reachable = tree.descendants(root);
    assert_eq!(reachable.len(), tree.len());

    let mut sorted = reachable.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), reachable.len());

    for id in reachable.iter().filter(|id| **id != root) {
        let parent = tree.parent(*id).expect("non-root node has a parent");
        assert_eq!(tree.children(parent).iter().filter(|c| *c == id).count(), 1);
    }
    assert_eq!(tree.parent(root), None);
}

#[test]
fn test_numbering_is_deterministic() {
    let source = "if a < b then write a else repeat b := b - 1 until b < a end";
    let mut reporter = Reporter::buffered();

    let first = parse(source, &mut reporter);
    let second = parse(source, &mut reporter);
    assert_eq!(first, second);
}

#[test]
fn test_chained_comparison_is_an_error() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("if a < b < c then write a end", &mut reporter);

    assert_eq!(label(&tree, root), "if");
    assert!(reporter.count() >= 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE expect then:1: Unexpected symbol."
    );
}

#[test]
fn test_missing_assign_operator() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("x 5", &mut reporter);

    // Parsing carries on as if `:=` had been there.
    assert_eq!(label(&tree, root), "assign(x)");
    assert_eq!(child_labels(&tree, root), vec!["const(5)"]);
    assert_eq!(reporter.count(), 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE expect :=:1: Unexpected symbol."
    );
}

#[test]
fn test_missing_end_reports_last_line() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("if x then\n  write x\n", &mut reporter);

    assert_eq!(child_labels(&tree, root), vec!["id(x)", "write"]);
    assert_eq!(reporter.count(), 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE expect end:3: Unexpected symbol."
    );
}

#[test]
fn test_read_without_identifier() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("read 5", &mut reporter);

    assert_eq!(label(&tree, root), "read(5)");
    assert_eq!(reporter.count(), 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE expect id:1: Unexpected symbol."
    );
}

#[test]
fn test_empty_input_yields_error_root() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("", &mut reporter);

    assert_eq!(label(&tree, root), "error");
    assert_eq!(tree.len(), 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE statement:1: Unexpected symbol."
    );
}

#[test]
fn test_trailing_semicolon_gets_placeholder_statement() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("read x;", &mut reporter);

    assert_eq!(child_labels(&tree, root), vec!["read(x)", "error"]);
    assert_eq!(reporter.count(), 1);
}

#[test]
fn test_lexical_errors_reach_the_same_reporter() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("x : = 1", &mut reporter);

    // `:` followed by a blank is illegal; the `=` that follows is then just
    // an EQUAL token, which cannot start a factor.
    assert_eq!(label(&tree, root), "assign(x)");
    let messages: Vec<String> = reporter.diagnostics().iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "ERROR @ LINE 1: Illegal character after `:`",
            "ERROR @ LINE expect :=:1: Unexpected symbol.",
            "ERROR @ LINE factor:1: Unexpected symbol.",
        ]
    );
}

#[test]
fn test_trailing_tokens_are_ignored() {
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse("read x write x", &mut reporter);

    assert_eq!(label(&tree, root), "read(x)");
    assert_eq!(tree.len(), 1);
    assert_eq!(reporter.count(), 0);
}

#[test]
fn test_subtree_extraction() {
    let (tree, root) = parse_ok("read x; write x + 1");
    let write = tree.children(root)[1];

    let sub = tree.subtree(write).unwrap();
    assert_eq!(sub.root(), Some(write));
    assert_eq!(sub.len(), 4);
    assert_eq!(sub.to_string(), "write\n  op(+)\n    id(x)\n    const(1)\n");
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 10_000;
    let source = format!("write {}x{}", "(".repeat(depth), ")".repeat(depth));
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse(&source, &mut reporter);

    assert_eq!(tree.root(), Some(root));
    assert_eq!(label(&tree, root), "write");
    assert_eq!(child_labels(&tree, root), vec!["error"]);
    assert_eq!(reporter.count(), 1);
    assert_eq!(
        reporter.diagnostics()[0].to_string(),
        "ERROR @ LINE 1: Nesting too deep (limit 256)."
    );
}

#[test]
fn test_deeply_nested_statements() {
    let depth = 10_000;
    let source = format!(
        "{}write x{}",
        "if x then repeat ".repeat(depth),
        " until x end".repeat(depth)
    );
    let mut reporter = Reporter::buffered();
    let (tree, root) = parse(&source, &mut reporter);

    assert_eq!(label(&tree, root), "if");
    assert_eq!(reporter.count(), 1);
    assert_eq!(tree.descendants(root).len(), tree.len());
    assert_eq!(tree.nodes().filter(|node| node.label() == "error").count(), 1);
}

#[test]
fn test_nesting_within_limit_is_accepted() {
    let depth = 200;
    let source = format!("write {}x{}", "(".repeat(depth), ")".repeat(depth));
    let (tree, root) = parse_ok(&source);

    assert_eq!(child_labels(&tree, root), vec!["id(x)"]);
}

#[test]
fn test_long_flat_sequence() {
    let count = 100_000;
    let source = vec!["read x"; count].join(";\n");
    let (tree, root) = parse_ok(&source);

    assert!(tree.is_sequence_wrapper(root));
    assert_eq!(tree.children(root).len(), count);
    assert_eq!(tree.len(), count + 1);

    let last = tree.children(root)[count - 1];
    assert_eq!(label(&tree, last), "read(x)");
    assert_eq!(tree.to_string().lines().count(), count + 1);
}
