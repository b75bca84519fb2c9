use std::sync::Arc;
use std::thread;

use tree_sitter_sifu::{
    language, tree_sitter_sifu, Language, Parser, Point, SyntaxErrorKind, Tree, LANGUAGE,
};

fn parse(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&LANGUAGE).unwrap();
    parser.parse(text).unwrap()
}

#[test]
fn rust_and_c_accessors_share_the_descriptor() {
    let from_c = unsafe { Language::from_raw(tree_sitter_sifu()) };
    assert!(std::ptr::eq(from_c, language()));
    assert!(std::ptr::eq(language(), &LANGUAGE));
    assert!(std::ptr::eq(parse("a").language(), language()));
}

#[test]
fn positions_track_rows_and_byte_columns() {
    let text = "Foo\n  bär -> Baz";
    let tree = parse(text);
    let root = tree.root_node();
    assert_eq!(root.start_position(), Point::new(0, 0));
    assert_eq!(root.end_position(), Point::new(1, 13));

    let newline = root.child(0).unwrap().child(1).unwrap().child(0).unwrap();
    assert_eq!(newline.kind(), "newline_expr");
    assert_eq!(newline.child(0).unwrap().kind(), "\n");
    assert!(!newline.child(0).unwrap().is_named());

    let right = newline.child_by_field_name("right").unwrap();
    let var = right.child(0).unwrap().child(0).unwrap();
    assert_eq!(var.kind(), "var");
    assert_eq!(var.utf8_text(text), "bär");
    assert_eq!(var.start_position(), Point::new(1, 2));
    assert_eq!(var.end_position(), Point::new(1, 6));
    assert_eq!(format!("{var:?}"), "{Node var (1, 2) - (1, 6)}");
}

#[test]
fn siblings_and_named_children() {
    let text = "(a b)";
    let tree = parse(text);
    let root = tree.root_node();
    let nested = root.child(0).unwrap().child(0).unwrap().child(0).unwrap();
    assert_eq!(nested.kind(), "nested_pattern");
    assert_eq!(nested.child_count(), 3);
    assert_eq!(nested.named_child_count(), 1);
    assert_eq!(nested.named_child(0).unwrap().kind(), "pattern");

    let open = nested.child(0).unwrap();
    assert_eq!(open.kind(), "(");
    assert!(open.prev_sibling().is_none());
    let pattern = open.next_sibling().unwrap();
    assert_eq!(pattern.utf8_text(text), "a b");
    assert_eq!(pattern.next_sibling().unwrap().kind(), ")");
    assert_eq!(pattern.prev_sibling(), Some(open));
    assert!(nested.child(3).is_none());
}

#[test]
fn cursor_visits_every_node_in_order() {
    let tree = parse("a -> b");
    let mut cursor = tree.walk();
    let mut kinds = Vec::new();
    let mut max_depth = 0;
    'walk: loop {
        kinds.push(cursor.node().kind());
        max_depth = max_depth.max(cursor.depth());
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    assert_eq!(
        kinds,
        [
            "source_file",
            "pattern",
            "term",
            "var",
            "term",
            "short_arrow",
            "->",
            "pattern",
            "term",
            "var",
        ]
    );
    assert_eq!(max_depth, 6);
    assert!(!cursor.goto_parent());
    assert_eq!(cursor.depth(), 0);
}

#[test]
fn cursor_reports_fields() {
    let tree = parse("x : y");
    let root = tree.root_node();
    let short_match = root.child(0).unwrap().child(1).unwrap().child(0).unwrap();
    let mut cursor = short_match.walk();
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), ":");
    assert_eq!(cursor.field_name(), None);
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.field_name(), Some("from"));
    assert!(!cursor.goto_next_sibling());
    assert!(cursor.goto_parent());
    assert_eq!(cursor.node(), short_match);
}

#[test]
fn syntax_errors_are_collected_in_order() {
    let text = "a ) b\n(c";
    let tree = parse(text);
    let errors = tree.syntax_errors(text);
    assert_eq!(errors.len(), 2);

    assert_eq!(errors[0].kind, SyntaxErrorKind::Unexpected(")".to_string()));
    assert_eq!(errors[0].bytes, 2..3);
    assert_eq!(errors[0].to_string(), "unexpected \")\" at 1:3");

    assert_eq!(errors[1].kind, SyntaxErrorKind::Missing(")"));
    assert_eq!(errors[1].bytes, 8..8);
    assert_eq!(errors[1].start, Point::new(1, 2));
    assert_eq!(errors[1].to_string(), "missing \")\" at 2:3");
}

#[test]
fn clean_input_has_no_errors() {
    let text = "Fib 0 -> 1\nFib n -> Add (Fib (Pred n)) (Fib (Pred (Pred n)))";
    let tree = parse(text);
    assert!(!tree.root_node().has_error());
    assert!(tree.syntax_errors(text).is_empty());
}

#[test]
fn unexpected_errors_carry_their_text() {
    let text = "a '' b";
    let errors = parse(text).syntax_errors(text);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, SyntaxErrorKind::Unexpected("''".to_string()));
    assert_eq!(errors[0].to_string(), "unexpected \"''\" at 1:3");
}

#[test]
fn trailing_newline_is_an_operand_free_newline_expr() {
    let tree = parse("a\n");
    let root = tree.root_node();
    assert_eq!(
        root.to_sexp(),
        "(source_file (pattern (term (var)) (term (newline_expr))))"
    );
    assert_eq!(root.end_position(), Point::new(1, 0));
    let newline = root.child(0).unwrap().child(1).unwrap().child(0).unwrap();
    assert!(newline.child_by_field_name("right").is_none());
    assert!(!root.has_error());
}

#[test]
fn deep_inputs_parse_on_a_default_thread_stack() {
    const DEPTH: usize = 100_000;

    let lines = thread::spawn(|| {
        let text = "a\n".repeat(DEPTH);
        let tree = parse(&text);
        let root = tree.root_node();
        assert!(!root.has_error());
        assert!(tree.syntax_errors(&text).is_empty());
        assert_eq!(root.end_position(), Point::new(DEPTH, 0));
        root.to_sexp().matches("(newline_expr").count()
    });
    assert_eq!(lines.join().unwrap(), DEPTH);

    let errors = thread::spawn(|| {
        let text = "(".repeat(DEPTH);
        let tree = parse(&text);
        assert!(tree.root_node().has_error());
        let sexp = tree.root_node().to_sexp();
        assert_eq!(sexp.matches("(nested_pattern").count(), DEPTH);
        tree.syntax_errors(&text)
    });
    let errors = errors.join().unwrap();
    assert_eq!(errors.len(), DEPTH);
    for error in &errors {
        assert_eq!(error.kind, SyntaxErrorKind::Missing(")"));
        assert_eq!(error.bytes, DEPTH..DEPTH);
    }
}

#[test]
fn comments_are_extras() {
    let text = "a # note";
    let tree = parse(text);
    let comment = tree.root_node().child(1).unwrap();
    assert!(comment.is_extra());
    assert!(comment.is_named());
    assert_eq!(comment.utf8_text(text), "# note");
    assert!(!tree.root_node().child(0).unwrap().is_extra());
}

#[test]
fn parsers_on_many_threads_share_one_language() {
    let sources: Arc<Vec<String>> =
        Arc::new((0..8).map(|i| format!("F{i} x -> x ; G {i}")).collect());
    let handles: Vec<_> = (0..sources.len())
        .map(|i| {
            let sources = Arc::clone(&sources);
            thread::spawn(move || {
                let mut parser = Parser::new();
                parser.set_language(language()).unwrap();
                let tree = parser.parse(&sources[i]).unwrap();
                assert!(std::ptr::eq(tree.language(), &LANGUAGE));
                tree.root_node().to_sexp()
            })
        })
        .collect();
    let results: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(results[0].starts_with("(source_file (pattern (term (key))"));
}

#[test]
fn tree_moves_across_threads() {
    let tree = parse("a , b");
    let sexp = thread::spawn(move || tree.root_node().to_sexp())
        .join()
        .unwrap();
    assert_eq!(
        sexp,
        "(source_file (pattern (term (var)) (term (comma_expr right: (pattern (term (var)))))))"
    );
}
