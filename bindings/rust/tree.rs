//! Concrete syntax trees produced by the [`Parser`](crate::Parser).

use std::fmt;
use std::ops::Range;

use thiserror::Error;

use crate::language::{Field, Language, Symbol};

/// A position in a document: zero-based row and byte column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Point { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A node under construction. The parser assembles these bottom-up and
/// [`Tree::build`] flattens the result into the tree's arena.
#[derive(Debug)]
pub(crate) struct Subtree {
    pub(crate) symbol: Symbol,
    pub(crate) field: Option<Field>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) missing: bool,
    pub(crate) children: Vec<Subtree>,
}

impl Subtree {
    pub(crate) fn leaf(symbol: Symbol, start: usize, end: usize) -> Self {
        Subtree {
            symbol,
            field: None,
            start,
            end,
            missing: false,
            children: Vec::new(),
        }
    }

    pub(crate) fn missing(symbol: Symbol, at: usize) -> Self {
        Subtree {
            missing: true,
            ..Subtree::leaf(symbol, at, at)
        }
    }

    /// A node spanning its children. `children` must not be empty.
    pub(crate) fn node(symbol: Symbol, children: Vec<Subtree>) -> Self {
        let start = children.first().map_or(0, |child| child.start);
        let end = children.last().map_or(start, |child| child.end);
        Subtree::spanning(symbol, children, start, end)
    }

    pub(crate) fn spanning(
        symbol: Symbol,
        children: Vec<Subtree>,
        start: usize,
        end: usize,
    ) -> Self {
        Subtree {
            symbol,
            field: None,
            start,
            end,
            missing: false,
            children,
        }
    }

    pub(crate) fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }
}

#[derive(Debug)]
struct NodeData {
    symbol: Symbol,
    field: Option<Field>,
    missing: bool,
    has_error: bool,
    bytes: Range<usize>,
    start_point: Point,
    end_point: Point,
    parent: Option<usize>,
    index_in_parent: usize,
    children: Vec<usize>,
}

/// A parsed Sifu document.
pub struct Tree {
    language: &'static Language,
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Flattens `root` into the arena in preorder, so every node's index is
    /// greater than its parent's.
    pub(crate) fn build(language: &'static Language, root: Subtree, text: &str) -> Tree {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        let point = |byte: usize| {
            let row = line_starts.partition_point(|start| *start <= byte) - 1;
            Point::new(row, byte - line_starts[row])
        };

        let mut nodes: Vec<NodeData> = Vec::new();
        let mut pending: Vec<(Subtree, Option<usize>, usize)> = vec![(root, None, 0)];
        while let Some((mut subtree, parent, index_in_parent)) = pending.pop() {
            let index = nodes.len();
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            let children = std::mem::take(&mut subtree.children);
            nodes.push(NodeData {
                symbol: subtree.symbol,
                field: subtree.field,
                missing: subtree.missing,
                has_error: subtree.missing || subtree.symbol == Symbol::Error,
                bytes: subtree.start..subtree.end,
                start_point: point(subtree.start),
                end_point: point(subtree.end),
                parent,
                index_in_parent,
                children: Vec::with_capacity(children.len()),
            });
            pending.extend(
                children
                    .into_iter()
                    .enumerate()
                    .rev()
                    .map(|(position, child)| (child, Some(index), position)),
            );
        }

        for index in (1..nodes.len()).rev() {
            if let (true, Some(parent)) = (nodes[index].has_error, nodes[index].parent) {
                nodes[parent].has_error = true;
            }
        }
        Tree { language, nodes }
    }

    /// The `source_file` node spanning the whole document.
    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: self,
            index: 0,
        }
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    /// Every `ERROR` and `MISSING` node, in document order. `source` must be
    /// the text the tree was parsed from.
    pub fn syntax_errors(&self, source: &str) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        let mut pending = vec![self.root_node()];
        while let Some(node) = pending.pop() {
            if !node.has_error() {
                continue;
            }
            if node.is_missing() {
                errors.push(SyntaxError {
                    kind: SyntaxErrorKind::Missing(node.kind()),
                    bytes: node.byte_range(),
                    start: node.start_position(),
                });
                continue;
            }
            if node.is_error() {
                errors.push(SyntaxError {
                    kind: SyntaxErrorKind::Unexpected(node.utf8_text(source).to_string()),
                    bytes: node.byte_range(),
                    start: node.start_position(),
                });
            }
            pending.extend(node.children_rev());
        }
        errors
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {:?}}}", self.root_node())
    }
}

/// What went wrong at a [`SyntaxError`] location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Input the grammar could not place, recorded as an `ERROR` node.
    Unexpected(String),
    /// A token the parser inserted to close a form, recorded as a
    /// `MISSING` node.
    Missing(&'static str),
}

/// A syntax error recovered from while parsing.
///
/// Displays with one-based line and column numbers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at {line}:{column}", line = .start.row + 1, column = .start.column + 1)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub bytes: Range<usize>,
    pub start: Point,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::Unexpected(text) => write!(f, "unexpected {text:?}"),
            SyntaxErrorKind::Missing(expected) => write!(f, "missing {expected:?}"),
        }
    }
}

/// A handle to a node in a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    index: usize,
}

impl<'tree> Node<'tree> {
    fn data(&self) -> &'tree NodeData {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> Node<'tree> {
        Node {
            tree: self.tree,
            index,
        }
    }

    /// Index of this node within its tree, unique per tree.
    pub fn id(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &'static str {
        self.tree.language.symbol_name(self.data().symbol)
    }

    pub fn kind_id(&self) -> u16 {
        self.data().symbol.id()
    }

    pub fn is_named(&self) -> bool {
        self.tree.language.node_kind_is_named(self.kind_id())
    }

    /// Comments, which may appear anywhere.
    pub fn is_extra(&self) -> bool {
        self.data().symbol == Symbol::Comment
    }

    pub fn is_error(&self) -> bool {
        self.data().symbol == Symbol::Error
    }

    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    /// Whether this node or any descendant is an `ERROR` or `MISSING` node.
    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    pub fn start_byte(&self) -> usize {
        self.data().bytes.start
    }

    pub fn end_byte(&self) -> usize {
        self.data().bytes.end
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.data().bytes.clone()
    }

    pub fn start_position(&self) -> Point {
        self.data().start_point
    }

    pub fn end_position(&self) -> Point {
        self.data().end_point
    }

    /// The text this node spans in `source`, which must be the text the
    /// tree was parsed from.
    pub fn utf8_text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.byte_range()]
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, i: usize) -> Option<Node<'tree>> {
        self.data().children.get(i).map(|index| self.at(*index))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'tree>> + 'tree {
        let node = *self;
        self.data()
            .children
            .iter()
            .map(move |index| node.at(*index))
    }

    fn children_rev(&self) -> impl Iterator<Item = Node<'tree>> + 'tree {
        let node = *self;
        self.data()
            .children
            .iter()
            .rev()
            .map(move |index| node.at(*index))
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + 'tree {
        self.children().filter(|child| child.is_named())
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn named_child(&self, i: usize) -> Option<Node<'tree>> {
        self.named_children().nth(i)
    }

    /// The first child stored under `field_name`.
    pub fn child_by_field_name(&self, field_name: &str) -> Option<Node<'tree>> {
        let field = Field::from_id(self.tree.language.field_id_for_name(field_name)?)?;
        self.children().find(|child| child.data().field == Some(field))
    }

    /// The field under which this node is stored in its parent.
    pub fn field_name(&self) -> Option<&'static str> {
        let field = self.data().field?;
        self.tree.language.field_name_for_id(field.id())
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.data().parent.map(|index| self.at(index))
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        self.parent()?.child(self.data().index_in_parent + 1)
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let position = self.data().index_in_parent.checked_sub(1)?;
        self.parent()?.child(position)
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor {
            tree: self.tree,
            stack: vec![self.index],
        }
    }

    /// Renders the named structure of this node the way tree-sitter does:
    /// anonymous tokens are omitted, fields prefix the child they label and
    /// inserted tokens show as `(MISSING ...)`.
    pub fn to_sexp(&self) -> String {
        enum Step<'a> {
            Open(Node<'a>),
            Close,
        }

        let mut out = String::new();
        let mut pending = vec![Step::Open(*self)];
        while let Some(step) = pending.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Close => {
                    out.push(')');
                    continue;
                }
            };
            if node == *self || node.is_named() || node.is_missing() {
                if !out.is_empty() {
                    out.push(' ');
                }
                if let Some(field) = node.field_name() {
                    out.push_str(field);
                    out.push_str(": ");
                }
                if node.is_missing() {
                    out.push_str("(MISSING ");
                    if node.is_named() {
                        out.push_str(node.kind());
                    } else {
                        out.push_str(&format!("{:?}", node.kind()));
                    }
                } else {
                    out.push('(');
                    out.push_str(node.kind());
                }
                pending.push(Step::Close);
            }
            pending.extend(node.children_rev().map(Step::Open));
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

/// A stateful walker over a [`Tree`], starting at the node it was created
/// from and never leaving that node's subtree.
#[derive(Clone, Debug)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    stack: Vec<usize>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn node(&self) -> Node<'tree> {
        Node {
            tree: self.tree,
            index: self.current(),
        }
    }

    pub fn field_name(&self) -> Option<&'static str> {
        self.node().field_name()
    }

    /// Depth relative to the node the cursor started at.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.tree.nodes[self.current()].children.first() {
            Some(child) => {
                self.stack.push(*child);
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        match self.node().next_sibling() {
            Some(sibling) => {
                if let Some(top) = self.stack.last_mut() {
                    *top = sibling.index;
                }
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.stack.pop();
        true
    }

    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or_default()
    }
}
