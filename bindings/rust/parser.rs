//! Error-tolerant precedence parser for Sifu.
//!
//! A document is a pattern: a run of terms. Operator tokens open an
//! expression whose operand is itself a pattern. The operand keeps absorbing
//! terms until an operator that binds looser than the one that opened it, a
//! closing delimiter, or the end of input. Equal precedence nests to the
//! right.

use tracing::debug;

use crate::error::{Result, SifuError};
use crate::language::{
    Field, Language, Operator, Symbol, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION,
};
use crate::lexer::{Lexer, Token};
use crate::tree::{Subtree, Tree};

/// Parses Sifu source text into [`Tree`]s.
///
/// ```
/// let mut parser = tree_sitter_sifu::Parser::new();
/// parser.set_language(&tree_sitter_sifu::LANGUAGE).expect("Error loading Sifu grammar");
/// let tree = parser.parse("Eq x -> True").unwrap();
/// assert!(!tree.root_node().has_error());
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    lexer: Option<Lexer>,
}

impl Parser {
    pub fn new() -> Self {
        Parser { lexer: None }
    }

    /// Assigns the grammar, compiling its lexical definitions.
    ///
    /// Fails if the descriptor's ABI version is outside
    /// `MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION`.
    pub fn set_language(&mut self, language: &'static Language) -> Result<()> {
        let version = language.abi_version();
        if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return Err(SifuError::IncompatibleVersion {
                version,
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            });
        }
        self.lexer = Some(Lexer::new(language)?);
        debug!(language = language.name(), version, "language set");
        Ok(())
    }

    pub fn language(&self) -> Option<&'static Language> {
        self.lexer.as_ref().map(Lexer::language)
    }

    /// Parses `text`. Malformed input still yields a tree; see
    /// [`Tree::syntax_errors`].
    pub fn parse(&mut self, text: &str) -> Result<Tree> {
        let lexer = self.lexer.as_ref().ok_or(SifuError::NoLanguage)?;
        let language = lexer.language();
        let tokens = lexer.tokenize(text);
        let root = Builder {
            language,
            tokens: &tokens,
            pos: 0,
            extras: Vec::new(),
        }
        .source_file(text.len());
        let tree = Tree::build(language, root, text);
        debug!(
            bytes = text.len(),
            tokens = tokens.len(),
            has_error = tree.root_node().has_error(),
            "parsed"
        );
        Ok(tree)
    }
}

struct Builder<'a> {
    language: &'static Language,
    tokens: &'a [Token],
    pos: usize,
    /// Comments seen by lookahead but not yet placed in the tree.
    extras: Vec<Subtree>,
}

/// A pattern still collecting terms.
struct OpenPattern {
    floor: u8,
    depth: usize,
    children: Vec<Subtree>,
}

impl OpenPattern {
    fn new(floor: u8, depth: usize) -> Self {
        OpenPattern {
            floor,
            depth,
            children: Vec::new(),
        }
    }
}

/// A form whose inner pattern is being parsed.
enum Suspended {
    Nested {
        kind: Symbol,
        closer: Symbol,
        children: Vec<Subtree>,
    },
    Operator {
        operator: &'static Operator,
        children: Vec<Subtree>,
    },
}

/// What starting a term produced.
enum Opened {
    Term(Subtree),
    Operand {
        form: Suspended,
        floor: u8,
        depth: usize,
    },
}

impl Builder<'_> {
    fn source_file(mut self, len: usize) -> Subtree {
        let mut children = Vec::new();
        while let Some(symbol) = self.peek() {
            if is_stray(symbol) {
                self.error(&mut children);
                continue;
            }
            children.append(&mut self.extras);
            children.push(self.pattern(0, 0));
        }
        children.append(&mut self.extras);
        Subtree::spanning(Symbol::SourceFile, children, 0, len)
    }

    /// `term+`, stopping before operators that bind looser than `floor`.
    /// At `depth` zero a closing delimiter is an error; inside a nested
    /// form it ends the pattern.
    ///
    /// Nesting is unbounded, so forms waiting on an inner pattern are kept on
    /// an explicit stack rather than the call stack.
    fn pattern(&mut self, floor: u8, depth: usize) -> Subtree {
        let mut current = OpenPattern::new(floor, depth);
        let mut suspended: Vec<(OpenPattern, Suspended)> = Vec::new();
        loop {
            let ends = match self.peek() {
                None => true,
                Some(Symbol::RParen | Symbol::RBrace) if current.depth > 0 => true,
                Some(symbol) if is_stray(symbol) => {
                    self.error(&mut current.children);
                    false
                }
                Some(symbol) if self.binds_below(symbol, current.floor) => true,
                Some(symbol) => {
                    current.children.append(&mut self.extras);
                    match self.open_term(symbol, current.depth) {
                        Opened::Term(inner) => {
                            current.children.push(Subtree::node(Symbol::Term, vec![inner]));
                        }
                        Opened::Operand { form, floor, depth } => {
                            let outer =
                                std::mem::replace(&mut current, OpenPattern::new(floor, depth));
                            suspended.push((outer, form));
                        }
                    }
                    false
                }
            };
            if !ends {
                continue;
            }

            let done = Subtree::node(Symbol::Pattern, std::mem::take(&mut current.children));
            let Some((outer, form)) = suspended.pop() else {
                return done;
            };
            let inner = self.close(form, done);
            current = outer;
            current.children.push(Subtree::node(Symbol::Term, vec![inner]));
        }
    }

    fn open_term(&mut self, symbol: Symbol, depth: usize) -> Opened {
        match symbol {
            Symbol::LParen => self.open_nested(Symbol::NestedPattern, Symbol::RParen, depth),
            Symbol::LBrace => self.open_nested(Symbol::NestedTrie, Symbol::RBrace, depth),
            _ => match self.language.operator(symbol) {
                Some(operator) => self.open_operator(operator, depth),
                None => Opened::Term(self.leaf()),
            },
        }
    }

    fn open_nested(&mut self, kind: Symbol, closer: Symbol, depth: usize) -> Opened {
        let mut children = Vec::new();
        self.shift(&mut children);
        let has_body = self
            .peek()
            .is_some_and(|symbol| !matches!(symbol, Symbol::RParen | Symbol::RBrace));
        if !has_body {
            return Opened::Term(self.close_nested(kind, closer, children));
        }
        children.append(&mut self.extras);
        Opened::Operand {
            form: Suspended::Nested {
                kind,
                closer,
                children,
            },
            floor: 0,
            depth: depth + 1,
        }
    }

    fn close_nested(
        &mut self,
        kind: Symbol,
        closer: Symbol,
        mut children: Vec<Subtree>,
    ) -> Subtree {
        if self.peek() == Some(closer) {
            self.shift(&mut children);
        } else {
            let at = children.last().map_or(0, |child| child.end);
            children.push(Subtree::missing(closer, at));
        }
        Subtree::node(kind, children)
    }

    fn open_operator(&mut self, operator: &'static Operator, depth: usize) -> Opened {
        let token = self.leaf();
        if !self.starts_operand(operator.precedence) {
            return Opened::Term(if operator.node == Symbol::Infix {
                token
            } else {
                Subtree::node(operator.node, vec![token])
            });
        }

        let mut children = vec![if operator.node == Symbol::Infix {
            token.with_field(Field::Op)
        } else {
            token
        }];
        children.append(&mut self.extras);
        Opened::Operand {
            form: Suspended::Operator { operator, children },
            floor: operator.precedence,
            depth,
        }
    }

    /// Completes `form` around its finished inner pattern.
    fn close(&mut self, form: Suspended, pattern: Subtree) -> Subtree {
        match form {
            Suspended::Nested {
                kind,
                closer,
                mut children,
            } => {
                children.push(pattern);
                self.close_nested(kind, closer, children)
            }
            Suspended::Operator {
                operator,
                mut children,
            } => {
                let operand = direct_operand(pattern, operator.direct);
                children.push(operand.with_field(operator.field));
                Subtree::node(operator.node, children)
            }
        }
    }

    fn starts_operand(&mut self, floor: u8) -> bool {
        match self.peek() {
            Some(symbol) => !is_stray(symbol) && !self.binds_below(symbol, floor),
            None => false,
        }
    }

    fn binds_below(&self, symbol: Symbol, floor: u8) -> bool {
        self.language
            .operator(symbol)
            .is_some_and(|operator| operator.precedence < floor)
    }

    /// Wraps unplaceable input in an `ERROR` node. Adjacent unlexable
    /// characters share one node.
    fn error(&mut self, children: &mut Vec<Subtree>) {
        children.append(&mut self.extras);
        let Some(first) = self.tokens.get(self.pos).copied() else {
            return;
        };
        if first.symbol != Symbol::Error {
            let token = self.leaf();
            children.push(Subtree::node(Symbol::Error, vec![token]));
            return;
        }
        let mut end = first.end;
        self.pos += 1;
        while let Some(next) = self.tokens.get(self.pos) {
            if next.symbol != Symbol::Error || next.start != end {
                break;
            }
            end = next.end;
            self.pos += 1;
        }
        children.push(Subtree::leaf(Symbol::Error, first.start, end));
    }

    /// The next significant token, moving any comments in front of it into
    /// `extras`.
    fn peek(&mut self) -> Option<Symbol> {
        while let Some(token) = self.tokens.get(self.pos) {
            if token.symbol != Symbol::Comment {
                return Some(token.symbol);
            }
            self.extras.push(Subtree::leaf(Symbol::Comment, token.start, token.end));
            self.pos += 1;
        }
        None
    }

    /// Consumes the current token as a leaf.
    fn leaf(&mut self) -> Subtree {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Subtree::leaf(token.symbol, token.start, token.end)
            }
            None => Subtree::missing(Symbol::End, self.tokens.last().map_or(0, |token| token.end)),
        }
    }

    /// Consumes the current token into `children`, after any pending extras.
    fn shift(&mut self, children: &mut Vec<Subtree>) {
        children.append(&mut self.extras);
        let token = self.leaf();
        children.push(token);
    }
}

fn is_stray(symbol: Symbol) -> bool {
    matches!(symbol, Symbol::RParen | Symbol::RBrace | Symbol::Error)
}

/// Replaces a pattern holding exactly one term around an allowed nested form
/// with that form.
fn direct_operand(mut operand: Subtree, direct: &[Symbol]) -> Subtree {
    let is_direct = match operand.children.as_slice() {
        [term] if term.symbol == Symbol::Term => {
            matches!(term.children.as_slice(), [inner] if direct.contains(&inner.symbol))
        }
        _ => false,
    };
    if is_direct {
        if let Some(inner) = operand.children.pop().and_then(|mut term| term.children.pop()) {
            return inner;
        }
    }
    operand
}
