//! The static grammar descriptor for Sifu.
//!
//! Everything here is plain data in static storage: the symbol table, the
//! field table, the operator precedence table and the lexical definitions the
//! lexer compiles. Callers only see [`Language`] through accessor methods. C
//! callers only see an opaque pointer whose first field is the ABI version.

use crate::ffi::TSLanguage;

/// The descriptor ABI version this crate produces.
///
/// This numbering is separate from the Tree-sitter runtime's parse tables.
/// It stays below the oldest version a Tree-sitter runtime loads (13), so a
/// runtime reading the leading version field rejects the descriptor instead of
/// misreading it.
pub const LANGUAGE_VERSION: u32 = 1;

/// The oldest descriptor ABI version a [`Parser`](crate::Parser) accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 1;

/// Grammar symbols, numbered the way the descriptor's symbol table is laid
/// out: the end marker, then terminals, then nonterminals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub(crate) enum Symbol {
    End = 0,
    Comment,
    Key,
    Var,
    Number,
    String,
    Symbol,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Newline,
    ColonColon,
    LongArrowToken,
    Comma,
    Colon,
    Arrow,
    SourceFile,
    Pattern,
    Term,
    NestedPattern,
    NestedTrie,
    SemicolonExpr,
    NewlineExpr,
    LongMatch,
    LongArrow,
    CommaExpr,
    Infix,
    ShortMatch,
    ShortArrow,
    Error = u16::MAX,
}

impl Symbol {
    /// Symbols in id order, `Error` excluded.
    #[cfg(test)]
    const ALL: [Symbol; 31] = [
        Symbol::End,
        Symbol::Comment,
        Symbol::Key,
        Symbol::Var,
        Symbol::Number,
        Symbol::String,
        Symbol::Symbol,
        Symbol::LParen,
        Symbol::RParen,
        Symbol::LBrace,
        Symbol::RBrace,
        Symbol::Semicolon,
        Symbol::Newline,
        Symbol::ColonColon,
        Symbol::LongArrowToken,
        Symbol::Comma,
        Symbol::Colon,
        Symbol::Arrow,
        Symbol::SourceFile,
        Symbol::Pattern,
        Symbol::Term,
        Symbol::NestedPattern,
        Symbol::NestedTrie,
        Symbol::SemicolonExpr,
        Symbol::NewlineExpr,
        Symbol::LongMatch,
        Symbol::LongArrow,
        Symbol::CommaExpr,
        Symbol::Infix,
        Symbol::ShortMatch,
        Symbol::ShortArrow,
    ];

    pub(crate) fn id(self) -> u16 {
        self as u16
    }

    #[cfg(test)]
    pub(crate) fn from_id(id: u16) -> Option<Symbol> {
        if id == Symbol::Error.id() {
            return Some(Symbol::Error);
        }
        Symbol::ALL.get(usize::from(id)).copied()
    }
}

/// Fields, numbered from 1 in alphabetical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub(crate) enum Field {
    From = 1,
    Into,
    Op,
    Right,
}

impl Field {
    const ALL: [Field; 4] = [Field::From, Field::Into, Field::Op, Field::Right];

    pub(crate) fn id(self) -> u16 {
        self as u16
    }

    pub(crate) fn from_id(id: u16) -> Option<Field> {
        Field::ALL.get(usize::from(id).checked_sub(1)?).copied()
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SymbolInfo {
    pub(crate) name: &'static str,
    pub(crate) named: bool,
    pub(crate) visible: bool,
}

const fn named(name: &'static str) -> SymbolInfo {
    SymbolInfo {
        name,
        named: true,
        visible: true,
    }
}

const fn anonymous(name: &'static str) -> SymbolInfo {
    SymbolInfo {
        name,
        named: false,
        visible: true,
    }
}

/// An operator token and the expression node it introduces.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Operator {
    pub(crate) token: Symbol,
    pub(crate) node: Symbol,
    pub(crate) precedence: u8,
    pub(crate) field: Field,
    /// Nested forms that may stand as the operand on their own, without a
    /// wrapping `pattern`.
    pub(crate) direct: &'static [Symbol],
}

/// A lexical token definition: literal text or a regular expression.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TokenDef {
    pub(crate) symbol: Symbol,
    pub(crate) source: &'static str,
}

const SYMBOLS: [SymbolInfo; 31] = [
    SymbolInfo {
        name: "end",
        named: false,
        visible: false,
    },
    named("comment"),
    named("key"),
    named("var"),
    named("number"),
    named("string"),
    named("symbol"),
    anonymous("("),
    anonymous(")"),
    anonymous("{"),
    anonymous("}"),
    anonymous(";"),
    anonymous("\n"),
    anonymous("::"),
    anonymous("-->"),
    anonymous(","),
    anonymous(":"),
    anonymous("->"),
    named("source_file"),
    named("pattern"),
    named("term"),
    named("nested_pattern"),
    named("nested_trie"),
    named("semicolon_expr"),
    named("newline_expr"),
    named("long_match"),
    named("long_arrow"),
    named("comma_expr"),
    named("infix"),
    named("short_match"),
    named("short_arrow"),
];

const ERROR_INFO: SymbolInfo = named("ERROR");

const FIELD_NAMES: [&str; 4] = ["from", "into", "op", "right"];

const NESTED_TRIE: &[Symbol] = &[Symbol::NestedTrie];
const NESTED_ANY: &[Symbol] = &[Symbol::NestedPattern, Symbol::NestedTrie];

const OPERATORS: [Operator; 8] = [
    Operator {
        token: Symbol::Semicolon,
        node: Symbol::SemicolonExpr,
        precedence: 1,
        field: Field::Right,
        direct: &[],
    },
    Operator {
        token: Symbol::Newline,
        node: Symbol::NewlineExpr,
        precedence: 1,
        field: Field::Right,
        direct: &[],
    },
    Operator {
        token: Symbol::ColonColon,
        node: Symbol::LongMatch,
        precedence: 2,
        field: Field::From,
        direct: NESTED_TRIE,
    },
    Operator {
        token: Symbol::LongArrowToken,
        node: Symbol::LongArrow,
        precedence: 2,
        field: Field::Into,
        direct: NESTED_TRIE,
    },
    Operator {
        token: Symbol::Comma,
        node: Symbol::CommaExpr,
        precedence: 3,
        field: Field::Right,
        direct: &[],
    },
    Operator {
        token: Symbol::Symbol,
        node: Symbol::Infix,
        precedence: 4,
        field: Field::Right,
        direct: NESTED_ANY,
    },
    Operator {
        token: Symbol::Colon,
        node: Symbol::ShortMatch,
        precedence: 5,
        field: Field::From,
        direct: NESTED_TRIE,
    },
    Operator {
        token: Symbol::Arrow,
        node: Symbol::ShortArrow,
        precedence: 5,
        field: Field::Into,
        direct: NESTED_TRIE,
    },
];

const LITERAL_TOKENS: [TokenDef; 11] = [
    TokenDef {
        symbol: Symbol::LParen,
        source: "(",
    },
    TokenDef {
        symbol: Symbol::RParen,
        source: ")",
    },
    TokenDef {
        symbol: Symbol::LBrace,
        source: "{",
    },
    TokenDef {
        symbol: Symbol::RBrace,
        source: "}",
    },
    TokenDef {
        symbol: Symbol::Semicolon,
        source: ";",
    },
    TokenDef {
        symbol: Symbol::Newline,
        source: "\n",
    },
    TokenDef {
        symbol: Symbol::ColonColon,
        source: "::",
    },
    TokenDef {
        symbol: Symbol::LongArrowToken,
        source: "-->",
    },
    TokenDef {
        symbol: Symbol::Comma,
        source: ",",
    },
    TokenDef {
        symbol: Symbol::Colon,
        source: ":",
    },
    TokenDef {
        symbol: Symbol::Arrow,
        source: "->",
    },
];

const PATTERN_TOKENS: [TokenDef; 6] = [
    TokenDef {
        symbol: Symbol::Comment,
        source: r"#.*",
    },
    TokenDef {
        symbol: Symbol::Key,
        source: r"\p{Lu}[\p{L}\p{N}_]*",
    },
    TokenDef {
        symbol: Symbol::Var,
        source: r"\p{Ll}[\p{L}\p{N}_]*",
    },
    TokenDef {
        symbol: Symbol::Number,
        source: r"[0-9]+(\.[0-9]+)?",
    },
    TokenDef {
        symbol: Symbol::String,
        source: r#""([^"\\]|\\.)*""#,
    },
    TokenDef {
        symbol: Symbol::Symbol,
        source: r"[!@$%^&*+=|<>?/\\~`\p{S}]+",
    },
];

/// A string token up to, not including, its closing quote.
const STRING_PREFIX: &str = r#""([^"\\]|\\.)*"#;

const WHITESPACE: [char; 3] = [' ', '\t', '\r'];

/// The Sifu grammar descriptor.
///
/// There is exactly one instance that callers can reach,
/// [`LANGUAGE`](crate::LANGUAGE), so its address identifies the grammar.
///
/// The layout is C-compatible only so that `abi_version` sits at offset 0,
/// where Tree-sitter hosts look for it. The remaining fields are private.
#[derive(Debug)]
#[repr(C)]
pub struct Language {
    abi_version: u32,
    name: &'static str,
    symbols: &'static [SymbolInfo],
    field_names: &'static [&'static str],
    operators: &'static [Operator],
    literal_tokens: &'static [TokenDef],
    pattern_tokens: &'static [TokenDef],
    string_prefix: &'static str,
    whitespace: &'static [char],
}

pub(crate) const SIFU: Language = Language {
    abi_version: LANGUAGE_VERSION,
    name: "sifu",
    symbols: &SYMBOLS,
    field_names: &FIELD_NAMES,
    operators: &OPERATORS,
    literal_tokens: &LITERAL_TOKENS,
    pattern_tokens: &PATTERN_TOKENS,
    string_prefix: STRING_PREFIX,
    whitespace: &WHITESPACE,
};

impl Language {
    #[cfg(test)]
    pub(crate) const fn with_abi_version(self, abi_version: u32) -> Self {
        Language {
            abi_version,
            ..self
        }
    }

    /// Recovers the descriptor from a pointer returned by
    /// [`tree_sitter_sifu`](crate::tree_sitter_sifu).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `tree_sitter_sifu` (or
    /// [`Language::as_raw`]); any other pointer is undefined behavior.
    pub unsafe fn from_raw(ptr: *const TSLanguage) -> &'static Language {
        // SAFETY: the caller guarantees `ptr` is the address of a static
        // `Language`, which lives for the whole program.
        unsafe { &*ptr.cast::<Language>() }
    }

    /// The opaque pointer handed across the C ABI.
    pub fn as_raw(&'static self) -> *const TSLanguage {
        (self as *const Language).cast()
    }

    /// The grammar name, `"sifu"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The ABI version of this descriptor.
    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }

    /// Number of symbols in the symbol table, excluding `ERROR`.
    pub fn node_kind_count(&self) -> usize {
        self.symbols.len()
    }

    /// The kind name for a symbol id.
    pub fn node_kind_for_id(&self, id: u16) -> Option<&'static str> {
        self.symbol_info(id).map(|info| info.name)
    }

    /// The symbol id for a kind name. Named and anonymous symbols live in
    /// separate namespaces, so `"symbol"` and a literal `"symbol"` token
    /// would not collide.
    pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<u16> {
        if named && kind == ERROR_INFO.name {
            return Some(Symbol::Error.id());
        }
        self.symbols
            .iter()
            .position(|info| info.visible && info.named == named && info.name == kind)
            .and_then(|index| u16::try_from(index).ok())
    }

    pub fn node_kind_is_named(&self, id: u16) -> bool {
        self.symbol_info(id).is_some_and(|info| info.named)
    }

    pub fn node_kind_is_visible(&self, id: u16) -> bool {
        self.symbol_info(id).is_some_and(|info| info.visible)
    }

    /// Number of fields. Field ids run from 1 to this count inclusive.
    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn field_name_for_id(&self, id: u16) -> Option<&'static str> {
        let index = usize::from(id).checked_sub(1)?;
        self.field_names.get(index).copied()
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<u16> {
        self.field_names
            .iter()
            .position(|field| *field == name)
            .and_then(|index| u16::try_from(index + 1).ok())
    }

    fn symbol_info(&self, id: u16) -> Option<&'static SymbolInfo> {
        if id == Symbol::Error.id() {
            return Some(&ERROR_INFO);
        }
        self.symbols.get(usize::from(id))
    }

    pub(crate) fn symbol_name(&self, symbol: Symbol) -> &'static str {
        self.node_kind_for_id(symbol.id()).unwrap_or(ERROR_INFO.name)
    }

    pub(crate) fn operator(&self, token: Symbol) -> Option<&'static Operator> {
        self.operators.iter().find(|op| op.token == token)
    }

    pub(crate) fn literal_tokens(&self) -> &'static [TokenDef] {
        self.literal_tokens
    }

    pub(crate) fn pattern_tokens(&self) -> &'static [TokenDef] {
        self.pattern_tokens
    }

    pub(crate) fn string_prefix(&self) -> &'static str {
        self.string_prefix
    }

    pub(crate) fn is_whitespace(&self, c: char) -> bool {
        self.whitespace.contains(&c)
    }
}
