//! Rust bindings for the `tree-sitter-sifu` grammar.
//!
//! The crate follows the usual Tree-sitter grammar layout: C callers link
//! against `tree_sitter_sifu` as declared in
//! `bindings/c/tree_sitter/tree-sitter-sifu.h`, and Rust callers use
//! [`LANGUAGE`] with a [`Parser`].
//!
//! ```
//! use tree_sitter_sifu::{Parser, LANGUAGE};
//!
//! let mut parser = Parser::new();
//! parser.set_language(&LANGUAGE).expect("Error loading Sifu grammar");
//! let tree = parser.parse("Fib n -> n + 1").unwrap();
//! assert_eq!(tree.root_node().kind(), "source_file");
//! ```

mod config;
mod error;
mod ffi;
mod language;
mod lexer;
mod parser;
mod tree;

pub use config::{Author, GrammarConfig, GrammarEntry, Metadata};
pub use error::{Result, SifuError};
pub use ffi::{tree_sitter_sifu, TSLanguage};
pub use language::{Language, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};
pub use parser::Parser;
pub use tree::{Node, Point, SyntaxError, SyntaxErrorKind, Tree, TreeCursor};

/// The Sifu grammar descriptor. Its address is what `tree_sitter_sifu`
/// returns.
pub static LANGUAGE: Language = language::SIFU;

/// Returns the Tree-sitter [`Language`] for this grammar.
pub fn language() -> &'static Language {
    &LANGUAGE
}

/// The content of the [`node-types.json`][] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers#static-node-types
pub const NODE_TYPES: &str = include_str!("../../src/node-types.json");

/// The syntax highlighting query for this language.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_can_be_loaded() {
        let mut parser = Parser::new();
        parser
            .set_language(language())
            .expect("Error loading Sifu grammar");
        assert_eq!(language().name(), "sifu");
        assert_eq!(language().abi_version(), LANGUAGE_VERSION);
    }
}
