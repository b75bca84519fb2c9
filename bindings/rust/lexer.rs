//! Maximal-munch lexer compiled from the descriptor's token tables.

use regex::Regex;
use tracing::trace;

use crate::error::Result;
use crate::language::{Language, Symbol};

/// A lexed token. `symbol` is `Symbol::Error` for a character that starts no
/// token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) symbol: Symbol,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug)]
pub(crate) struct Lexer {
    language: &'static Language,
    patterns: Vec<(Symbol, Regex)>,
    string_prefix: Regex,
}

impl Lexer {
    pub(crate) fn new(language: &'static Language) -> Result<Self> {
        let patterns = language
            .pattern_tokens()
            .iter()
            .map(|def| -> Result<(Symbol, Regex)> { Ok((def.symbol, anchored(def.source)?)) })
            .collect::<Result<Vec<_>>>()?;
        let string_prefix = anchored(language.string_prefix())?;
        Ok(Lexer {
            language,
            patterns,
            string_prefix,
        })
    }

    pub(crate) fn language(&self) -> &'static Language {
        self.language
    }

    /// Splits `text` into tokens, dropping whitespace extras.
    pub(crate) fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        // No quote before this offset opens a string.
        let mut unterminated_until = 0;
        while let Some(c) = text[pos..].chars().next() {
            if self.language.is_whitespace(c) {
                pos += c.len_utf8();
                continue;
            }
            let token = self.next_token(text, pos, c, pos < unterminated_until);
            if c == '"' && token.symbol != Symbol::String && pos >= unterminated_until {
                // Every quote the failed scan passed over is escaped inside
                // it, so a string opened there stops at the same place.
                unterminated_until = pos
                    + self
                        .string_prefix
                        .find(&text[pos..])
                        .map_or(1, |found| found.end());
            }
            trace!(
                kind = self.language.symbol_name(token.symbol),
                start = token.start,
                end = token.end,
                "token"
            );
            pos = token.end;
            tokens.push(token);
        }
        tokens
    }

    fn next_token(&self, text: &str, pos: usize, first: char, skip_strings: bool) -> Token {
        let rest = &text[pos..];
        let mut best: Option<(Symbol, usize)> = None;
        let mut consider = |symbol: Symbol, len: usize| {
            if len > 0 && best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((symbol, len));
            }
        };

        for def in self.language.literal_tokens() {
            if rest.starts_with(def.source) {
                consider(def.symbol, def.source.len());
            }
        }
        for (symbol, regex) in &self.patterns {
            if skip_strings && *symbol == Symbol::String {
                continue;
            }
            if let Some(found) = regex.find(rest) {
                consider(*symbol, found.end());
            }
        }

        let (symbol, len) = best.unwrap_or((Symbol::Error, first.len_utf8()));
        Token {
            symbol,
            start: pos,
            end: pos + len,
        }
    }
}

fn anchored(source: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{source})"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LANGUAGE;

    fn lex(text: &str) -> Vec<(&'static str, &str)> {
        let lexer = Lexer::new(&LANGUAGE).unwrap();
        lexer
            .tokenize(text)
            .into_iter()
            .map(|token| {
                let kind = LANGUAGE.symbol_name(token.symbol);
                (kind, &text[token.start..token.end])
            })
            .collect()
    }

    #[test]
    fn every_pattern_compiles() {
        let lexer = Lexer::new(&LANGUAGE).unwrap();
        assert_eq!(lexer.patterns.len(), LANGUAGE.pattern_tokens().len());
    }

    #[test]
    fn atoms_and_unicode_identifiers() {
        assert_eq!(
            lex("Äpfel über 3.14 \"a\\\"b\" 42"),
            vec![
                ("key", "Äpfel"),
                ("var", "über"),
                ("number", "3.14"),
                ("string", "\"a\\\"b\""),
                ("number", "42"),
            ]
        );
    }

    #[test]
    fn longest_literal_wins() {
        assert_eq!(
            lex("::: --> ->"),
            vec![("::", "::"), (":", ":"), ("-->", "-->"), ("->", "->")]
        );
    }

    #[test]
    fn symbols_take_maximal_runs() {
        assert_eq!(
            lex("a <=> b ->> c"),
            vec![
                ("var", "a"),
                ("symbol", "<=>"),
                ("var", "b"),
                ("->", "->"),
                ("symbol", ">"),
                ("var", "c"),
            ]
        );
        assert_eq!(lex("∀x"), vec![("symbol", "∀"), ("var", "x")]);
    }

    #[test]
    fn comments_stop_before_newline() {
        assert_eq!(
            lex("a # note ) }\r\nb"),
            vec![
                ("var", "a"),
                ("comment", "# note ) }\r"),
                ("\n", "\n"),
                ("var", "b"),
            ]
        );
    }

    #[test]
    fn whitespace_excludes_newlines() {
        assert_eq!(lex(" \t\n\r "), vec![("\n", "\n")]);
    }

    #[test]
    fn stray_characters_become_error_tokens() {
        assert_eq!(
            lex("1. _x - \"open"),
            vec![
                ("number", "1"),
                ("ERROR", "."),
                ("ERROR", "_"),
                ("var", "x"),
                ("ERROR", "-"),
                ("ERROR", "\""),
                ("var", "open"),
            ]
        );
    }

    #[test]
    fn unterminated_string_does_not_hide_later_strings() {
        assert_eq!(
            lex("\"a\\\n\"ok\""),
            vec![
                ("ERROR", "\""),
                ("var", "a"),
                ("symbol", "\\"),
                ("\n", "\n"),
                ("string", "\"ok\""),
            ]
        );
    }

    #[test]
    fn escaped_quotes_without_a_close_are_errors() {
        let text = format!("\"{}", "\\\"".repeat(20_000));
        let lexer = Lexer::new(&LANGUAGE).unwrap();
        let tokens = lexer.tokenize(&text);
        assert_eq!(tokens.len(), 40_001);
        assert!(tokens.iter().all(|token| token.symbol != Symbol::String));
        assert_eq!(tokens.last().map(|token| token.end), Some(text.len()));
    }
}
