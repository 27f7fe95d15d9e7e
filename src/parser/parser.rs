//! Parser state and core infrastructure
//!
//! This module provides the [`Parser`] struct, the [`ParseError`] type, and
//! the shared helper methods.  The grammar rules themselves live in
//! `declarations`, implemented as additional `impl Parser` blocks so each
//! file extends the parser with related functionality while sharing state.
//!
//! A [`Parser`] owns everything scoped to one parse invocation: the token
//! stream, the guard-identifier mapping, the counters that name anonymous
//! aggregates, and the registry of aggregates defined earlier in the same
//! text (used to inline nested references).  Parses are therefore reentrant
//! and independent parses can run in parallel.

use crate::parser::ast::{AggregateKind, Node, SourceLocation};
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::preprocess::GuardMap;
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Half-height of the source window attached to parse errors.
const ERROR_WINDOW: usize = 10;

/// Parse failure with positional diagnostics.
///
/// Carries the 1-based line number and a source window of up to
/// [`ERROR_WINDOW`] lines on each side, with a `->` marker on the offending
/// line.  Intended for a human fixing an unparseable input, not for
/// programmatic recovery.
#[derive(Debug, Clone, Error)]
#[error("parse error at line {line}, column {column}: {message}\n{window}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub window: String,
}

impl ParseError {
    pub(crate) fn with_context(
        message: String,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        ParseError {
            message,
            line: location.line,
            column: location.column,
            window: render_window(source, location.line),
        }
    }
}

/// Render the numbered source snippet around a 1-based line.
fn render_window(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let index = line.saturating_sub(1);
    let start = index.saturating_sub(ERROR_WINDOW);
    let end = (index + ERROR_WINDOW).min(lines.len());

    let mut out = String::new();
    for (i, text) in lines.iter().enumerate().take(end).skip(start) {
        let marker = if i == index { "->" } else { "  " };
        let _ = writeln!(out, "{:04} {}{}", i + 1, marker, text);
    }
    out
}

/// Local registry entry for an aggregate defined earlier in the parsed text.
/// `None` fields mean the definition is opaque (forward declaration), so a
/// later reference cannot be inlined.
pub(crate) type LocalAggregate = Option<(AggregateKind, Vec<Node>)>;

/// Recursive descent parser for the restricted struct dialect.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) source: String,
    pub(crate) guard_map: GuardMap,
    pub(crate) unnamed_struct_counter: usize,
    pub(crate) unnamed_union_counter: usize,
    pub(crate) local_aggregates: FxHashMap<String, LocalAggregate>,
}

impl Parser {
    /// Create a parser with no guard mapping (inputs without rewritten
    /// `#if` expressions).
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_guard_map(source, GuardMap::default())
    }

    /// Create a parser that resolves opaque guard identifiers through the
    /// given mapping, as produced by [`crate::preprocess::process_macros`].
    pub fn with_guard_map(source: &str, guard_map: GuardMap) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|err: LexError| {
            ParseError::with_context(err.message, err.location, source)
        })?;
        Ok(Self {
            tokens,
            position: 0,
            source: source.to_string(),
            guard_map,
            unnamed_struct_counter: 0,
            unnamed_union_counter: 0,
            local_aggregates: FxHashMap::default(),
        })
    }

    /// Parse the entire input as a sequence of top-level statements,
    /// producing the pre-flattening tree (conditional wrapper nodes
    /// included).
    pub fn parse_all(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        while !self.is_at_end() {
            nodes.extend(self.parse_statement()?);
        }
        Ok(nodes)
    }

    // ===== Helper methods =====

    pub(crate) fn error_here(&self, message: String) -> ParseError {
        ParseError::with_context(message, self.current_location(), &self.source)
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_token(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reports_line_and_window() {
        let source = "struct s {\n    int a;\n    float b 1;\n    int c;\n};";
        let mut parser = Parser::new(source).unwrap();
        let err = parser.parse_all().unwrap_err();

        assert_eq!(err.line, 3);
        assert!(err.window.contains("->"));
        assert!(err.window.contains("float b 1;"));
        assert!(err.window.contains("0001"));
    }

    #[test]
    fn test_window_marks_offending_line() {
        let window = render_window("a\nb\nc", 2);
        assert!(window.contains("0002 ->b"));
        assert!(window.contains("0001   a"));
    }

    #[test]
    fn test_counters_reset_per_parser() {
        let source = "struct s { union { int a; } u; };";
        let mut first = Parser::new(source).unwrap();
        let mut second = Parser::new(source).unwrap();
        let left = first.parse_all().unwrap();
        let right = second.parse_all().unwrap();
        assert_eq!(left, right);
    }
}
