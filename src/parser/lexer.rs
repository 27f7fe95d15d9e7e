//! Lexer (tokenizer) for the restricted struct dialect
//!
//! Converts normalised struct text into a flat [`Token`] stream consumed by
//! the parser.  `/* */` and `//` comments are stripped here, not in the
//! grammar.  Preprocessor directive words (`ifdef`, `else`, `endif`, ...)
//! are lexed as plain identifiers following a [`Token::Hash`]; the parser
//! interprets them.  An array suffix `[expr]` is captured verbatim as a
//! single token because array-size expressions may be symbolic and whether
//! a concrete integer is knowable is a downstream concern.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier, including preprocessor directive words after `#`.
    Ident(String, SourceLocation),
    /// Integer literal, kept as its source text (bitfield widths).
    Number(String, SourceLocation),
    /// Verbatim contents of an array suffix, brackets stripped.
    ArraySuffix(String, SourceLocation),

    // Keywords
    Typedef(SourceLocation),
    Struct(SourceLocation),
    Union(SourceLocation),
    Enum(SourceLocation),
    Const(SourceLocation),
    Volatile(SourceLocation),
    Static(SourceLocation),
    Auto(SourceLocation),
    Extern(SourceLocation),
    Register(SourceLocation),
    Signed(SourceLocation),
    Unsigned(SourceLocation),
    Char(SourceLocation),
    Short(SourceLocation),
    Int(SourceLocation),
    Long(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Void(SourceLocation),

    // Punctuation
    Hash(SourceLocation),      // #
    Star(SourceLocation),      // *
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,
    Colon(SourceLocation),     // :
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Ident(_, loc)
            | Token::Number(_, loc)
            | Token::ArraySuffix(_, loc)
            | Token::Typedef(loc)
            | Token::Struct(loc)
            | Token::Union(loc)
            | Token::Enum(loc)
            | Token::Const(loc)
            | Token::Volatile(loc)
            | Token::Static(loc)
            | Token::Auto(loc)
            | Token::Extern(loc)
            | Token::Register(loc)
            | Token::Signed(loc)
            | Token::Unsigned(loc)
            | Token::Char(loc)
            | Token::Short(loc)
            | Token::Int(loc)
            | Token::Long(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Void(loc)
            | Token::Hash(loc)
            | Token::Star(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Colon(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Keyword spelling for type-name rendering, when this token is one of
    /// the base-type or qualifier keywords.
    pub fn keyword_str(&self) -> Option<&'static str> {
        match self {
            Token::Signed(_) => Some("signed"),
            Token::Unsigned(_) => Some("unsigned"),
            Token::Char(_) => Some("char"),
            Token::Short(_) => Some("short"),
            Token::Int(_) => Some("int"),
            Token::Long(_) => Some("long"),
            Token::Float(_) => Some("float"),
            Token::Double(_) => Some("double"),
            Token::Void(_) => Some("void"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::ArraySuffix(s, _) => write!(f, "array suffix [{}]", s),
            Token::Typedef(_) => write!(f, "'typedef'"),
            Token::Struct(_) => write!(f, "'struct'"),
            Token::Union(_) => write!(f, "'union'"),
            Token::Enum(_) => write!(f, "'enum'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::Volatile(_) => write!(f, "'volatile'"),
            Token::Static(_) => write!(f, "'static'"),
            Token::Auto(_) => write!(f, "'auto'"),
            Token::Extern(_) => write!(f, "'extern'"),
            Token::Register(_) => write!(f, "'register'"),
            Token::Signed(_) => write!(f, "'signed'"),
            Token::Unsigned(_) => write!(f, "'unsigned'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Short(_) => write!(f, "'short'"),
            Token::Int(_) => write!(f, "'int'"),
            Token::Long(_) => write!(f, "'long'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::Hash(_) => write!(f, "'#'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Colon(_) => write!(f, "':'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for the restricted struct dialect
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '0'..='9' => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),
            '[' => self.array_suffix(),

            '#' => Ok(Token::Hash(loc)),
            '*' => Ok(Token::Star(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),
            ':' => Ok(Token::Colon(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Capture an array suffix verbatim up to the matching `]`.
    /// The opening `[` has already been consumed.
    fn array_suffix(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut contents = String::new();
        let mut depth = 1usize;

        while let Some(ch) = self.advance() {
            match ch {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Token::ArraySuffix(contents, loc));
                    }
                }
                _ => {}
            }
            contents.push(ch);
        }

        Err(LexError {
            message: "Unterminated array suffix".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal (kept as text)
    fn number_literal(&mut self, first_digit: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(Token::Number(num_str, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let token = match ident.as_str() {
            "typedef" => Token::Typedef(loc),
            "struct" => Token::Struct(loc),
            "union" => Token::Union(loc),
            "enum" => Token::Enum(loc),
            "const" => Token::Const(loc),
            "volatile" => Token::Volatile(loc),
            "static" => Token::Static(loc),
            "auto" => Token::Auto(loc),
            "extern" => Token::Extern(loc),
            "register" => Token::Register(loc),
            "signed" => Token::Signed(loc),
            "unsigned" => Token::Unsigned(loc),
            "char" => Token::Char(loc),
            "short" => Token::Short(loc),
            "int" => Token::Int(loc),
            "long" => Token::Long(loc),
            "float" => Token::Float(loc),
            "double" => Token::Double(loc),
            "void" => Token::Void(loc),
            _ => Token::Ident(ident, loc),
        };

        Ok(token)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        if self.position < self.input.len() {
            Some(self.input[self.position])
        } else {
            None
        }
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        let pos = self.position + n;
        if pos < self.input.len() {
            Some(self.input[pos])
        } else {
            None
        }
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        if self.position >= self.input.len() {
            return None;
        }

        let ch = self.input[self.position];
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
