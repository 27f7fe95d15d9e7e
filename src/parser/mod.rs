//! Struct-dialect parser
//!
//! This module transforms normalised struct text into the canonical
//! structural tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parser state, helpers, and error types
//! - [`declarations`]: Grammar rules for structs, unions, fields,
//!   function pointers, and `#ifdef` blocks
//! - [`ast`]: Canonical node definitions
//!
//! # Supported dialect
//!
//! The grammar deliberately covers only what appears inside struct bodies:
//! struct/union/typedef declarations, nested structs and unions, field
//! declarations with pointer/array/bitfield suffixes and C's comma-separated
//! multi-declarator form, function-pointer fields, and
//! `#ifdef`/`#ifndef`/`#else`/`#endif` blocks.  Expressions, statements, and
//! arbitrary declarators are rejected with a positioned parse error.
//!
//! # Parser implementation
//!
//! Hand-written recursive descent with single-token lookahead.  Semantic
//! actions run during parsing: the parser emits canonical [`ast::Node`]
//! values directly, there is no separate raw-parse-tree walk.

pub mod ast;
pub mod declarations;
pub mod lexer;
pub mod parser;

pub use ast::{Node, NodeKind};
pub use parser::{ParseError, Parser};
