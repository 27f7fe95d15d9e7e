//! # Introduction
//!
//! structdrift parses C `struct` definitions extracted from historical kernel
//! source snapshots into a canonical structural tree and diffs two such trees
//! (the same struct in two versions) into a list of typed difference records.
//! It targets the restricted declaration dialect actually found inside struct
//! bodies: fields with pointer/array/bitfield suffixes, nested structs and
//! unions, function-pointer fields, and `#ifdef`/`#ifndef`/`#else`/`#endif`
//! blocks.  It is not a general-purpose C parser.
//!
//! ## Processing pipeline
//!
//! ```text
//! Raw text → Preprocessor → Lexer → Parser → Flattener → Canonical tree
//! Canonical tree × 2 → Differ → Diff records
//! ```
//!
//! 1. [`preprocess`]: normalises raw struct text: inlines known kernel
//!    macros and local `#define` values, contracts backslash-continued
//!    lines, and rewrites complex `#if` expressions into opaque guard
//!    identifiers with a side mapping back to the original expression.
//! 2. [`parser`]: tokenises the normalised text and builds the structural
//!    tree in a single pass (semantic actions run during parsing).
//! 3. [`tree`]: flattens conditional-block wrapper nodes by pushing their
//!    guard expressions down onto descendant fields, and provides position
//!    marking and output cleanup.
//! 4. [`diff`]: walks two canonical trees in lock-step by a stable
//!    name-addressed path scheme and reports additions, deletions, and
//!    attribute changes.
//! 5. [`pipeline`]: end-to-end comparison of two raw struct sources.
//!
//! Parsing and diffing of independent structs share no state: every parse
//! builds a fresh tree owned by the caller, so batch drivers can fan out
//! across threads freely.

pub mod diff;
pub mod parser;
pub mod pipeline;
pub mod preprocess;
pub mod tree;

pub use diff::{DiffKind, DiffOptions, DiffRecord, Report};
pub use parser::{Node, ParseError, Parser};
pub use pipeline::{compare_sources, parse_source, Comparison};
