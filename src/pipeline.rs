//! End-to-end comparison pipeline
//!
//! Drives one struct text through preprocess, parse, and flatten, and two
//! texts through the full comparison: both sides are normalised
//! independently, then diffed structurally.

use crate::diff::{diff_structs, format_differences, DiffOptions, DiffRecord, Report};
use crate::parser::ast::Node;
use crate::parser::{ParseError, Parser};
use crate::preprocess::process_macros;
use crate::tree::{add_positions, flatten_guards};
use tracing::debug;

/// Outcome of comparing two struct texts.  Carries the normalised trees the
/// records refer to, so callers can resolve reported paths against them.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Comparison {
    pub left: Node,
    pub right: Node,
    pub differences: Vec<DiffRecord>,
    pub report: Report,
}

/// Normalise one struct text into its canonical flattened tree: expand and
/// strip macros, parse, and dissolve conditional wrappers.
pub fn parse_source(text: &str) -> Result<Node, ParseError> {
    let (normalised, guard_map) = process_macros(text);
    debug!(guards = guard_map.len(), "preprocessed struct text");

    let mut parser = Parser::with_guard_map(&normalised, guard_map)?;
    let mut nodes = parser.parse_all()?;
    if nodes.is_empty() {
        return Err(ParseError {
            message: "no struct definition found in input".to_string(),
            line: 1,
            column: 1,
            window: String::new(),
        });
    }
    // The first top-level definition is the subject; any earlier helper
    // aggregates have already been inlined into it where referenced.
    Ok(flatten_guards(&nodes.remove(0)))
}

/// Compare two versions of a struct definition.
pub fn compare_sources(
    left_text: &str,
    right_text: &str,
    options: &DiffOptions,
) -> Result<Comparison, ParseError> {
    let mut left = parse_source(left_text)?;
    let mut right = parse_source(right_text)?;
    if options.position {
        left = add_positions(&left);
        right = add_positions(&right);
    }

    let differences = diff_structs(&left, &right, options);
    debug!(records = differences.len(), "structural comparison finished");
    let report = format_differences(&differences);

    Ok(Comparison {
        left,
        right,
        differences,
        report,
    })
}
