//! Macro preprocessor for raw struct text
//!
//! Struct bodies lifted out of kernel headers are not directly parseable:
//! they carry annotation macros (`__rcu`, `__user`, ...), local `#define`
//! constants, backslash-continued directives, and `#if` conditions whose
//! expression syntax the struct grammar deliberately does not know.  This
//! module normalises such text into the dialect the parser accepts and
//! returns a [`GuardMap`] translating the opaque guard identifiers it
//! introduced (`C0`, `C1`, ...) back to the original expression text.
//!
//! [`process_macros`] is a pure function of its input; all counters are
//! local to one invocation.

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

/// Mapping from synthesized guard identifier (e.g. `C0`) to the original
/// conditional expression text it replaced.
pub type GuardMap = FxHashMap<String, String>;

/// Kernel-idiom macros that expand to nothing for layout purposes.
/// Substituted by plain text replacement; some keys are not identifiers.
const KNOWN_MACROS: &[(&str, &str)] = &[
    ("randomized_struct_fields_start", ""),
    ("randomized_struct_fields_end", ""),
    ("__rcu", ""),
    ("__user", ""),
    ("__percpu", ""),
    ("_struct_page_alignment", ""),
    ("__aligned(sizeof(unsigned long))", ""),
];

static ANON_ENUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)enum\s*\{.*?\}.*?;").expect("valid regex"));

/// Normalise raw struct text for parsing.
///
/// Returns the rewritten text together with the guard mapping for every
/// `#if`-style directive whose expression was replaced by an opaque
/// identifier.
pub fn process_macros(text: &str) -> (String, GuardMap) {
    let mut text = replace_known_macros(text);
    text = rewrite_anonymous_enums(&text);
    let defines = extract_defines(&text);
    text = strip_defines(&text);
    text = substitute_defines(&text, &defines);
    text = contract_continuations(&text);
    rewrite_directives(&text)
}

fn replace_known_macros(text: &str) -> String {
    let mut out = text.to_string();
    for (name, value) in KNOWN_MACROS {
        out = out.replace(name, value);
    }
    out
}

/// Rewrite each inline anonymous `enum { ... } ...;` block into a synthetic
/// integer field so the enum's presence survives structurally even though
/// enum values are out of scope.
fn rewrite_anonymous_enums(text: &str) -> String {
    let mut counter = 0usize;
    ANON_ENUM_RE
        .replace_all(text, |_: &regex::Captures<'_>| {
            let replacement = format!("int shortened_enum_value_{counter};");
            counter += 1;
            replacement
        })
        .into_owned()
}

fn is_define(line: &str) -> bool {
    line.starts_with("#define") || line.starts_with("# define")
}

/// Collect `#define NAME VALUE` lines into an ordered name → value list.
fn extract_defines(text: &str) -> Vec<(String, String)> {
    let mut defines = Vec::new();
    for line in text.lines().filter(|line| is_define(line)) {
        let stripped = line
            .replace("#define", "")
            .replace("# define", "")
            .trim()
            .to_string();
        let mut parts = stripped.split_whitespace();
        if let Some(name) = parts.next() {
            let value = parts.collect::<Vec<_>>().join(" ");
            defines.push((name.to_string(), value));
        }
    }
    defines
}

/// Remove `#define` lines; once their values are recorded they serve no
/// further purpose for parsing.
fn strip_defines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_define(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute every occurrence of each extracted macro name with its value.
/// Matches are identifier-boundary aware so a macro name never corrupts a
/// longer identifier that merely contains it.
fn substitute_defines(text: &str, defines: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (name, value) in defines {
        if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
            out = re.replace_all(&out, value.as_str()).into_owned();
        }
    }
    out
}

/// Join backslash-continued lines into single logical lines so `#if`
/// conditions are never split across lines.
fn contract_continuations(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(last) = out.last_mut() {
            let trimmed = last.trim_end();
            if let Some(head) = trimmed.strip_suffix('\\') {
                *last = format!("{} {}", head.trim_end(), line.trim());
                continue;
            }
        }
        out.push(line.to_string());
    }
    out.join("\n")
}

fn is_if_directive(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("#if") || trimmed.starts_with("#elif")
}

/// Replace the expression of every `#if`/`#ifdef`/`#ifndef` line with a
/// sequential opaque identifier, recording the original expression in the
/// returned mapping.  This keeps preprocessor expression syntax out of the
/// struct grammar while preserving the text for downstream analysis.
fn rewrite_directives(text: &str) -> (String, GuardMap) {
    let mut mappings = GuardMap::default();
    let mut id = 0usize;
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if !is_if_directive(line) {
                return line.to_string();
            }
            let mut parts = line.split_whitespace();
            let directive = match parts.next() {
                Some(directive) => directive,
                None => return line.to_string(),
            };
            let expression = parts.collect::<Vec<_>>().join(" ");
            if expression.is_empty() {
                return line.to_string();
            }
            let identifier = format!("C{id}");
            id += 1;
            let rewritten = format!("{directive} {identifier}");
            mappings.insert(identifier, expression);
            rewritten
        })
        .collect();
    (lines.join("\n"), mappings)
}

static DEFINED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"defined\s*\((.*?)\)").expect("valid regex"));
static IS_ENABLED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"IS_ENABLED\s*\((.*?)\)").expect("valid regex"));
static OPERATOR_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\||&&|<=|>=|==|<|>|\||&|,|=").expect("valid regex"));

/// Extract the set of configuration variables a guard expression depends on.
///
/// This is a heuristic, not a boolean-expression parser: negation is
/// irrelevant for dependency purposes, `defined(X)` and `IS_ENABLED(X)`
/// reduce to `X`, and the remainder is split on logical and comparison
/// operators.  Pure numbers are dropped.  An expression the heuristic cannot
/// decompose degrades gracefully to a single variable holding the whole
/// expression text.
pub fn guard_variables(expression: &str) -> Vec<String> {
    let mut expr = expression.replace('!', "");
    expr = DEFINED_RE.replace_all(&expr, "$1").into_owned();
    expr = IS_ENABLED_RE.replace_all(&expr, "$1").into_owned();
    expr = expr.replace("defined", "");
    expr = expr.replace(['(', ')'], "");

    let mut seen = FxHashSet::default();
    let mut variables = Vec::new();
    for part in OPERATOR_SPLIT_RE.split(&expr) {
        let part = part.trim();
        if part.is_empty() || part.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if seen.insert(part.to_string()) {
            variables.push(part.to_string());
        }
    }
    if variables.is_empty() && !expression.trim().is_empty() {
        variables.push(expression.trim().to_string());
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_macros_removed() {
        let (text, _) = process_macros("struct page { int flags __rcu; };");
        assert!(!text.contains("__rcu"));
    }

    #[test]
    fn test_define_extraction_and_substitution() {
        let source = "#define LEN 16\nstruct buf { char data[LEN]; };";
        let (text, _) = process_macros(source);
        assert!(!text.contains("#define"));
        assert!(text.contains("char data[16];"));
    }

    #[test]
    fn test_define_substitution_is_boundary_aware() {
        let source = "#define N 4\nstruct s { int N; int NODES; };";
        let (text, _) = process_macros(source);
        assert!(text.contains("int 4;"));
        assert!(text.contains("int NODES;"));
    }

    #[test]
    fn test_multiline_directive_contraction() {
        let source = "#if defined(A) || \\\n    defined(B)\nint x;\n#endif";
        let (text, mappings) = process_macros(source);
        assert!(text.contains("#if C0"));
        assert_eq!(
            mappings.get("C0").map(String::as_str),
            Some("defined(A) || defined(B)")
        );
    }

    #[test]
    fn test_anonymous_enum_rewritten() {
        let source = "struct s {\nenum { A, B } mode;\nint x;\n};";
        let (text, _) = process_macros(source);
        assert!(text.contains("int shortened_enum_value_0;"));
        assert!(!text.contains("enum {"));
    }

    #[test]
    fn test_directive_mapping_is_sequential() {
        let source = "#ifdef CONFIG_SMP\nint a;\n#endif\n#if defined(X) && defined(Y)\nint b;\n#endif";
        let (text, mappings) = process_macros(source);
        assert!(text.contains("#ifdef C0"));
        assert!(text.contains("#if C1"));
        assert_eq!(mappings.get("C0").map(String::as_str), Some("CONFIG_SMP"));
        assert_eq!(
            mappings.get("C1").map(String::as_str),
            Some("defined(X) && defined(Y)")
        );
    }

    #[test]
    fn test_guard_variables_simple() {
        assert_eq!(guard_variables("CONFIG_SMP"), vec!["CONFIG_SMP"]);
    }

    #[test]
    fn test_guard_variables_complex_expression() {
        let vars = guard_variables("defined(A) && (defined(B) || IS_ENABLED(C))");
        assert_eq!(vars, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_guard_variables_drops_numbers() {
        let vars = guard_variables("NR_CPUS > 64");
        assert_eq!(vars, vec!["NR_CPUS"]);
    }

    #[test]
    fn test_guard_variables_negation_ignored() {
        let vars = guard_variables("!defined(CONFIG_64BIT)");
        assert_eq!(vars, vec!["CONFIG_64BIT"]);
    }
}
