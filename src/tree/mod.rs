//! Whole-tree rewrites applied between parsing and diffing
//!
//! Three passes, each taking a tree by reference and returning a rewritten
//! copy (or rewriting a serialized value in place):
//! - [`flatten_guards`]: dissolve conditional wrapper nodes into per-field
//!   guard lists
//! - [`add_positions`]: stamp each field with its sibling index
//! - [`clean_value`]: strip default-valued attributes from serialized trees
//!   for compact human-facing output

use crate::parser::ast::{Node, NodeKind};
use serde_json::Value;

/// Rewrite a tree so no conditional wrapper node remains below the root.
///
/// Each wrapper's guard expression is appended to the `guards` list of every
/// node it covered, and the covered fields are spliced into the wrapper's
/// place, preserving order.  Guards accumulate outermost first, so a field
/// nested under `#ifdef A` then `#ifdef B` ends with `["A", "B"]`.  A tree
/// whose root is itself a conditional keeps that root node; only descendants
/// are dissolved.
///
/// The pass is idempotent: a flattened tree has no wrappers left to dissolve
/// and inherits nothing new.
pub fn flatten_guards(root: &Node) -> Node {
    let mut node = root.clone();
    flatten_fields(&mut node, &[]);
    node
}

fn flatten_fields(node: &mut Node, inherited: &[String]) {
    let drained = match node.kind.fields_mut() {
        Some(fields) => std::mem::take(fields),
        None => return,
    };
    let mut rebuilt = Vec::with_capacity(drained.len());
    for mut child in drained {
        if let NodeKind::Conditional { guard, .. } = &child.kind {
            let mut nested = inherited.to_vec();
            nested.push(guard.clone());
            flatten_fields(&mut child, &nested);
            if let Some(fields) = child.kind.fields_mut() {
                rebuilt.append(fields);
            }
        } else {
            child.guards.extend(inherited.iter().cloned());
            flatten_fields(&mut child, inherited);
            rebuilt.push(child);
        }
    }
    if let Some(fields) = node.kind.fields_mut() {
        *fields = rebuilt;
    }
}

/// Return a copy of the tree with every field carrying its sibling index in
/// `pos` (as a string, root excluded).  Applied before position-sensitive
/// diffing so reordering shows up as an attribute change.
pub fn add_positions(root: &Node) -> Node {
    let mut node = root.clone();
    mark_positions(&mut node);
    node
}

fn mark_positions(node: &mut Node) {
    if let Some(fields) = node.kind.fields_mut() {
        for (index, child) in fields.iter_mut().enumerate() {
            child.pos = Some(index.to_string());
            mark_positions(child);
        }
    }
}

/// Serialize a tree to its nested key-value form.
pub fn to_value(node: &Node) -> Value {
    serde_json::to_value(node).unwrap_or(Value::Null)
}

/// Strip default-valued attributes from a serialized tree, in place:
/// `false` booleans, empty strings, empty lists, and `"array_size": "0"`.
/// Lossless for diffing purposes since every removed entry is recoverable
/// as its default.
pub fn clean_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, entry| match entry {
                Value::Bool(flag) => *flag,
                Value::String(text) => !text.is_empty() && !(key == "array_size" && text == "0"),
                Value::Array(items) => !items.is_empty(),
                _ => true,
            });
            for entry in map.values_mut() {
                clean_value(entry);
            }
        }
        Value::Array(items) => {
            for entry in items.iter_mut() {
                clean_value(entry);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use serde_json::json;

    fn parse_one(source: &str) -> Node {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_all().unwrap().remove(0)
    }

    #[test]
    fn test_flatten_pushes_guard_onto_fields() {
        let tree = parse_one("struct s {\n#ifdef CONFIG_SMP\nint on_cpu;\nint wake_cpu;\n#endif\nint pid;\n};");
        let flat = flatten_guards(&tree);
        let fields = flat.fields().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name.as_deref(), Some("on_cpu"));
        assert_eq!(fields[0].guards, vec!["CONFIG_SMP"]);
        assert_eq!(fields[1].guards, vec!["CONFIG_SMP"]);
        assert!(fields[2].guards.is_empty());
    }

    #[test]
    fn test_flatten_accumulates_nested_guards_outermost_first() {
        let source = "struct s {\n#ifdef A\n#ifdef B\nint x;\n#endif\n#endif\n};";
        let flat = flatten_guards(&parse_one(source));
        let fields = flat.fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].guards, vec!["A", "B"]);
    }

    #[test]
    fn test_flatten_else_branch_negates_guard() {
        let source = "struct s {\n#ifdef A\nint x;\n#else\nint y;\n#endif\n};";
        let flat = flatten_guards(&parse_one(source));
        let fields = flat.fields().unwrap();
        assert_eq!(fields[0].guards, vec!["A"]);
        assert_eq!(fields[1].guards, vec!["!A"]);
    }

    #[test]
    fn test_flatten_guard_applies_to_nested_aggregate_members() {
        let source = "struct s {\n#ifdef A\nstruct { int x; } inner;\n#endif\n};";
        let flat = flatten_guards(&parse_one(source));
        let fields = flat.fields().unwrap();
        assert_eq!(fields[0].guards, vec!["A"]);
        assert_eq!(fields[0].fields().unwrap()[0].guards, vec!["A"]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let source = "struct s {\n#ifdef A\nint x;\n#endif\nint y;\n};";
        let once = flatten_guards(&parse_one(source));
        let twice = flatten_guards(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_positions_follow_sibling_order() {
        let tree = parse_one("struct s { int a; struct { int c; } b; };");
        let marked = add_positions(&tree);
        assert!(marked.pos.is_none());
        let fields = marked.fields().unwrap();
        assert_eq!(fields[0].pos.as_deref(), Some("0"));
        assert_eq!(fields[1].pos.as_deref(), Some("1"));
        assert_eq!(fields[1].fields().unwrap()[0].pos.as_deref(), Some("0"));
    }

    #[test]
    fn test_to_value_emits_nested_shape() {
        let tree = parse_one("struct s { int a; };");
        let value = to_value(&tree);
        assert_eq!(value["type"], "struct s");
        assert_eq!(value["fields"][0]["name"], "a");
        assert_eq!(value["fields"][0]["is_pointer"], false);
    }

    #[test]
    fn test_clean_strips_defaults_and_keeps_set_values() {
        let mut value = json!({
            "type": "int",
            "name": "a",
            "is_pointer": false,
            "is_array": true,
            "array_size": "0",
            "qualifier": "",
            "guards": [],
        });
        clean_value(&mut value);
        assert_eq!(
            value,
            json!({"type": "int", "name": "a", "is_array": true})
        );
    }

    #[test]
    fn test_clean_recurses_into_fields() {
        let mut value = json!({
            "type": "struct s",
            "is_pointer": false,
            "fields": [
                {"type": "int", "name": "a", "is_pointer": false, "guards": ["A"]}
            ]
        });
        clean_value(&mut value);
        assert_eq!(
            value,
            json!({
                "type": "struct s",
                "fields": [{"type": "int", "name": "a", "guards": ["A"]}]
            })
        );
    }
}
