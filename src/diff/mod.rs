//! Structural comparison of two canonical trees
//!
//! Fields are matched by identity (name, falling back to type for unnamed
//! nodes), not by position, so an inserted field shows up as one addition
//! instead of a cascade of spurious changes.  Each divergence becomes a
//! [`DiffRecord`]: an addition, a deletion, or a change listing the
//! attributes that differ.  Paths address nodes through nesting levels and
//! are reported dot-joined (`gran.parent.child`).

use crate::parser::ast::{FunctionParam, Node, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::ser::{Serialize, Serializer};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Knobs for the comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Also compare sibling positions (`pos` attributes and parameter
    /// ordering), so layout reordering is reported even when membership is
    /// unchanged.
    pub position: bool,
}

/// Classification of one divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Addition,
    Deletion,
    Change,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Addition => "addition",
            DiffKind::Deletion => "deletion",
            DiffKind::Change => "change",
        }
    }
}

impl Serialize for DiffKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One differing attribute inside a change record.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub attribute: String,
    pub old: Value,
    pub new: Value,
}

/// One reported divergence between the two trees.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRecord {
    pub kind: DiffKind,
    /// Dot-joined identity path of the affected node.
    pub path: String,
    /// Differing attributes; only populated for changes.
    pub changes: Vec<AttributeChange>,
}

impl DiffRecord {
    /// Serialize to the report shape: `difference_type` (optionally dropped,
    /// the grouped report already buckets records by kind), `name` holding
    /// the dotted path, and one `{attribute: {old, new}}` entry per changed
    /// attribute.
    pub fn to_value(&self, include_kind: bool) -> Value {
        let mut map = serde_json::Map::new();
        if include_kind {
            map.insert("difference_type".to_string(), json!(self.kind));
        }
        map.insert("name".to_string(), json!(self.path));
        for change in &self.changes {
            map.insert(
                change.attribute.clone(),
                json!({"old": change.old, "new": change.new}),
            );
        }
        Value::Object(map)
    }
}

impl Serialize for DiffRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value(true).serialize(serializer)
    }
}

/// Difference records grouped by kind for human-facing summaries.
/// Additions and deletions reduce to their paths; changes keep the
/// attribute lists but drop the redundant kind tag.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Report {
    pub additions: Vec<String>,
    pub deletions: Vec<String>,
    pub changes: Vec<Value>,
}

/// Compare two canonical trees (flattened, and position-marked when
/// `options.position` is set) and return every divergence.
pub fn diff_structs(left: &Node, right: &Node, options: &DiffOptions) -> Vec<DiffRecord> {
    let mut records = Vec::new();
    let root_changes = diff_node(left, right, options);
    if !root_changes.is_empty() {
        records.push(DiffRecord {
            kind: DiffKind::Change,
            path: String::new(),
            changes: root_changes,
        });
    }

    let mut visited: FxHashSet<String> = FxHashSet::default();
    walk_left(left, right, "", &mut visited, &mut records, options);
    walk_right(right, "", &visited, &mut records);

    // Repeated identity keys at one level make later entries shadow earlier
    // ones; drop the duplicate records that produces.
    let mut unique: Vec<DiffRecord> = Vec::with_capacity(records.len());
    for mut record in records {
        record.path = clean_path(&record.path);
        if !unique.contains(&record) {
            unique.push(record);
        }
    }
    unique
}

/// Left-side walk: emits changes and deletions, and marks every matched
/// right-side path as visited for the addition pass.
fn walk_left(
    left: &Node,
    right: &Node,
    prefix: &str,
    visited: &mut FxHashSet<String>,
    records: &mut Vec<DiffRecord>,
    options: &DiffOptions,
) {
    let index: FxHashMap<&str, &Node> = right
        .fields()
        .unwrap_or(&[])
        .iter()
        .map(|field| (field.identity_key(), field))
        .collect();

    for child in left.fields().unwrap_or(&[]) {
        let path = join(prefix, child.identity_key());
        match index.get(child.identity_key()) {
            Some(counterpart) => {
                visited.insert(path.clone());
                let changes = diff_node(child, counterpart, options);
                if !changes.is_empty() {
                    records.push(DiffRecord {
                        kind: DiffKind::Change,
                        path: path.clone(),
                        changes,
                    });
                }
                walk_left(child, counterpart, &path, visited, records, options);
            }
            None => {
                debug!(path = %path, "no counterpart on the right side, recording deletion");
                record_subtree(child, &path, DiffKind::Deletion, records);
            }
        }
    }
}

/// Right-side walk: anything not visited by the left walk is an addition.
fn walk_right(
    right: &Node,
    prefix: &str,
    visited: &FxHashSet<String>,
    records: &mut Vec<DiffRecord>,
) {
    for child in right.fields().unwrap_or(&[]) {
        let path = join(prefix, child.identity_key());
        if visited.contains(&path) {
            walk_right(child, &path, visited, records);
        } else {
            record_subtree(child, &path, DiffKind::Addition, records);
        }
    }
}

/// Emit one record per node of an unmatched subtree, so removing an
/// aggregate reports every member it took with it.
fn record_subtree(node: &Node, path: &str, kind: DiffKind, records: &mut Vec<DiffRecord>) {
    records.push(DiffRecord {
        kind,
        path: path.to_string(),
        changes: Vec::new(),
    });
    for child in node.fields().unwrap_or(&[]) {
        record_subtree(child, &join(path, child.identity_key()), kind, records);
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}

/// Attribute-level comparison of two matched nodes.
fn diff_node(left: &Node, right: &Node, options: &DiffOptions) -> Vec<AttributeChange> {
    let mut changes = Vec::new();
    let mut push = |attribute: &str, old: Value, new: Value| {
        changes.push(AttributeChange {
            attribute: attribute.to_string(),
            old,
            new,
        });
    };

    if left.type_name != right.type_name {
        push("type", json!(left.type_name), json!(right.type_name));
    }
    if left.is_pointer != right.is_pointer {
        push("is_pointer", json!(left.is_pointer), json!(right.is_pointer));
    }
    if left.is_array != right.is_array {
        push("is_array", json!(left.is_array), json!(right.is_array));
    }
    if left.array_size != right.array_size {
        push("array_size", json!(left.array_size), json!(right.array_size));
    }
    if left.bitfield != right.bitfield {
        push("bitfield", json!(left.bitfield), json!(right.bitfield));
    }
    if left.qualifier != right.qualifier {
        push(
            "qualifier",
            json!(left.qualifier.as_str()),
            json!(right.qualifier.as_str()),
        );
    }
    if guard_sets_differ(&left.guards, &right.guards) {
        push("guards", json!(left.guards), json!(right.guards));
    }
    if options.position && left.pos != right.pos {
        push("pos", json!(left.pos), json!(right.pos));
    }

    if let (
        NodeKind::FunctionPointer {
            ret: left_ret,
            params: left_params,
        },
        NodeKind::FunctionPointer {
            ret: right_ret,
            params: right_params,
        },
    ) = (&left.kind, &right.kind)
    {
        if left_ret != right_ret {
            push("return", json!(left_ret), json!(right_ret));
        }
        let left_keys = parameter_keys(left_params, options.position);
        let right_keys = parameter_keys(right_params, options.position);
        if left_keys != right_keys {
            push("parameters", json!(left_keys), json!(right_keys));
        }
    }

    changes
}

/// Guards are compared as sets: reordering the same guard expressions is
/// not a change, gaining or losing one is.
fn guard_sets_differ(left: &[String], right: &[String]) -> bool {
    let left_set: FxHashSet<&str> = left.iter().map(String::as_str).collect();
    let right_set: FxHashSet<&str> = right.iter().map(String::as_str).collect();
    left_set != right_set
}

/// Canonical parameter keys, compared as a sorted multiset.  Names are
/// dropped (a rename is not a signature change); the declaration index is
/// prefixed only under position tracking, making plain comparison
/// order-insensitive.
fn parameter_keys(params: &[FunctionParam], position: bool) -> Vec<String> {
    let mut keys: Vec<String> = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let key = if param.is_pointer {
                format!("*{}", param.type_name)
            } else {
                param.type_name.clone()
            };
            if position {
                format!("{index}:{key}")
            } else {
                key
            }
        })
        .collect();
    keys.sort();
    keys
}

/// Rewrite an internal slash-joined path into the reported dotted form.
pub fn clean_path(path: &str) -> String {
    path.replace('/', ".")
}

/// Failure to address a node by path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no field named '{segment}' under '{parent}'")]
    Missing { segment: String, parent: String },
    #[error("'{segment}' is not an aggregate, cannot descend further")]
    NotAggregate { segment: String },
}

/// Walk an identity path (dotted or slash-joined) down from the root.
pub fn resolve_path<'a>(root: &'a Node, path: &str) -> Result<&'a Node, ResolveError> {
    let mut current = root;
    for segment in path.split(['.', '/']).filter(|segment| !segment.is_empty()) {
        let fields = current.fields().ok_or_else(|| ResolveError::NotAggregate {
            segment: current.identity_key().to_string(),
        })?;
        current = fields
            .iter()
            .find(|field| field.identity_key() == segment)
            .ok_or_else(|| ResolveError::Missing {
                segment: segment.to_string(),
                parent: current.identity_key().to_string(),
            })?;
    }
    Ok(current)
}

/// Group raw records into the summary report shape.
pub fn format_differences(records: &[DiffRecord]) -> Report {
    let mut report = Report::default();
    for record in records {
        match record.kind {
            DiffKind::Addition => report.additions.push(record.path.clone()),
            DiffKind::Deletion => report.deletions.push(record.path.clone()),
            DiffKind::Change => report.changes.push(record.to_value(false)),
        }
    }
    report
}
