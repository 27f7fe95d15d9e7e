//! Canonical structural tree definitions
//!
//! One [`Node`] per struct, union, field, function-pointer field, or
//! conditional block.  The variant is decided at construction time
//! ([`NodeKind`]); after flattening no [`NodeKind::Conditional`] node
//! remains anywhere in a tree.
//!
//! Nodes serialize to the nested key-value shape used by downstream
//! consumers: `type`, `name`, `is_pointer`, `is_array`, `array_size`,
//! `bitfield`, `qualifier`, `guards`, `fields`, `return`, `parameters`,
//! `pos`.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Storage-class / cv qualifier on a field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qualifier {
    #[default]
    None,
    Const,
    Volatile,
    Static,
    Auto,
    Extern,
    Register,
}

impl Qualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::None => "",
            Qualifier::Const => "const",
            Qualifier::Volatile => "volatile",
            Qualifier::Static => "static",
            Qualifier::Auto => "auto",
            Qualifier::Extern => "extern",
            Qualifier::Register => "register",
        }
    }
}

impl Serialize for Qualifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Whether an aggregate node is a `struct` or a `union`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Struct,
    Union,
}

/// Return type of a function-pointer field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FunctionReturn {
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_pointer: bool,
}

/// One parameter of a function-pointer field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FunctionParam {
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_pointer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Variant-specific payload of a [`Node`], decided at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain leaf field (base type, external struct reference, typedef, ...).
    Base,
    /// Embedded struct or union with its member fields inlined as children.
    Aggregate {
        kind: AggregateKind,
        fields: Vec<Node>,
    },
    /// Function-pointer field with return type and ordered parameter list.
    FunctionPointer {
        ret: FunctionReturn,
        params: Vec<FunctionParam>,
    },
    /// `#ifdef`-block wrapper; only present before flattening.  The guard
    /// carries a `!` prefix when it came from a negated branch.
    Conditional { guard: String, fields: Vec<Node> },
}

impl NodeKind {
    /// Child fields, for the variants that have them.
    pub fn fields(&self) -> Option<&[Node]> {
        match self {
            NodeKind::Aggregate { fields, .. } | NodeKind::Conditional { fields, .. } => {
                Some(fields)
            }
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            NodeKind::Aggregate { fields, .. } | NodeKind::Conditional { fields, .. } => {
                Some(fields)
            }
            _ => None,
        }
    }
}

/// One node of the canonical tree.
///
/// Attribute defaults (`is_pointer = false`, `is_array = false`,
/// `array_size = "0"`, empty guards, no qualifier) are established at
/// construction; grammar rules override them as suffixes are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Field name; absent for anonymous embedded aggregates and for named
    /// top-level structs (whose identity lives in `type_name`).
    pub name: Option<String>,
    /// Rendered type descriptor: `"int"`, `"unsigned long long"`,
    /// `"struct foo"`, `"union"`, `"function pointer"`, `"#ifdef block"`,
    /// a typedef name, or a synthesized `unnamed_struct_N`.
    pub type_name: String,
    pub qualifier: Qualifier,
    pub is_pointer: bool,
    pub is_array: bool,
    /// Array-size expression, verbatim; `"0"` when not an array or `[]`.
    pub array_size: String,
    /// Bitfield width as source text.
    pub bitfield: Option<String>,
    /// Accumulated conditional-guard expressions, outer to inner.
    /// Established by the flattener.
    pub guards: Vec<String>,
    /// Sibling index as a string; only present after position marking.
    pub pos: Option<String>,
    pub kind: NodeKind,
}

impl Node {
    /// Create a node with default field attributes.
    pub fn new(type_name: impl Into<String>) -> Self {
        Node {
            name: None,
            type_name: type_name.into(),
            qualifier: Qualifier::None,
            is_pointer: false,
            is_array: false,
            array_size: "0".to_string(),
            bitfield: None,
            guards: Vec::new(),
            pos: None,
            kind: NodeKind::Base,
        }
    }

    /// Identity key used for path addressing: the name, falling back to the
    /// type for unnamed nodes.
    pub fn identity_key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.type_name)
    }

    /// Child fields, for aggregate and conditional nodes.
    pub fn fields(&self) -> Option<&[Node]> {
        self.kind.fields()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.type_name)?;
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        map.serialize_entry("is_pointer", &self.is_pointer)?;
        map.serialize_entry("is_array", &self.is_array)?;
        map.serialize_entry("array_size", &self.array_size)?;
        if let Some(bitfield) = &self.bitfield {
            map.serialize_entry("bitfield", bitfield)?;
        }
        map.serialize_entry("qualifier", &self.qualifier)?;
        map.serialize_entry("guards", &self.guards)?;
        if let Some(pos) = &self.pos {
            map.serialize_entry("pos", pos)?;
        }
        match &self.kind {
            NodeKind::Base => {}
            NodeKind::Aggregate { fields, .. } | NodeKind::Conditional { fields, .. } => {
                map.serialize_entry("fields", fields)?;
            }
            NodeKind::FunctionPointer { ret, params } => {
                map.serialize_entry("return", ret)?;
                map.serialize_entry("parameters", params)?;
            }
        }
        map.end()
    }
}
