//! Grammar rules for the struct dialect
//!
//! ```text
//! root        ::= statement*
//! statement   ::= struct | union | ifdef_block | ifndef_block
//!               | function_pointer | field_declaration
//! struct      ::= "typedef"? "struct" NAME? "{" statement* "}" NAME? ";"?
//! union       ::= "union" NAME? "{" statement* "}" (NAME ","?)* ";"?
//! ifdef_block ::= "#" ("ifdef"|"if") NAME statement*
//!                 ("#" "else" statement*)? "#" "endif"
//! field_declaration ::= type_expr declarator ("," declarator)* ";"
//! declarator  ::= "*"* NAME array_suffix? (":" NUMBER)?
//! function_pointer ::= type_expr "*"* "(" "*" NAME ")" "(" param* ")" ";"
//! ```
//!
//! Semantic actions are applied inline: each rule returns canonical
//! [`Node`] values with defaults established before suffix overrides, so
//! there is no separate tree-building pass.  A single `field_declaration`
//! may expand to several nodes (C's multi-declarator form), and an
//! `#ifdef`/`#else` pair expands to two sibling conditional nodes with
//! opposite guard polarity, which is why statement parsing returns a `Vec`.

use crate::parser::ast::{
    AggregateKind, FunctionParam, FunctionReturn, Node, NodeKind, Qualifier,
};
use crate::parser::lexer::Token;
use crate::parser::parser::{ParseError, Parser};
use tracing::warn;

impl Parser {
    /// Parse one statement; returns every node it expands to.
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<Node>, ParseError> {
        match self.peek_token() {
            Token::Hash(_) => self.parse_conditional(),
            Token::Typedef(_) => Ok(vec![self.parse_struct()?]),
            Token::Struct(_) => {
                if self.aggregate_body_follows() {
                    Ok(vec![self.parse_struct()?])
                } else if self.forward_declaration_follows() {
                    self.consume_forward_declaration(AggregateKind::Struct)?;
                    Ok(Vec::new())
                } else {
                    self.parse_field_statement()
                }
            }
            Token::Union(_) => {
                if self.aggregate_body_follows() {
                    Ok(vec![self.parse_union()?])
                } else if self.forward_declaration_follows() {
                    self.consume_forward_declaration(AggregateKind::Union)?;
                    Ok(Vec::new())
                } else {
                    self.parse_field_statement()
                }
            }
            _ => self.parse_field_statement(),
        }
    }

    /// Whether the aggregate keyword at the cursor opens a definition body
    /// (`struct {` or `struct name {`) rather than typing a field.
    fn aggregate_body_follows(&self) -> bool {
        match self.peek_ahead(1) {
            Some(Token::LBrace(_)) => true,
            Some(Token::Ident(_, _)) => matches!(self.peek_ahead(2), Some(Token::LBrace(_))),
            _ => false,
        }
    }

    /// Whether the aggregate keyword introduces a body-less forward
    /// declaration (`struct name;`).
    fn forward_declaration_follows(&self) -> bool {
        matches!(self.peek_ahead(1), Some(Token::Ident(_, _)))
            && matches!(self.peek_ahead(2), Some(Token::Semicolon(_)))
    }

    /// Consume `struct name;` / `union name;`, registering the name as an
    /// opaque local aggregate so later non-pointer references to it are
    /// recognised as unresolvable.
    fn consume_forward_declaration(&mut self, kind: AggregateKind) -> Result<(), ParseError> {
        self.advance(); // aggregate keyword
        let name = self.expect_identifier()?;
        self.expect_semicolon("after forward declaration")?;
        let key = match kind {
            AggregateKind::Struct => format!("struct {name}"),
            AggregateKind::Union => format!("union {name}"),
        };
        self.local_aggregates.insert(key, None);
        Ok(())
    }

    /// struct ::= "typedef"? "struct" NAME? "{" statement* "}" NAME? ";"?
    ///
    /// A trailing name after the closing brace overrides the tag as the
    /// node's type (typedef form); a struct with neither gets a synthesized
    /// `unnamed_struct_N` as both type and name.
    pub(crate) fn parse_struct(&mut self) -> Result<Node, ParseError> {
        self.match_token(&Token::Typedef(self.current_location()));
        self.expect_token(
            &Token::Struct(self.current_location()),
            "Expected 'struct'",
        )?;

        let mut type_name: Option<String> = None;
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            type_name = Some(format!("struct {name}"));
        }

        self.expect_lbrace("after struct header")?;
        let fields = self.parse_body_statements("struct")?;
        self.expect_rbrace("after struct body")?;

        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            type_name = Some(name);
        }
        self.match_token(&Token::Semicolon(self.current_location()));

        let mut node = match type_name {
            Some(type_name) => Node::new(type_name),
            None => {
                let synthesized = format!("unnamed_struct_{}", self.unnamed_struct_counter);
                self.unnamed_struct_counter += 1;
                let mut node = Node::new(synthesized.clone());
                node.name = Some(synthesized);
                node
            }
        };
        self.local_aggregates.insert(
            node.type_name.clone(),
            Some((AggregateKind::Struct, fields.clone())),
        );
        node.kind = NodeKind::Aggregate {
            kind: AggregateKind::Struct,
            fields,
        };
        Ok(node)
    }

    /// union ::= "union" NAME? "{" statement* "}" (NAME ","?)* ";"?
    ///
    /// The node's type is always `"union"`; its name is the tag, the first
    /// trailing declarator name, or a synthesized `unnamed_union_N`.
    pub(crate) fn parse_union(&mut self) -> Result<Node, ParseError> {
        self.expect_token(&Token::Union(self.current_location()), "Expected 'union'")?;

        let mut tag: Option<String> = None;
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            tag = Some(name);
        }

        self.expect_lbrace("after union header")?;
        let fields = self.parse_body_statements("union")?;
        self.expect_rbrace("after union body")?;

        let mut trailing: Vec<String> = Vec::new();
        while let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            trailing.push(name);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.match_token(&Token::Semicolon(self.current_location()));

        let mut node = Node::new("union");
        node.name = match tag.clone().or_else(|| trailing.first().cloned()) {
            Some(name) => Some(name),
            None => {
                let synthesized = format!("unnamed_union_{}", self.unnamed_union_counter);
                self.unnamed_union_counter += 1;
                Some(synthesized)
            }
        };
        if let Some(tag) = tag {
            self.local_aggregates.insert(
                format!("union {tag}"),
                Some((AggregateKind::Union, fields.clone())),
            );
        }
        node.kind = NodeKind::Aggregate {
            kind: AggregateKind::Union,
            fields,
        };
        Ok(node)
    }

    /// Statements of an aggregate body, up to the closing brace.
    fn parse_body_statements(&mut self, ctx: &str) -> Result<Vec<Node>, ParseError> {
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return Err(self.error_here(format!("Unterminated {ctx} body, expected '}}'")));
            }
            fields.extend(self.parse_statement()?);
        }
        Ok(fields)
    }

    /// ifdef_block / ifndef_block.  Guard identifiers are resolved through
    /// the guard mapping here, at the point the conditional node is built;
    /// an `#else` branch produces a second node with negated polarity.
    pub(crate) fn parse_conditional(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect_token(&Token::Hash(self.current_location()), "Expected '#'")?;
        let directive = self.expect_identifier()?;
        let negated = match directive.as_str() {
            "ifdef" | "if" => false,
            "ifndef" => true,
            other => {
                return Err(
                    self.error_here(format!("Unsupported preprocessor directive '#{other}'"))
                )
            }
        };

        let guard_id = self.expect_identifier()?;
        let expression = self
            .guard_map
            .get(&guard_id)
            .cloned()
            .unwrap_or(guard_id);

        let mut then_fields: Vec<Node> = Vec::new();
        let mut else_fields: Option<Vec<Node>> = None;
        loop {
            if self.is_at_end() {
                return Err(
                    self.error_here("Unterminated conditional block, expected '#endif'".to_string())
                );
            }
            if self.hash_directive_is("else") {
                self.advance();
                self.advance();
                else_fields = Some(Vec::new());
                continue;
            }
            if self.hash_directive_is("endif") {
                self.advance();
                self.advance();
                break;
            }
            let statements = self.parse_statement()?;
            match &mut else_fields {
                Some(fields) => fields.extend(statements),
                None => then_fields.extend(statements),
            }
        }

        let mut nodes = vec![conditional_node(&expression, negated, then_fields)];
        if let Some(fields) = else_fields {
            nodes.push(conditional_node(&expression, !negated, fields));
        }
        Ok(nodes)
    }

    /// Whether the cursor sits on `#` followed by the given directive word.
    fn hash_directive_is(&self, word: &str) -> bool {
        self.check(&Token::Hash(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::Ident(name, _)) if name == word)
    }

    /// field_declaration or function_pointer, both of which open with a
    /// type expression.
    pub(crate) fn parse_field_statement(&mut self) -> Result<Vec<Node>, ParseError> {
        let (qualifier, type_name) = self.parse_type_expr()?;

        let mut leading_pointer = false;
        while self.match_token(&Token::Star(self.current_location())) {
            leading_pointer = true;
        }

        if self.check(&Token::LParen(self.current_location())) {
            let node = self.parse_function_pointer(qualifier, type_name, leading_pointer)?;
            return Ok(vec![node]);
        }

        // Multi-declarator expansion: each declarator becomes an independent
        // node sharing the base type but carrying its own suffixes.
        let mut nodes = Vec::new();
        let mut is_pointer = leading_pointer;
        loop {
            let name = self.expect_identifier()?;

            let mut is_array = false;
            let mut array_size = "0".to_string();
            if let Token::ArraySuffix(expression, _) = self.peek_token() {
                self.advance();
                is_array = true;
                let trimmed = expression.trim();
                if !trimmed.is_empty() {
                    array_size = trimmed.to_string();
                }
            }

            let mut bitfield = None;
            if self.match_token(&Token::Colon(self.current_location())) {
                if let Token::Number(width, _) = self.peek_token() {
                    self.advance();
                    bitfield = Some(width);
                } else {
                    return Err(self.error_here(format!(
                        "Expected bitfield width, found {}",
                        self.peek()
                    )));
                }
            }

            if let Some(mut node) = self.make_field(&type_name, name, is_pointer) {
                node.qualifier = qualifier;
                node.is_pointer = is_pointer;
                node.is_array = is_array;
                node.array_size = array_size;
                node.bitfield = bitfield;
                nodes.push(node);
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
            is_pointer = false;
            while self.match_token(&Token::Star(self.current_location())) {
                is_pointer = true;
            }
        }
        self.expect_semicolon("after field declaration")?;
        Ok(nodes)
    }

    /// Build a field node, inlining the children of a non-pointer reference
    /// to an aggregate defined earlier in this text.  A non-pointer
    /// reference to an opaque (forward-declared) local aggregate cannot be
    /// resolved; the field is skipped and logged rather than failing the
    /// parse, since downstream statistics tolerate a missing field better
    /// than an aborted run.  Pointer fields never embed and always stay
    /// leaf references.
    fn make_field(&self, type_name: &str, name: String, is_pointer: bool) -> Option<Node> {
        let mut node = Node::new(type_name);
        if !is_pointer {
            match self.local_aggregates.get(type_name) {
                Some(Some((kind, fields))) => {
                    node.kind = NodeKind::Aggregate {
                        kind: *kind,
                        fields: fields.clone(),
                    };
                }
                Some(None) => {
                    warn!(
                        field = %name,
                        r#type = %type_name,
                        "skipping field: local aggregate has no visible definition"
                    );
                    return None;
                }
                None => {}
            }
        }
        node.name = Some(name);
        Some(node)
    }

    /// type_expr ::= qualifier* type_name, where type_name is a (possibly
    /// multiword) builtin, `struct NAME`, `union NAME`, `enum NAME`, or a
    /// typedef name as the fallback.
    pub(crate) fn parse_type_expr(&mut self) -> Result<(Qualifier, String), ParseError> {
        let mut qualifier = Qualifier::None;
        loop {
            let next = match self.peek_token() {
                Token::Const(_) => Qualifier::Const,
                Token::Volatile(_) => Qualifier::Volatile,
                Token::Static(_) => Qualifier::Static,
                Token::Auto(_) => Qualifier::Auto,
                Token::Extern(_) => Qualifier::Extern,
                Token::Register(_) => Qualifier::Register,
                _ => break,
            };
            qualifier = next;
            self.advance();
        }

        if self.match_token(&Token::Struct(self.current_location())) {
            let name = self.expect_identifier()?;
            return Ok((qualifier, format!("struct {name}")));
        }
        if self.match_token(&Token::Union(self.current_location())) {
            let name = self.expect_identifier()?;
            return Ok((qualifier, format!("union {name}")));
        }
        if self.match_token(&Token::Enum(self.current_location())) {
            let name = self.expect_identifier()?;
            return Ok((qualifier, format!("enum {name}")));
        }

        if self.peek().keyword_str().is_some() {
            let mut words = Vec::new();
            while let Some(word) = self.peek().keyword_str() {
                words.push(word);
                self.advance();
            }
            return Ok((qualifier, words.join(" ")));
        }

        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            return Ok((qualifier, name));
        }

        Err(self.error_here(format!("Expected type, found {}", self.peek())))
    }

    /// function_pointer ::= type_expr "*"* "(" "*" NAME ")" "(" param* ")" ";"
    fn parse_function_pointer(
        &mut self,
        qualifier: Qualifier,
        return_type: String,
        return_pointer: bool,
    ) -> Result<Node, ParseError> {
        self.expect_lparen("before function pointer declarator")?;
        self.expect_token(
            &Token::Star(self.current_location()),
            "Expected '*' in function pointer declarator",
        )?;
        let name = self.expect_identifier()?;
        self.expect_rparen("after function pointer name")?;

        self.expect_lparen("before function pointer parameters")?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen(self.current_location())) {
            if self.is_at_end() {
                return Err(
                    self.error_here("Unterminated parameter list, expected ')'".to_string())
                );
            }
            let (param_qualifier, mut param_type) = self.parse_type_expr()?;
            if param_qualifier != Qualifier::None {
                param_type = format!("{} {}", param_qualifier.as_str(), param_type);
            }
            let mut is_pointer = false;
            while self.match_token(&Token::Star(self.current_location())) {
                is_pointer = true;
            }
            let mut param_name = None;
            if let Token::Ident(n, _) = self.peek_token() {
                self.advance();
                param_name = Some(n);
            }
            params.push(FunctionParam {
                type_name: param_type,
                is_pointer,
                name: param_name,
            });
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rparen("after function pointer parameters")?;
        self.expect_semicolon("after function pointer field")?;

        let mut node = Node::new("function pointer");
        node.name = Some(name);
        node.qualifier = qualifier;
        node.is_pointer = true; // a function pointer field is always a pointer
        node.kind = NodeKind::FunctionPointer {
            ret: FunctionReturn {
                type_name: return_type,
                is_pointer: return_pointer,
            },
            params,
        };
        Ok(node)
    }
}

/// Build a conditional wrapper node carrying the resolved guard expression,
/// `!`-prefixed when the branch is negated.
fn conditional_node(expression: &str, negated: bool, fields: Vec<Node>) -> Node {
    let guard = if negated {
        format!("!{expression}")
    } else {
        expression.to_string()
    };
    let mut node = Node::new("#ifdef block");
    node.name = Some(guard.clone());
    node.kind = NodeKind::Conditional { guard, fields };
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::GuardMap;

    fn parse(source: &str) -> Vec<Node> {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_all().unwrap()
    }

    fn struct_fields(node: &Node) -> &[Node] {
        node.fields().expect("expected aggregate node")
    }

    #[test]
    fn test_basic_struct() {
        let nodes = parse("struct vtime { unsigned long long starttime; unsigned int cpu; };");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].type_name, "struct vtime");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name.as_deref(), Some("starttime"));
        assert_eq!(fields[0].type_name, "unsigned long long");
        assert_eq!(fields[1].type_name, "unsigned int");
    }

    #[test]
    fn test_typedef_struct_name_overrides_tag() {
        let nodes = parse("typedef struct foo { int a; } foo_t;");
        assert_eq!(nodes[0].type_name, "foo_t");
    }

    #[test]
    fn test_unnamed_struct_gets_synthesized_name() {
        let nodes = parse("struct { int a; };");
        assert_eq!(nodes[0].type_name, "unnamed_struct_0");
        assert_eq!(nodes[0].name.as_deref(), Some("unnamed_struct_0"));
    }

    #[test]
    fn test_multi_declarator_expansion() {
        let nodes = parse("struct s { int *a, b, *c; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 3);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let pointers: Vec<_> = fields.iter().map(|f| f.is_pointer).collect();
        assert_eq!(pointers, vec![true, false, true]);
        assert!(fields.iter().all(|f| f.type_name == "int"));
    }

    #[test]
    fn test_array_and_bitfield_suffixes() {
        let nodes = parse("struct s { u64 stime[2]; unsigned flags:4; char tail[]; };");
        let fields = struct_fields(&nodes[0]);
        assert!(fields[0].is_array);
        assert_eq!(fields[0].array_size, "2");
        assert_eq!(fields[1].bitfield.as_deref(), Some("4"));
        assert!(fields[2].is_array);
        assert_eq!(fields[2].array_size, "0");
    }

    #[test]
    fn test_adjacent_bitfields_are_independent_nodes() {
        let nodes = parse("struct s { unsigned a:2, b:4; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].bitfield.as_deref(), Some("2"));
        assert_eq!(fields[1].bitfield.as_deref(), Some("4"));
    }

    #[test]
    fn test_nested_anonymous_union() {
        let nodes = parse("struct s { union { int a; char b; } u; int x; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields[0].type_name, "union");
        assert_eq!(fields[0].name.as_deref(), Some("u"));
        assert_eq!(fields[0].fields().unwrap().len(), 2);
    }

    #[test]
    fn test_unnamed_union_counter() {
        let nodes = parse("struct s { union { int a; }; union { int b; }; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields[0].name.as_deref(), Some("unnamed_union_0"));
        assert_eq!(fields[1].name.as_deref(), Some("unnamed_union_1"));
    }

    #[test]
    fn test_external_struct_reference_stays_leaf() {
        let nodes = parse("struct s { struct list_head list; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields[0].type_name, "struct list_head");
        assert!(fields[0].fields().is_none());
    }

    #[test]
    fn test_local_aggregate_reference_is_inlined() {
        let nodes = parse("struct inner { int a; int b; }; struct outer { struct inner in; };");
        let outer = &nodes[1];
        let fields = struct_fields(outer);
        assert_eq!(fields[0].type_name, "struct inner");
        assert_eq!(fields[0].fields().unwrap().len(), 2);
    }

    #[test]
    fn test_opaque_local_reference_is_skipped() {
        let nodes = parse("struct opaque; struct s { struct opaque o; int x; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_pointer_to_opaque_local_is_kept() {
        let nodes = parse("struct opaque; struct s { struct opaque *o; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 1);
        assert!(fields[0].is_pointer);
        assert!(fields[0].fields().is_none());
    }

    #[test]
    fn test_function_pointer_field() {
        let nodes = parse("struct ops { int (*open)(struct inode *inode, int flags); };");
        let fields = struct_fields(&nodes[0]);
        let field = &fields[0];
        assert_eq!(field.type_name, "function pointer");
        assert!(field.is_pointer);
        match &field.kind {
            NodeKind::FunctionPointer { ret, params } => {
                assert_eq!(ret.type_name, "int");
                assert!(!ret.is_pointer);
                assert_eq!(params.len(), 2);
                assert_eq!(params[0].type_name, "struct inode");
                assert!(params[0].is_pointer);
                assert_eq!(params[0].name.as_deref(), Some("inode"));
                assert_eq!(params[1].type_name, "int");
                assert!(!params[1].is_pointer);
            }
            other => panic!("expected function pointer, got {other:?}"),
        }
    }

    #[test]
    fn test_ifdef_block_structure() {
        let source = "struct s {\n#ifdef CONFIG_SMP\nint on_cpu;\n#endif\nint pid;\n};";
        let nodes = parse(source);
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 2);
        match &fields[0].kind {
            NodeKind::Conditional { guard, fields } => {
                assert_eq!(guard, "CONFIG_SMP");
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_ifdef_else_produces_two_branches() {
        let source = "struct s {\n#ifdef A\nint x;\n#else\nint y;\n#endif\n};";
        let nodes = parse(source);
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields.len(), 2);
        match (&fields[0].kind, &fields[1].kind) {
            (
                NodeKind::Conditional { guard: g0, .. },
                NodeKind::Conditional { guard: g1, .. },
            ) => {
                assert_eq!(g0, "A");
                assert_eq!(g1, "!A");
            }
            other => panic!("expected two conditionals, got {other:?}"),
        }
    }

    #[test]
    fn test_ifndef_negates_then_branch() {
        let source = "struct s {\n#ifndef A\nint x;\n#else\nint y;\n#endif\n};";
        let nodes = parse(source);
        let fields = struct_fields(&nodes[0]);
        match (&fields[0].kind, &fields[1].kind) {
            (
                NodeKind::Conditional { guard: g0, .. },
                NodeKind::Conditional { guard: g1, .. },
            ) => {
                assert_eq!(g0, "!A");
                assert_eq!(g1, "A");
            }
            other => panic!("expected two conditionals, got {other:?}"),
        }
    }

    #[test]
    fn test_guard_identifier_resolved_through_mapping() {
        let mut map = GuardMap::default();
        map.insert("C0".to_string(), "defined(A) && defined(B)".to_string());
        let source = "struct s {\n#if C0\nint x;\n#endif\n};";
        let mut parser = Parser::with_guard_map(source, map).unwrap();
        let nodes = parser.parse_all().unwrap();
        let fields = nodes[0].fields().unwrap();
        match &fields[0].kind {
            NodeKind::Conditional { guard, .. } => {
                assert_eq!(guard, "defined(A) && defined(B)");
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_qualifier_captured() {
        let nodes = parse("struct s { const char *name; volatile int state; };");
        let fields = struct_fields(&nodes[0]);
        assert_eq!(fields[0].qualifier, Qualifier::Const);
        assert!(fields[0].is_pointer);
        assert_eq!(fields[1].qualifier, Qualifier::Volatile);
    }

    #[test]
    fn test_rejects_unsupported_construct() {
        let mut parser = Parser::new("struct s { int a; } ; int f() { return 1; }").unwrap();
        assert!(parser.parse_all().is_err());
    }
}
