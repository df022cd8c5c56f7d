//! Abstract Syntax Tree types.
//!
//! The AST is an owning tree: every node owns its children, and the root
//! scope (held by the root manager) transitively owns everything parsed
//! into it. Type back-references (a struct member whose type is the
//! enclosing struct, say) are weak [`NodeId`] edges through [`TypeRef`],
//! never owning, so cycles cannot confuse lifetimes.
//!
//! Every node carries a source location, an optional grammar production
//! id, and an open metadata map that downstream passes and extension
//! libraries use to attach their own information.

use crate::span::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

/// Unique identifier of an AST node within one compilation job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Allocates node ids, unique across every file a compilation touches.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// A value in a node's extra-metadata map.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// One AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub location: SourceLocation,
    /// The grammar production that produced this node, when known.
    pub prod_id: Option<String>,
    /// Open string-keyed metadata attached by passes and extensions.
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            id,
            kind,
            location,
            prod_id: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_prod_id(mut self, prod_id: impl Into<String>) -> Self {
        self.prod_id = Some(prod_id.into());
        self
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: MetaValue) {
        self.metadata.insert(key.into(), value);
    }

    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        match &self.kind {
            NodeKind::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn as_scope_mut(&mut self) -> Option<&mut Scope> {
        match &mut self.kind {
            NodeKind::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn as_definition(&self) -> Option<&Definition> {
        match &self.kind {
            NodeKind::Definition(def) => Some(def),
            _ => None,
        }
    }
}

/// Round or square bracket pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Round,
    Square,
}

/// A reference to a type: either an inline type owned by the referring
/// node, or a weak back-edge to a type symbol defined elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Inline(Box<Node>),
    Symbol(NodeId),
}

/// The node variant set.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Scope(Scope),
    Definition(Definition),

    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    CharLiteral(char),

    /// A standalone bracket expression: `(body)` or `[body]`.
    Bracket {
        kind: BracketKind,
        body: Option<Box<Node>>,
    },
    /// Parameter passing: a call `f(x)` or an index `a[i]`.
    ParamPass {
        kind: BracketKind,
        operand: Box<Node>,
        param: Option<Box<Node>>,
    },
    /// Member linking: `module.name`.
    LinkOperator {
        operator: String,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    InfixOperator {
        operator: String,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    PrefixOperator {
        operator: String,
        operand: Box<Node>,
    },
    OutfixOperator {
        operator: String,
        operand: Box<Node>,
    },
    /// A comma-separated sequence, as in call arguments.
    List(Vec<Node>),

    IfStatement {
        condition: Box<Node>,
        body: Box<Node>,
        else_body: Option<Box<Node>>,
    },
    WhileStatement {
        condition: Box<Node>,
        body: Box<Node>,
    },
    ReturnStatement {
        operand: Option<Box<Node>>,
    },
    BreakStatement,
    ContinueStatement,

    IntegerType {
        bit_count: u16,
        signed: bool,
    },
    FloatType {
        bit_count: u16,
    },
    PointerType {
        content: TypeRef,
    },
    ReferenceType {
        content: TypeRef,
    },
    ArrayType {
        element: TypeRef,
        size: Option<u64>,
    },
    FunctionType {
        args: Vec<TypeRef>,
        ret: TypeRef,
    },
    UserType {
        name: String,
        body: Option<Box<Node>>,
    },
    VoidType,
}

/// Where a definition's storage and linkage live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    Function,
    Object,
    #[default]
    Global,
}

/// A definition attribute such as `expname`, `operation`, or `injection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub params: Vec<String>,
}

impl Modifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }
}

/// Binds a name within a scope to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub value: Box<Node>,
    pub modifiers: Vec<Modifier>,
    pub domain: Domain,
}

impl Definition {
    pub fn new(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
            modifiers: Vec::new(),
            domain: Domain::default(),
        }
    }
}

/// An ordered container of statements with an index of the definitions
/// among them. Later definitions of a name shadow earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    children: Vec<Node>,
    definitions: HashMap<String, usize>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a statement, indexing it when it is a definition.
    pub fn push(&mut self, node: Node) {
        if let NodeKind::Definition(def) = &node.kind {
            self.definitions.insert(def.name.clone(), self.children.len());
        }
        self.children.push(node);
    }

    /// Look up the definition node bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.definitions
            .get(name)
            .and_then(|&idx| self.children.get(idx))
    }

    /// Look up the value bound to `name`.
    pub fn get_value(&self, name: &str) -> Option<&Node> {
        self.get(name)
            .and_then(Node::as_definition)
            .map(|def| def.value.as_ref())
    }

    /// Consume the scope, yielding its statements in order.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Names defined in this scope, in definition order.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match &child.kind {
            NodeKind::Definition(def) => Some(def.name.as_str()),
            _ => None,
        })
    }
}

/// Render a node tree as indented text, one node per line.
pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    dump_into(node, 0, &mut out);
    out
}

fn dump_into(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match &node.kind {
        NodeKind::Scope(scope) => {
            let _ = writeln!(out, "Scope ({} children)", scope.len());
            for child in scope.children() {
                dump_into(child, depth + 1, out);
            }
        }
        NodeKind::Definition(def) => {
            let _ = writeln!(out, "Definition: {}", def.name);
            dump_into(&def.value, depth + 1, out);
        }
        NodeKind::Identifier(name) => {
            let _ = writeln!(out, "Identifier: {name}");
        }
        NodeKind::IntegerLiteral(value) => {
            let _ = writeln!(out, "IntegerLiteral: {value}");
        }
        NodeKind::FloatLiteral(value) => {
            let _ = writeln!(out, "FloatLiteral: {value}");
        }
        NodeKind::StringLiteral(value) => {
            let _ = writeln!(out, "StringLiteral: {value:?}");
        }
        NodeKind::CharLiteral(value) => {
            let _ = writeln!(out, "CharLiteral: {value:?}");
        }
        NodeKind::Bracket { kind, body } => {
            let _ = writeln!(out, "Bracket: {kind:?}");
            if let Some(body) = body {
                dump_into(body, depth + 1, out);
            }
        }
        NodeKind::ParamPass { kind, operand, param } => {
            let _ = writeln!(out, "ParamPass: {kind:?}");
            dump_into(operand, depth + 1, out);
            if let Some(param) = param {
                dump_into(param, depth + 1, out);
            }
        }
        NodeKind::LinkOperator { operator, lhs, rhs } => {
            let _ = writeln!(out, "LinkOperator: {operator}");
            dump_into(lhs, depth + 1, out);
            dump_into(rhs, depth + 1, out);
        }
        NodeKind::InfixOperator { operator, lhs, rhs } => {
            let _ = writeln!(out, "InfixOperator: {operator}");
            dump_into(lhs, depth + 1, out);
            dump_into(rhs, depth + 1, out);
        }
        NodeKind::PrefixOperator { operator, operand } => {
            let _ = writeln!(out, "PrefixOperator: {operator}");
            dump_into(operand, depth + 1, out);
        }
        NodeKind::OutfixOperator { operator, operand } => {
            let _ = writeln!(out, "OutfixOperator: {operator}");
            dump_into(operand, depth + 1, out);
        }
        NodeKind::List(items) => {
            let _ = writeln!(out, "List ({} items)", items.len());
            for item in items {
                dump_into(item, depth + 1, out);
            }
        }
        NodeKind::IfStatement { condition, body, else_body } => {
            let _ = writeln!(out, "IfStatement");
            dump_into(condition, depth + 1, out);
            dump_into(body, depth + 1, out);
            if let Some(else_body) = else_body {
                dump_into(else_body, depth + 1, out);
            }
        }
        NodeKind::WhileStatement { condition, body } => {
            let _ = writeln!(out, "WhileStatement");
            dump_into(condition, depth + 1, out);
            dump_into(body, depth + 1, out);
        }
        NodeKind::ReturnStatement { operand } => {
            let _ = writeln!(out, "ReturnStatement");
            if let Some(operand) = operand {
                dump_into(operand, depth + 1, out);
            }
        }
        NodeKind::BreakStatement => {
            let _ = writeln!(out, "BreakStatement");
        }
        NodeKind::ContinueStatement => {
            let _ = writeln!(out, "ContinueStatement");
        }
        NodeKind::IntegerType { bit_count, signed } => {
            let _ = writeln!(out, "IntegerType: {}{bit_count}", if *signed { "i" } else { "u" });
        }
        NodeKind::FloatType { bit_count } => {
            let _ = writeln!(out, "FloatType: f{bit_count}");
        }
        NodeKind::PointerType { content } => {
            let _ = writeln!(out, "PointerType");
            dump_type_ref(content, depth + 1, out);
        }
        NodeKind::ReferenceType { content } => {
            let _ = writeln!(out, "ReferenceType");
            dump_type_ref(content, depth + 1, out);
        }
        NodeKind::ArrayType { element, size } => {
            let _ = writeln!(out, "ArrayType (size: {size:?})");
            dump_type_ref(element, depth + 1, out);
        }
        NodeKind::FunctionType { args, ret } => {
            let _ = writeln!(out, "FunctionType ({} args)", args.len());
            for arg in args {
                dump_type_ref(arg, depth + 1, out);
            }
            dump_type_ref(ret, depth + 1, out);
        }
        NodeKind::UserType { name, body } => {
            let _ = writeln!(out, "UserType: {name}");
            if let Some(body) = body {
                dump_into(body, depth + 1, out);
            }
        }
        NodeKind::VoidType => {
            let _ = writeln!(out, "VoidType");
        }
    }
}

fn dump_type_ref(type_ref: &TypeRef, depth: usize, out: &mut String) {
    match type_ref {
        TypeRef::Inline(node) => dump_into(node, depth, out),
        TypeRef::Symbol(id) => {
            for _ in 0..depth {
                out.push_str("  ");
            }
            let _ = writeln!(out, "TypeSymbol: #{}", id.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("test.alusus", 1, 1)
    }

    fn node(alloc: &mut IdAllocator, kind: NodeKind) -> Node {
        Node::new(alloc.allocate(), kind, loc())
    }

    #[test]
    fn id_allocator_is_monotonic() {
        let mut alloc = IdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert!(a < b);
    }

    #[test]
    fn scope_indexes_definitions_in_order() {
        let mut alloc = IdAllocator::new();
        let mut scope = Scope::new();

        let value = node(&mut alloc, NodeKind::IntegerLiteral(1));
        scope.push(node(
            &mut alloc,
            NodeKind::Definition(Definition::new("a", value)),
        ));
        scope.push(node(&mut alloc, NodeKind::IntegerLiteral(9)));
        let value = node(&mut alloc, NodeKind::IntegerLiteral(2));
        scope.push(node(
            &mut alloc,
            NodeKind::Definition(Definition::new("b", value)),
        ));

        assert_eq!(scope.len(), 3);
        assert_eq!(
            scope.definition_names().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(matches!(
            scope.get_value("a").unwrap().kind,
            NodeKind::IntegerLiteral(1)
        ));
        assert!(scope.get("missing").is_none());
    }

    #[test]
    fn later_definition_shadows_earlier() {
        let mut alloc = IdAllocator::new();
        let mut scope = Scope::new();
        let first = node(&mut alloc, NodeKind::IntegerLiteral(1));
        scope.push(node(
            &mut alloc,
            NodeKind::Definition(Definition::new("x", first)),
        ));
        let second = node(&mut alloc, NodeKind::IntegerLiteral(2));
        scope.push(node(
            &mut alloc,
            NodeKind::Definition(Definition::new("x", second)),
        ));

        assert!(matches!(
            scope.get_value("x").unwrap().kind,
            NodeKind::IntegerLiteral(2)
        ));
    }

    #[test]
    fn metadata_round_trips() {
        let mut alloc = IdAllocator::new();
        let mut n = node(&mut alloc, NodeKind::VoidType);
        n.set_meta("expname", MetaValue::Str("printf".to_string()));
        assert_eq!(
            n.meta("expname"),
            Some(&MetaValue::Str("printf".to_string()))
        );
        assert_eq!(n.meta("other"), None);
    }

    #[test]
    fn type_back_edges_are_ids_not_owners() {
        let mut alloc = IdAllocator::new();
        let user = node(
            &mut alloc,
            NodeKind::UserType {
                name: "Point".to_string(),
                body: None,
            },
        );
        let user_id = user.id;
        // A pointer back at the enclosing type carries only the id.
        let pointer = node(
            &mut alloc,
            NodeKind::PointerType {
                content: TypeRef::Symbol(user_id),
            },
        );
        match &pointer.kind {
            NodeKind::PointerType {
                content: TypeRef::Symbol(id),
            } => assert_eq!(*id, user_id),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn dump_renders_nested_structure() {
        let mut alloc = IdAllocator::new();
        let mut scope = Scope::new();
        let value = node(&mut alloc, NodeKind::IntegerLiteral(42));
        scope.push(node(
            &mut alloc,
            NodeKind::Definition(Definition::new("answer", value)),
        ));
        let root = node(&mut alloc, NodeKind::Scope(scope));

        let text = dump(&root);
        assert!(text.starts_with("Scope (1 children)"));
        assert!(text.contains("Definition: answer"));
        assert!(text.contains("IntegerLiteral: 42"));
    }
}
