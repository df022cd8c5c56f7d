//! Qualified-name resolution over the AST.
//!
//! The seeker walks a reference expression (an identifier or a chain of
//! link operators like `graphics.color`) against a stack of scopes and
//! reports every match to a visitor callback. Resolution is a pure
//! function of the AST graph and the stack: the seeker holds no state of
//! its own.
//!
//! The stack is ordered oldest-first; lookups probe it newest-first, so
//! an inner scope shadows an outer one but the visitor can keep moving to
//! see the shadowed bindings too.

use crate::ast::{Node, NodeKind, Scope};

/// What the visitor wants the seeker to do after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekVerdict {
    /// Keep searching for further matches.
    Move,
    /// Stop the traversal.
    Stop,
}

#[derive(Debug, Default)]
pub struct Seeker;

impl Seeker {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `reference` against `stack`, invoking `visitor` with the
    /// value of each matching definition. Returns whether at least one
    /// match was visited.
    pub fn seek<'a>(
        &self,
        reference: &Node,
        stack: &[&'a Scope],
        visitor: &mut dyn FnMut(&'a Node) -> SeekVerdict,
    ) -> bool {
        let mut found = false;
        self.seek_inner(reference, stack, visitor, &mut found);
        found
    }

    /// Resolve `reference` to its first match.
    pub fn find_first<'a>(&self, reference: &Node, stack: &[&'a Scope]) -> Option<&'a Node> {
        let mut first = None;
        self.seek(reference, stack, &mut |node| {
            first = Some(node);
            SeekVerdict::Stop
        });
        first
    }

    /// Returns `SeekVerdict::Stop` when the traversal should halt.
    fn seek_inner<'a>(
        &self,
        reference: &Node,
        stack: &[&'a Scope],
        visitor: &mut dyn FnMut(&'a Node) -> SeekVerdict,
        found: &mut bool,
    ) -> SeekVerdict {
        match &reference.kind {
            NodeKind::Identifier(name) => {
                for scope in stack.iter().rev() {
                    if let Some(value) = scope.get_value(name) {
                        *found = true;
                        if visitor(value) == SeekVerdict::Stop {
                            return SeekVerdict::Stop;
                        }
                    }
                }
                SeekVerdict::Move
            }
            NodeKind::LinkOperator { lhs, rhs, .. } => {
                // Resolve the left side, then continue the walk inside
                // each scope-valued match. A left-side match alone does
                // not make the whole reference found.
                let mut lhs_found = false;
                let mut verdict = SeekVerdict::Move;
                self.seek_inner(
                    lhs,
                    stack,
                    &mut |target| {
                        let Some(inner) = scope_of(target) else {
                            return SeekVerdict::Move;
                        };
                        let inner_stack = [inner];
                        verdict = self.seek_inner(rhs, &inner_stack, visitor, found);
                        verdict
                    },
                    &mut lhs_found,
                );
                verdict
            }
            _ => SeekVerdict::Move,
        }
    }
}

/// The scope a reference chain can descend into, when the matched value
/// carries one.
fn scope_of(node: &Node) -> Option<&Scope> {
    match &node.kind {
        NodeKind::Scope(scope) => Some(scope),
        NodeKind::UserType { body: Some(body), .. } => body.as_scope(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Definition, IdAllocator, NodeKind};
    use crate::span::SourceLocation;

    fn loc() -> SourceLocation {
        SourceLocation::new("test.alusus", 1, 1)
    }

    fn node(alloc: &mut IdAllocator, kind: NodeKind) -> Node {
        Node::new(alloc.allocate(), kind, loc())
    }

    fn ident(alloc: &mut IdAllocator, name: &str) -> Node {
        node(alloc, NodeKind::Identifier(name.to_string()))
    }

    fn define(alloc: &mut IdAllocator, scope: &mut Scope, name: &str, value: NodeKind) {
        let value = node(alloc, value);
        let def = NodeKind::Definition(Definition::new(name, value));
        scope.push(node(alloc, def));
    }

    #[test]
    fn plain_identifier_resolves_in_stack() {
        let mut alloc = IdAllocator::new();
        let mut scope = Scope::new();
        define(&mut alloc, &mut scope, "answer", NodeKind::IntegerLiteral(42));

        let seeker = Seeker::new();
        let reference = ident(&mut alloc, "answer");
        let found = seeker.find_first(&reference, &[&scope]).unwrap();
        assert!(matches!(found.kind, NodeKind::IntegerLiteral(42)));

        let missing = ident(&mut alloc, "missing");
        assert!(seeker.find_first(&missing, &[&scope]).is_none());
    }

    #[test]
    fn newest_scope_shadows_but_move_sees_both() {
        let mut alloc = IdAllocator::new();
        let mut outer = Scope::new();
        define(&mut alloc, &mut outer, "x", NodeKind::IntegerLiteral(1));
        let mut inner = Scope::new();
        define(&mut alloc, &mut inner, "x", NodeKind::IntegerLiteral(2));

        let seeker = Seeker::new();
        let reference = ident(&mut alloc, "x");

        // First match is the innermost (newest) scope.
        let first = seeker.find_first(&reference, &[&outer, &inner]).unwrap();
        assert!(matches!(first.kind, NodeKind::IntegerLiteral(2)));

        // Moving visits the shadowed binding as well.
        let mut values = Vec::new();
        seeker.seek(&reference, &[&outer, &inner], &mut |n| {
            if let NodeKind::IntegerLiteral(v) = n.kind {
                values.push(v);
            }
            SeekVerdict::Move
        });
        assert_eq!(values, vec![2, 1]);
    }

    #[test]
    fn link_operator_descends_into_scopes() {
        let mut alloc = IdAllocator::new();

        let mut module_scope = Scope::new();
        define(
            &mut alloc,
            &mut module_scope,
            "color",
            NodeKind::StringLiteral("red".to_string()),
        );
        let module = node(&mut alloc, NodeKind::Scope(module_scope));

        let mut root = Scope::new();
        let def = NodeKind::Definition(Definition::new("graphics", module));
        root.push(node(&mut alloc, def));

        let lhs = ident(&mut alloc, "graphics");
        let rhs = ident(&mut alloc, "color");
        let reference = node(
            &mut alloc,
            NodeKind::LinkOperator {
                operator: ".".to_string(),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        );

        let seeker = Seeker::new();
        let found = seeker.find_first(&reference, &[&root]).unwrap();
        match &found.kind {
            NodeKind::StringLiteral(s) => assert_eq!(s, "red"),
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn link_operator_through_non_scope_finds_nothing() {
        let mut alloc = IdAllocator::new();
        let mut root = Scope::new();
        define(&mut alloc, &mut root, "leaf", NodeKind::IntegerLiteral(5));

        let lhs = ident(&mut alloc, "leaf");
        let rhs = ident(&mut alloc, "member");
        let reference = node(
            &mut alloc,
            NodeKind::LinkOperator {
                operator: ".".to_string(),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        );

        assert!(Seeker::new().find_first(&reference, &[&root]).is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut alloc = IdAllocator::new();
        let mut scope = Scope::new();
        define(&mut alloc, &mut scope, "a", NodeKind::IntegerLiteral(1));
        define(&mut alloc, &mut scope, "b", NodeKind::IntegerLiteral(2));

        let seeker = Seeker::new();
        let reference = ident(&mut alloc, "b");
        let one = seeker.find_first(&reference, &[&scope]).map(|n| n.id);
        let two = seeker.find_first(&reference, &[&scope]).map(|n| n.id);
        assert_eq!(one, two);
    }
}
