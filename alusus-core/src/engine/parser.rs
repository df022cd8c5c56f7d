//! Recursive-descent parser for the reference grammar.
//!
//! Statements: imports, definitions, `dump_ast` directives, control
//! statements, and expression statements. Expressions use precedence
//! climbing. Syntax problems become notices on the root manager's bus and
//! the parser recovers at the next statement boundary, so one bad
//! statement never kills a compilation.

use super::lexer::{Lexer, Token, TokenKind};
use crate::ast::{self, BracketKind, Definition, Node, NodeKind, Scope};
use crate::notices::{Notice, NoticeCode};
use crate::root::RootManager;
use crate::span::{LineIndex, SourceLocation};

pub(super) struct Parser<'src> {
    source: &'src str,
    name: String,
    tokens: Vec<Token>,
    pos: usize,
    line_index: LineIndex,
}

impl<'src> Parser<'src> {
    pub(super) fn new(source: &'src str, name: &str) -> Self {
        Self {
            source,
            name: name.to_string(),
            tokens: Lexer::new(source).collect(),
            pos: 0,
            line_index: LineIndex::new(source),
        }
    }

    /// Parse the whole input into a scope of statements.
    pub(super) fn parse_program(&mut self, root: &mut RootManager) -> Node {
        let location = self.location_of(self.current());
        let mut scope = Scope::new();
        while !self.at_end() {
            let before = self.pos;
            if let Some(statement) = self.parse_statement(root, &scope) {
                scope.push(statement);
            }
            // A statement that consumed nothing (e.g. a stray `}`) must
            // not stall the loop.
            if self.pos == before {
                self.advance();
            }
        }
        Node::new(root.allocate_node_id(), NodeKind::Scope(scope), location)
            .with_prod_id("Statements")
    }

    // ============================================================
    // Token handling
    // ============================================================

    fn current(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn location_of(&self, token: Token) -> SourceLocation {
        let (line, column) = self.line_index.line_col(token.start);
        SourceLocation::new(self.name.clone(), line, column)
    }

    fn expect(&mut self, root: &mut RootManager, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            return Some(self.advance());
        }
        self.report_unexpected(root, kind.description());
        None
    }

    fn expect_statement_end(&mut self, root: &mut RootManager) {
        if !self.current().kind.is_statement_end() && !self.at_end() {
            self.report_unexpected(root, "`;`");
            self.synchronize();
        } else if !self.at_end() {
            self.advance();
        }
    }

    fn report_unexpected(&mut self, root: &mut RootManager, expected: &str) {
        let token = self.current();
        let code = if token.kind == TokenKind::Eof {
            NoticeCode::UnexpectedEof
        } else {
            NoticeCode::UnexpectedToken
        };
        let detail = format!("expected {expected}, found {}", token.kind.description());
        root.report_notice(Notice::new(code, self.location_of(token)).with_detail(detail));
    }

    /// Skip ahead to the next statement boundary.
    fn synchronize(&mut self) {
        while !self.at_end() {
            let kind = self.current().kind;
            if kind.is_statement_end() {
                self.advance();
                return;
            }
            if kind == TokenKind::RBrace {
                return;
            }
            self.advance();
        }
    }

    fn node(&self, root: &mut RootManager, kind: NodeKind, location: SourceLocation) -> Node {
        Node::new(root.allocate_node_id(), kind, location)
    }

    // ============================================================
    // Statements
    // ============================================================

    /// Parse one statement. `enclosing` is the in-progress statement
    /// list of the surrounding scope, so directives like `dump_ast` can
    /// see names defined earlier in the same unit.
    fn parse_statement(&mut self, root: &mut RootManager, enclosing: &Scope) -> Option<Node> {
        match self.current().kind {
            TokenKind::Semi | TokenKind::ArabicSemi => {
                self.advance();
                None
            }
            TokenKind::Import => self.parse_import(root),
            TokenKind::Def => self.parse_def(root),
            TokenKind::DumpAst => self.parse_dump(root, enclosing),
            TokenKind::If => self.parse_if(root),
            TokenKind::While => self.parse_while(root),
            TokenKind::Return => self.parse_return(root),
            TokenKind::Break => {
                let token = self.advance();
                let location = self.location_of(token);
                self.expect_statement_end(root);
                Some(self.node(root, NodeKind::BreakStatement, location))
            }
            TokenKind::Continue => {
                let token = self.advance();
                let location = self.location_of(token);
                self.expect_statement_end(root);
                Some(self.node(root, NodeKind::ContinueStatement, location))
            }
            TokenKind::UnclosedBlockComment => {
                let token = self.advance();
                root.report_notice(
                    Notice::new(NoticeCode::UnexpectedToken, self.location_of(token))
                        .with_detail("unclosed block comment"),
                );
                None
            }
            TokenKind::Error => {
                self.report_lex_error(root);
                self.synchronize();
                None
            }
            _ => {
                let expression = self.parse_expression(root);
                match expression {
                    Some(expression) => {
                        self.expect_statement_end(root);
                        Some(expression)
                    }
                    None => {
                        self.synchronize();
                        None
                    }
                }
            }
        }
    }

    /// `import "target";` resolves and processes the target before the
    /// parse resumes, so extensions loaded here apply to later
    /// statements. Produces no node.
    fn parse_import(&mut self, root: &mut RootManager) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);

        if !self.check(TokenKind::StringLit) {
            let found = self.current();
            root.report_notice(
                Notice::new(NoticeCode::InvalidImportArg, self.location_of(found))
                    .with_detail(format!("found {}", found.kind.description())),
            );
            self.synchronize();
            return None;
        }
        let argument = self.advance();
        let target = unescape_string(argument.text(self.source));
        self.expect_statement_end(root);

        let mut error_details = String::new();
        if !root.try_import_file(&target, &mut error_details) {
            let detail = if error_details.is_empty() {
                target
            } else {
                format!("{target}\n{error_details}")
            };
            root.report_notice(
                Notice::new(NoticeCode::ImportLoadFailed, location).with_detail(detail),
            );
        }
        None
    }

    /// `def name: value;`
    fn parse_def(&mut self, root: &mut RootManager) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);

        let Some(name) = self.expect(root, TokenKind::Ident) else {
            self.synchronize();
            return None;
        };
        let name = name.text(self.source).to_string();

        if self.expect(root, TokenKind::Colon).is_none() {
            self.synchronize();
            return None;
        }

        let Some(value) = self.parse_expression(root) else {
            self.synchronize();
            return None;
        };
        self.expect_statement_end(root);

        let definition = Definition::new(name, value);
        Some(self.node(root, NodeKind::Definition(definition), location))
    }

    /// `dump_ast reference;` resolves the reference through the seeker
    /// and prints the matched subtree. Produces no node.
    fn parse_dump(&mut self, root: &mut RootManager, enclosing: &Scope) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);
        let reference_start = self.current().start;

        let Some(reference) = self.parse_expression(root) else {
            self.synchronize();
            return None;
        };
        let reference_end = self.tokens[self.pos.saturating_sub(1)].end;
        let reference_text = self.source[reference_start..reference_end].trim().to_string();
        self.expect_statement_end(root);

        let dumped = {
            let mut stack: Vec<&Scope> = Vec::new();
            if let Some(root_scope) = root.root_scope().as_scope() {
                stack.push(root_scope);
            }
            stack.push(enclosing);
            root.seeker().find_first(&reference, &stack).map(ast::dump)
        };
        match dumped {
            Some(text) => print!("{text}"),
            None => root.report_notice(
                Notice::new(NoticeCode::InvalidDumpArg, location).with_detail(reference_text),
            ),
        }
        None
    }

    fn parse_if(&mut self, root: &mut RootManager) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);

        let condition = self.parse_expression(root)?;
        let body = self.parse_block(root)?;
        let else_body = if self.eat(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if(root)?))
            } else {
                Some(Box::new(self.parse_block(root)?))
            }
        } else {
            None
        };

        Some(self.node(
            root,
            NodeKind::IfStatement {
                condition: Box::new(condition),
                body: Box::new(body),
                else_body,
            },
            location,
        ))
    }

    fn parse_while(&mut self, root: &mut RootManager) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);

        let condition = self.parse_expression(root)?;
        let body = self.parse_block(root)?;
        Some(self.node(
            root,
            NodeKind::WhileStatement {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            location,
        ))
    }

    fn parse_return(&mut self, root: &mut RootManager) -> Option<Node> {
        let keyword = self.advance();
        let location = self.location_of(keyword);

        let operand = if self.current().kind.is_statement_end() || self.at_end() {
            None
        } else {
            Some(Box::new(self.parse_expression(root)?))
        };
        self.expect_statement_end(root);
        Some(self.node(root, NodeKind::ReturnStatement { operand }, location))
    }

    fn parse_block(&mut self, root: &mut RootManager) -> Option<Node> {
        let open = self.expect(root, TokenKind::LBrace)?;
        let location = self.location_of(open);

        let mut scope = Scope::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            if let Some(statement) = self.parse_statement(root, &scope) {
                scope.push(statement);
            }
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(root, TokenKind::RBrace)?;
        Some(self.node(root, NodeKind::Scope(scope), location))
    }

    // ============================================================
    // Expressions
    // ============================================================

    fn parse_expression(&mut self, root: &mut RootManager) -> Option<Node> {
        self.parse_assignment(root)
    }

    fn parse_assignment(&mut self, root: &mut RootManager) -> Option<Node> {
        let lhs = self.parse_binary(root, 0)?;
        if self.check(TokenKind::Eq) {
            let operator = self.advance();
            let location = self.location_of(operator);
            // Right associative.
            let rhs = self.parse_assignment(root)?;
            return Some(self.node(
                root,
                NodeKind::InfixOperator {
                    operator: "=".to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                location,
            ));
        }
        Some(lhs)
    }

    /// Precedence climbing over the infix operator table.
    fn parse_binary(&mut self, root: &mut RootManager, min_level: u8) -> Option<Node> {
        let mut lhs = self.parse_unary(root)?;
        loop {
            let Some((level, operator)) = infix_operator(self.current().kind) else {
                break;
            };
            if level < min_level {
                break;
            }
            let token = self.advance();
            let location = self.location_of(token);
            let rhs = self.parse_binary(root, level + 1)?;
            lhs = self.node(
                root,
                NodeKind::InfixOperator {
                    operator: operator.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                location,
            );
        }
        Some(lhs)
    }

    fn parse_unary(&mut self, root: &mut RootManager) -> Option<Node> {
        let operator = match self.current().kind {
            TokenKind::Not => Some("!"),
            TokenKind::Minus => Some("-"),
            _ => None,
        };
        if let Some(operator) = operator {
            let token = self.advance();
            let location = self.location_of(token);
            let operand = self.parse_unary(root)?;
            return Some(self.node(
                root,
                NodeKind::PrefixOperator {
                    operator: operator.to_string(),
                    operand: Box::new(operand),
                },
                location,
            ));
        }
        self.parse_postfix(root)
    }

    fn parse_postfix(&mut self, root: &mut RootManager) -> Option<Node> {
        let mut operand = self.parse_primary(root)?;
        loop {
            match self.current().kind {
                TokenKind::Dot | TokenKind::Tilde => {
                    let token = self.advance();
                    let operator = token.text(self.source).to_string();
                    let location = self.location_of(token);
                    let member = self.expect(root, TokenKind::Ident)?;
                    let member_location = self.location_of(member);
                    let member_name = member.text(self.source).to_string();
                    let rhs = self.node(
                        root,
                        NodeKind::Identifier(member_name),
                        member_location,
                    );
                    operand = self.node(
                        root,
                        NodeKind::LinkOperator {
                            operator,
                            lhs: Box::new(operand),
                            rhs: Box::new(rhs),
                        },
                        location,
                    );
                }
                TokenKind::LParen => {
                    let open = self.advance();
                    let location = self.location_of(open);
                    let param = self.parse_param_list(root, TokenKind::RParen)?;
                    operand = self.node(
                        root,
                        NodeKind::ParamPass {
                            kind: BracketKind::Round,
                            operand: Box::new(operand),
                            param,
                        },
                        location,
                    );
                }
                TokenKind::LBracket => {
                    let open = self.advance();
                    let location = self.location_of(open);
                    let param = self.parse_param_list(root, TokenKind::RBracket)?;
                    operand = self.node(
                        root,
                        NodeKind::ParamPass {
                            kind: BracketKind::Square,
                            operand: Box::new(operand),
                            param,
                        },
                        location,
                    );
                }
                _ => break,
            }
        }
        Some(operand)
    }

    /// Parse a bracketed, comma-separated parameter list, consuming the
    /// closing token. One parameter stays bare; several become a list.
    fn parse_param_list(
        &mut self,
        root: &mut RootManager,
        close: TokenKind,
    ) -> Option<Option<Box<Node>>> {
        if self.eat(close) {
            return Some(None);
        }
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expression(root)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(root, close)?;
        let param = if items.len() == 1 {
            items.pop().map(Box::new)
        } else {
            let location = items[0].location.clone();
            Some(Box::new(self.node(root, NodeKind::List(items), location)))
        };
        Some(param)
    }

    fn parse_primary(&mut self, root: &mut RootManager) -> Option<Node> {
        let token = self.current();
        let location = self.location_of(token);
        match token.kind {
            TokenKind::IntLit => {
                self.advance();
                let text = token.text(self.source).replace('_', "");
                let value = if let Some(hex) = text.strip_prefix("0x") {
                    i64::from_str_radix(hex, 16)
                } else {
                    text.parse()
                };
                let value = value.unwrap_or_else(|_| {
                    root.report_notice(
                        Notice::new(NoticeCode::InvalidNumber, location.clone())
                            .with_detail(token.text(self.source)),
                    );
                    0
                });
                Some(self.node(root, NodeKind::IntegerLiteral(value), location))
            }
            TokenKind::FloatLit => {
                self.advance();
                let text = token.text(self.source).replace('_', "");
                let value = text.parse().unwrap_or_else(|_| {
                    root.report_notice(
                        Notice::new(NoticeCode::InvalidNumber, location.clone())
                            .with_detail(token.text(self.source)),
                    );
                    0.0
                });
                Some(self.node(root, NodeKind::FloatLiteral(value), location))
            }
            TokenKind::StringLit => {
                self.advance();
                let value = unescape_string(token.text(self.source));
                Some(self.node(root, NodeKind::StringLiteral(value), location))
            }
            TokenKind::CharLit => {
                self.advance();
                let text = token.text(self.source);
                let value = unescape_char(text).unwrap_or_else(|| {
                    root.report_notice(
                        Notice::new(NoticeCode::InvalidCharLiteral, location.clone())
                            .with_detail(text),
                    );
                    '\0'
                });
                Some(self.node(root, NodeKind::CharLiteral(value), location))
            }
            TokenKind::Ident => {
                self.advance();
                let name = token.text(self.source).to_string();
                Some(self.node(root, NodeKind::Identifier(name), location))
            }
            TokenKind::LParen => {
                self.advance();
                let body = self.parse_expression(root)?;
                self.expect(root, TokenKind::RParen)?;
                Some(self.node(
                    root,
                    NodeKind::Bracket {
                        kind: BracketKind::Round,
                        body: Some(Box::new(body)),
                    },
                    location,
                ))
            }
            TokenKind::LBracket => {
                self.advance();
                let body = if self.check(TokenKind::RBracket) {
                    None
                } else {
                    Some(Box::new(self.parse_expression(root)?))
                };
                self.expect(root, TokenKind::RBracket)?;
                Some(self.node(
                    root,
                    NodeKind::Bracket {
                        kind: BracketKind::Square,
                        body,
                    },
                    location,
                ))
            }
            TokenKind::Error => {
                self.report_lex_error(root);
                None
            }
            TokenKind::Eof => {
                self.report_unexpected(root, "an expression");
                None
            }
            _ => {
                self.report_unexpected(root, "an expression");
                None
            }
        }
    }

    fn report_lex_error(&mut self, root: &mut RootManager) {
        let token = self.advance();
        let location = self.location_of(token);
        let text = token.text(self.source);
        let notice = if text.starts_with('"') {
            Notice::new(NoticeCode::UnclosedString, location)
        } else {
            Notice::new(NoticeCode::UnexpectedToken, location).with_detail(text)
        };
        root.report_notice(notice);
    }
}

/// Binding levels for the infix operators, tighter binds higher.
fn infix_operator(kind: TokenKind) -> Option<(u8, &'static str)> {
    match kind {
        TokenKind::OrOr => Some((1, "||")),
        TokenKind::AndAnd => Some((2, "&&")),
        TokenKind::EqEq => Some((3, "==")),
        TokenKind::NotEq => Some((3, "!=")),
        TokenKind::Lt => Some((4, "<")),
        TokenKind::Gt => Some((4, ">")),
        TokenKind::LtEq => Some((4, "<=")),
        TokenKind::GtEq => Some((4, ">=")),
        TokenKind::Plus => Some((5, "+")),
        TokenKind::Minus => Some((5, "-")),
        TokenKind::Star => Some((6, "*")),
        TokenKind::Slash => Some((6, "/")),
        TokenKind::Percent => Some((6, "%")),
        _ => None,
    }
}

/// Strip the surrounding quotes and decode escapes.
fn unescape_string(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    decode_escapes(inner)
}

fn unescape_char(raw: &str) -> Option<char> {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))?;
    let decoded = decode_escapes(inner);
    let mut chars = decoded.chars();
    let value = chars.next()?;
    chars.next().is_none().then_some(value)
}

fn decode_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_decode() {
        assert_eq!(unescape_string(r#""a\nb\"c""#), "a\nb\"c");
        assert_eq!(unescape_char(r"'\n'"), Some('\n'));
        assert_eq!(unescape_char("'ب'"), Some('ب'));
        assert_eq!(unescape_char("''"), None);
    }

    #[test]
    fn operator_table_orders_precedence() {
        let (add, _) = infix_operator(TokenKind::Plus).unwrap();
        let (mul, _) = infix_operator(TokenKind::Star).unwrap();
        let (or, _) = infix_operator(TokenKind::OrOr).unwrap();
        assert!(mul > add);
        assert!(add > or);
        assert!(infix_operator(TokenKind::Semi).is_none());
    }
}
