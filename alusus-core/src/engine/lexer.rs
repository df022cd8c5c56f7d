//! Tokenization for the reference driver.
//!
//! Identifiers cover the full Unicode letter range, so Arabic names work
//! the same as ASCII ones. Keywords carry their Arabic spellings as
//! additional token patterns.

use logos::Logos;

/// Token kinds for the reference grammar.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\u{FEFF}]+")]
pub enum TokenKind {
    // ============================================================
    // Keywords
    // ============================================================
    #[token("import")]
    #[token("اشمل")]
    Import,

    #[token("def")]
    #[token("عرّف")]
    Def,

    #[token("dump_ast")]
    DumpAst,

    #[token("if")]
    #[token("إذا")]
    If,

    #[token("else")]
    #[token("وإلا")]
    Else,

    #[token("while")]
    #[token("بينما")]
    While,

    #[token("return")]
    #[token("أرجع")]
    Return,

    #[token("break")]
    #[token("اقطع")]
    Break,

    #[token("continue")]
    #[token("أكمل")]
    Continue,

    // ============================================================
    // Literals
    // ============================================================
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*")]
    #[regex(r"[0-9][0-9_]*")]
    IntLit,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    FloatLit,

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit,

    #[regex(r"'([^'\\]|\\.)'")]
    CharLit,

    // ============================================================
    // Identifiers
    // ============================================================
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Ident,

    // ============================================================
    // Operators
    // ============================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,

    #[token("=")]
    Eq,
    #[token(".")]
    Dot,
    #[token("~")]
    Tilde,

    // ============================================================
    // Punctuation
    // ============================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("؛")]
    ArabicSemi,
    #[token(":")]
    Colon,

    // ============================================================
    // Comments
    // ============================================================
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// Block comment with nesting, handled by a callback.
    #[token("/*", block_comment)]
    BlockComment,

    /// Unclosed block comment (error token).
    UnclosedBlockComment,

    /// End of file marker, added by the wrapper.
    Eof,

    /// Lexer error.
    Error,
}

/// Callback for nested block comment parsing.
fn block_comment(lexer: &mut logos::Lexer<TokenKind>) -> logos::Filter<TokenKind> {
    let mut depth = 1;
    let remainder = lexer.remainder();

    let mut chars = remainder.chars().peekable();
    let mut consumed = 0;

    while depth > 0 {
        match chars.next() {
            Some('/') if chars.peek() == Some(&'*') => {
                chars.next();
                consumed += 2;
                depth += 1;
            }
            Some('*') if chars.peek() == Some(&'/') => {
                chars.next();
                consumed += 2;
                depth -= 1;
            }
            Some(c) => {
                consumed += c.len_utf8();
            }
            None => {
                lexer.bump(consumed);
                return logos::Filter::Emit(TokenKind::UnclosedBlockComment);
            }
        }
    }

    lexer.bump(consumed);
    logos::Filter::Skip
}

impl TokenKind {
    /// Whether this token ends a statement.
    pub fn is_statement_end(self) -> bool {
        matches!(self, TokenKind::Semi | TokenKind::ArabicSemi)
    }

    /// A short description for diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Import => "keyword `import`",
            TokenKind::Def => "keyword `def`",
            TokenKind::DumpAst => "keyword `dump_ast`",
            TokenKind::If => "keyword `if`",
            TokenKind::Else => "keyword `else`",
            TokenKind::While => "keyword `while`",
            TokenKind::Return => "keyword `return`",
            TokenKind::Break => "keyword `break`",
            TokenKind::Continue => "keyword `continue`",
            TokenKind::IntLit => "integer literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::StringLit => "string literal",
            TokenKind::CharLit => "character literal",
            TokenKind::Ident => "identifier",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Not => "`!`",
            TokenKind::Eq => "`=`",
            TokenKind::Dot => "`.`",
            TokenKind::Tilde => "`~`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Semi | TokenKind::ArabicSemi => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::UnclosedBlockComment => "unclosed block comment",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "unrecognized input",
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end]
    }
}

/// Lexer wrapper that converts logos errors into [`TokenKind::Error`]
/// tokens and terminates the stream with a single [`TokenKind::Eof`].
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                Some(Token::new(kind, span.start, span.end))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                Some(Token::new(TokenKind::Error, span.start, span.end))
            }
            None => {
                self.finished = true;
                Some(Token::new(
                    TokenKind::Eof,
                    self.source.len(),
                    self.source.len(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            lex("import def imported"),
            vec![TokenKind::Import, TokenKind::Def, TokenKind::Ident]
        );
    }

    #[test]
    fn arabic_keywords_and_identifiers() {
        assert_eq!(
            lex("اشمل \"م\"؛"),
            vec![
                TokenKind::Import,
                TokenKind::StringLit,
                TokenKind::ArabicSemi
            ]
        );
        assert_eq!(lex("عرّف متغير"), vec![TokenKind::Def, TokenKind::Ident]);
    }

    #[test]
    fn literals() {
        assert_eq!(
            lex(r#"42 0xFF 3.14 "hi" 'x'"#),
            vec![
                TokenKind::IntLit,
                TokenKind::IntLit,
                TokenKind::FloatLit,
                TokenKind::StringLit,
                TokenKind::CharLit
            ]
        );
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            lex("== = <= < !"),
            vec![
                TokenKind::EqEq,
                TokenKind::Eq,
                TokenKind::LtEq,
                TokenKind::Lt,
                TokenKind::Not
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex("1 // trailing\n/* block /* nested */ */ 2"),
            vec![TokenKind::IntLit, TokenKind::IntLit]
        );
    }

    #[test]
    fn unclosed_block_comment_is_an_error_token() {
        assert_eq!(lex("/* open"), vec![TokenKind::UnclosedBlockComment]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let kinds = lex("\"open");
        assert!(kinds.contains(&TokenKind::Error));
    }
}
