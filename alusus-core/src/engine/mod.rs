//! The built-in reference driver.
//!
//! A compact lexer/parser pair that implements the
//! [`ProcessingDriver`](crate::driver::ProcessingDriver) contract for the
//! core grammar: definitions, imports, `dump_ast` directives, control
//! statements, and operator expressions. Extension libraries grow the
//! language beyond this baseline.
//!
//! Import directives re-enter the root manager mid-parse, so a library
//! loaded by an inner import has registered its extensions before the
//! outer parse resumes. The stream entry point buffers its input to the
//! end before parsing.

mod lexer;
mod parser;

pub use lexer::{Lexer, Token, TokenKind};

use crate::ast::Node;
use crate::driver::{DriverError, ProcessingDriver};
use crate::root::RootManager;

/// The reference processing driver.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingDriver for Engine {
    fn process_string(
        &mut self,
        root: &mut RootManager,
        source: &str,
        name: &str,
    ) -> Result<Option<Node>, DriverError> {
        let mut parser = parser::Parser::new(source, name);
        Ok(Some(parser.parse_program(root)))
    }
}
