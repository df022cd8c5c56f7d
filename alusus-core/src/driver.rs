//! The processing-driver contract.
//!
//! The root manager is parameterized over the parsing engine: any
//! implementation of [`ProcessingDriver`] can be plugged in. A driver is
//! constructed fresh for every `process_*` call through a
//! [`DriverFactory`], runs to completion synchronously, and reports its
//! diagnostics through the root manager's notice bus; that bus is the
//! relayed notice signal, so one connected slot observes every
//! compilation diagnostic regardless of which driver instance produced
//! it.
//!
//! A driver returns the parsed tree (usually a
//! [`Scope`](crate::ast::Scope) node of statements) or `None` when the
//! input produced nothing; the root manager owns merging the result into
//! its scopes.

use crate::ast::Node;
use crate::platform::Utf8Path;
use crate::root::RootManager;
use std::io::Read;
use std::rc::Rc;
use thiserror::Error;

/// Unrecoverable driver failures. Syntax problems are notices, not
/// errors.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("I/O error reading `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait ProcessingDriver {
    /// Parse a string. `name` is the logical source name attached to
    /// locations and notices.
    fn process_string(
        &mut self,
        root: &mut RootManager,
        source: &str,
        name: &str,
    ) -> Result<Option<Node>, DriverError>;

    /// Parse a file. The default reads the file and delegates to
    /// [`ProcessingDriver::process_string`].
    fn process_file(
        &mut self,
        root: &mut RootManager,
        path: &Utf8Path,
    ) -> Result<Option<Node>, DriverError> {
        let source =
            std::fs::read_to_string(path.as_std_path()).map_err(|e| DriverError::Io {
                name: path.as_str().to_string(),
                source: e,
            })?;
        self.process_string(root, &source, path.as_str())
    }

    /// Parse a character stream. The default buffers the stream to its
    /// end and delegates to [`ProcessingDriver::process_string`].
    fn process_stream(
        &mut self,
        root: &mut RootManager,
        input: &mut dyn Read,
        name: &str,
    ) -> Result<Option<Node>, DriverError> {
        let mut source = String::new();
        input
            .read_to_string(&mut source)
            .map_err(|e| DriverError::Io {
                name: name.to_string(),
                source: e,
            })?;
        self.process_string(root, &source, name)
    }
}

/// Produces a fresh driver per processing call.
pub type DriverFactory = Rc<dyn Fn() -> Box<dyn ProcessingDriver>>;
