//! # Alusus Compiler Core
//!
//! The root orchestration engine of the Alusus compiler. Given a starting
//! source file (or an interactive character stream), the core loads
//! source text, parses it into a shared root scope, resolves `import`
//! directives, which may name further source files or native extension
//! libraries that grow the language itself, and drives downstream
//! processing through a pluggable driver.
//!
//! ## Architecture
//!
//! ```text
//! Entry -> RootManager -> ProcessingDriver (engine) -> AST root scope
//!              |                 |
//!              |                 +-- notices -> NoticeBus -> slots
//!              +-- resolver -> search-path stack
//!              +-- LibraryManager -> platform::dl -> extension gateways
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use std::rc::Rc;
//! use alusus_core::driver::DriverFactory;
//! use alusus_core::engine::Engine;
//! use alusus_core::root::RootManager;
//!
//! let factory: DriverFactory = Rc::new(|| Box::new(Engine::new()));
//! let args = vec!["alusus".to_string()];
//! let mut root = RootManager::new(&args, factory)?;
//! let _ast = root.process_file("hello.alusus", false)?;
//! # Ok::<(), alusus_core::root::RootError>(())
//! ```
//!
//! ## Module overview
//!
//! - [`platform`] - UTF-8 paths, environment, console scope, dynamic
//!   loading, shared-library naming
//! - [`span`] - source locations
//! - [`notices`] - diagnostics, the notice bus, localization
//! - [`ast`] - node variants, scopes, definitions, tree dump
//! - [`seeker`] - qualified-name resolution
//! - [`library`] - the loaded-extension registry and gateway adapter
//! - [`driver`] - the processing-driver contract
//! - [`engine`] - the built-in reference driver
//! - [`root`] - the root manager
//!
//! ## Concurrency
//!
//! The core runs one compilation per thread: the root manager and
//! everything it owns are not designed for concurrent mutation. The
//! platform layer's primitives are individually thread-safe (dynamic-load
//! errors are thread-local, paths are plain values), so auxiliary threads
//! may use them independently, but they must never touch a root manager
//! concurrently with its owning thread.

pub mod ast;
pub mod driver;
pub mod engine;
pub mod library;
pub mod notices;
pub mod platform;
pub mod root;
pub mod seeker;
pub mod span;

// Re-export commonly used types.
pub use ast::{Node, NodeId, NodeKind, Scope};
pub use notices::{Notice, NoticeBus, NoticeCode, Severity};
pub use platform::Utf8Path;
pub use root::{RootManager, SOURCE_EXTENSIONS};
pub use span::SourceLocation;
