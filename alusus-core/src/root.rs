//! The root manager: owner of the shared root scope, the import
//! search-path stack, the processed-file set, the loaded-library table,
//! and the notice bus.
//!
//! One root manager exists per compilation job and lives on a single
//! thread. Processing operations construct a fresh driver through the
//! configured factory, relay every notice the driver reports, and merge
//! parsed statements into the root scope. Import directives re-enter the
//! manager through [`RootManager::try_import_file`], which dispatches to
//! recursive file processing or to extension-library loading.

use crate::ast::{IdAllocator, Node, NodeId, NodeKind, Scope};
use crate::driver::{DriverError, DriverFactory, ProcessingDriver};
use crate::library::{
    ForeignGateway, LibraryError, LibraryGateway, LibraryManager, RemoveOutcome,
};
use crate::notices::l18n::L18nDictionary;
use crate::notices::{Notice, NoticeBus, Severity};
use crate::platform::dl::DlHandle;
use crate::platform::{dl, env, shlib, PlatformError, Utf8Path};
use crate::seeker::Seeker;
use crate::span::SourceLocation;
use alusus_gateway::{GatewayGetter, GATEWAY_ABI_VERSION, GATEWAY_GETTER_SYMBOL};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Read;
use std::rc::Rc;
use thiserror::Error;

/// File extensions recognized as source files, in probe order.
pub const SOURCE_EXTENSIONS: [&str; 5] = [".alusus", ".source", ".الأسس", ".أسس", ".مصدر"];

/// File-level failures surfaced to the entry layer.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid file type: {0}")]
    InvalidType(String),
}

#[derive(Debug, Error)]
pub enum RootError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("invalid argument `{name}`: {message}")]
    InvalidArgument { name: &'static str, message: String },
}

impl RootError {
    fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        RootError::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

/// What an import request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImport {
    Source(Utf8Path),
    Library(Utf8Path),
}

struct SearchPathEntry {
    path: Utf8Path,
    refs: u32,
}

pub struct RootManager {
    root_scope: Node,
    expr_root_scope: Node,
    seeker: Seeker,
    notices: NoticeBus,
    libraries: LibraryManager,
    l18n: Rc<RefCell<L18nDictionary>>,
    processed_files: HashSet<Utf8Path>,
    search_paths: Vec<SearchPathEntry>,
    driver_factory: DriverFactory,
    ids: IdAllocator,
    interactive: bool,
    process_args: Vec<String>,
    language: String,
    core_bin_path: Utf8Path,
}

impl RootManager {
    /// Build a root manager from the process arguments.
    ///
    /// Seeds the search-path stack, in push order: the binary directory,
    /// the package library directory, every `ALUSUS_LIBS` entry, and the
    /// working directory. Lookup probes them in the reverse order.
    pub fn new(args: &[String], driver_factory: DriverFactory) -> Result<Self, RootError> {
        let mut ids = IdAllocator::new();
        let root_scope = Node::new(
            ids.allocate(),
            NodeKind::Scope(Scope::new()),
            SourceLocation::synthesized("<root>"),
        )
        .with_prod_id("Root");
        let expr_root_scope = Node::new(
            ids.allocate(),
            NodeKind::Scope(Scope::new()),
            SourceLocation::synthesized("<expression root>"),
        )
        .with_prod_id("Root");

        let cwd = env::working_directory()?;
        let core_bin_path = compute_core_bin_path(args.first(), &cwd)?;

        let mut manager = Self {
            root_scope,
            expr_root_scope,
            seeker: Seeker::new(),
            notices: NoticeBus::new(),
            libraries: LibraryManager::new(),
            l18n: Rc::new(RefCell::new(L18nDictionary::new())),
            processed_files: HashSet::new(),
            search_paths: Vec::new(),
            driver_factory,
            ids,
            interactive: false,
            process_args: args.to_vec(),
            language: "en".to_string(),
            core_bin_path,
        };

        let bin = manager.core_bin_path.clone();
        manager.push_search_path(&bin)?;
        manager.push_search_path(&package_library_directory(&bin))?;
        if let Some(value) = env::get_var("ALUSUS_LIBS") {
            for entry in env::parse_path_variable(&value) {
                let path = Utf8Path::new(&entry);
                let path = if path.is_absolute() { path } else { cwd.join(&entry) };
                manager.push_search_path(&path)?;
            }
        }
        manager.push_search_path(&cwd)?;

        Ok(manager)
    }

    // ============================================================
    // State accessors
    // ============================================================

    pub fn root_scope(&self) -> &Node {
        &self.root_scope
    }

    pub fn root_scope_mut(&mut self) -> &mut Node {
        &mut self.root_scope
    }

    pub fn expr_root_scope(&self) -> &Node {
        &self.expr_root_scope
    }

    pub fn expr_root_scope_mut(&mut self) -> &mut Node {
        &mut self.expr_root_scope
    }

    pub fn seeker(&self) -> &Seeker {
        &self.seeker
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBus {
        &mut self.notices
    }

    pub fn libraries(&self) -> &LibraryManager {
        &self.libraries
    }

    /// The localization dictionary, shared with notice printers.
    pub fn l18n(&self) -> &Rc<RefCell<L18nDictionary>> {
        &self.l18n
    }

    pub fn allocate_node_id(&mut self) -> NodeId {
        self.ids.allocate()
    }

    /// Append a notice to the store; it is delivered on the next flush.
    pub fn report_notice(&mut self, notice: Notice) {
        self.notices.add(notice);
    }

    /// Deliver every stored notice, in order.
    pub fn flush_notices(&mut self) {
        self.notices.flush();
    }

    pub fn min_notice_severity(&self) -> Option<Severity> {
        self.notices.min_severity()
    }

    pub fn reset_min_notice_severity(&mut self) {
        self.notices.reset_min_severity();
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn process_args(&self) -> &[String] {
        &self.process_args
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn core_bin_path(&self) -> &Utf8Path {
        &self.core_bin_path
    }

    /// Current search-path stack, oldest first, with reference counts.
    pub fn search_path_stack(&self) -> impl Iterator<Item = (&Utf8Path, u32)> {
        self.search_paths.iter().map(|entry| (&entry.path, entry.refs))
    }

    // ============================================================
    // Search-path stack
    // ============================================================

    /// Push an absolute directory onto the search stack. Re-pushing the
    /// current top collapses into its reference count.
    pub fn push_search_path(&mut self, path: &Utf8Path) -> Result<(), RootError> {
        if path.is_empty() {
            return Err(RootError::invalid_argument("path", "empty path"));
        }
        if !path.is_absolute() {
            return Err(RootError::invalid_argument(
                "path",
                format!("`{path}` is not an absolute path"),
            ));
        }
        match self.search_paths.last_mut() {
            Some(top) if top.path == *path => top.refs += 1,
            _ => self.search_paths.push(SearchPathEntry {
                path: path.clone(),
                refs: 1,
            }),
        }
        Ok(())
    }

    /// Release one reference to a path on the stack, removing the entry
    /// when its count reaches zero. The newest matching entry is the one
    /// released.
    pub fn pop_search_path(&mut self, path: &Utf8Path) -> Result<(), RootError> {
        if path.is_empty() {
            return Err(RootError::invalid_argument("path", "empty path"));
        }
        if !path.is_absolute() {
            return Err(RootError::invalid_argument(
                "path",
                format!("`{path}` is not an absolute path"),
            ));
        }
        let Some(idx) = self
            .search_paths
            .iter()
            .rposition(|entry| entry.path == *path)
        else {
            return Err(RootError::invalid_argument(
                "path",
                format!("`{path}` is not on the search stack"),
            ));
        };
        self.search_paths[idx].refs -= 1;
        if self.search_paths[idx].refs == 0 {
            self.search_paths.remove(idx);
        }
        Ok(())
    }

    // ============================================================
    // Resolution
    // ============================================================

    /// Resolve an import request to a source file or a shared library,
    /// canonicalized. Returns `None` when every candidate misses.
    pub fn resolve_import(&self, request: &str) -> Option<ResolvedImport> {
        let hit = self.probe(request, true)?;
        if is_source_file(&hit) {
            Some(ResolvedImport::Source(hit))
        } else {
            Some(ResolvedImport::Library(hit))
        }
    }

    /// Resolve a request to a source file only (no library candidates).
    pub fn find_source_file(&self, request: &str) -> Option<Utf8Path> {
        self.probe(request, false)
    }

    fn probe(&self, request: &str, include_libraries: bool) -> Option<Utf8Path> {
        if request.is_empty() {
            return None;
        }
        let requested = Utf8Path::new(request);
        if requested.is_absolute() {
            return self.try_filename(&requested, include_libraries);
        }
        for entry in self.search_paths.iter().rev() {
            if let Some(hit) = self.try_filename(&entry.path.join(request), include_libraries) {
                return Some(hit);
            }
        }
        None
    }

    /// Probe one base path: verbatim, then with each source extension,
    /// then (for imports) the shared-library candidate names in the
    /// parent directory. Hits are canonicalized before classification.
    fn try_filename(&self, path: &Utf8Path, include_libraries: bool) -> Option<Utf8Path> {
        if path.is_file() && (include_libraries || is_source_file(path)) {
            return Some(canonical(path));
        }
        for extension in SOURCE_EXTENSIONS {
            let candidate = Utf8Path::new(format!("{}{}", path.as_str(), extension));
            if candidate.is_file() {
                return Some(canonical(&candidate));
            }
        }
        if include_libraries {
            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                for candidate in shlib::candidate_names(name) {
                    let candidate = parent.join(candidate);
                    if candidate.is_file() {
                        return Some(canonical(&candidate));
                    }
                }
            }
        }
        None
    }

    // ============================================================
    // Processing
    // ============================================================

    /// Parse a standalone expression against the expression root scope.
    pub fn parse_expression(&mut self, text: &str) -> Result<Node, RootError> {
        let result = self.drive(|driver, root| driver.process_string(root, text, text));
        self.flush_notices();
        let node = result?;
        let mut children = match node.map(|n| n.kind) {
            Some(NodeKind::Scope(scope)) => scope.into_children(),
            _ => Vec::new(),
        };
        if children.is_empty() {
            return Err(RootError::invalid_argument(
                "text",
                "parsing did not result in a valid expression",
            ));
        }
        Ok(children.remove(0))
    }

    /// Parse a string against the main scope. `name` is the logical
    /// source name used in locations.
    pub fn process_string(
        &mut self,
        source: &str,
        name: &str,
    ) -> Result<Option<Node>, RootError> {
        let result = self.drive(|driver, root| driver.process_string(root, source, name));
        self.flush_notices();
        Ok(self.merge_into_main(result?))
    }

    /// Resolve and parse a source file. Files already processed are
    /// skipped (returning `None`) unless `allow_reprocess` is set.
    pub fn process_file(
        &mut self,
        filename: &str,
        allow_reprocess: bool,
    ) -> Result<Option<Node>, RootError> {
        match self.find_source_file(filename) {
            Some(resolved) => self.process_source_file(&resolved, allow_reprocess),
            None => {
                if Utf8Path::new(filename).is_file() {
                    Err(FileError::InvalidType(filename.to_string()).into())
                } else {
                    Err(FileError::NotFound(filename.to_string()).into())
                }
            }
        }
    }

    /// Parse a character stream against the main scope.
    pub fn process_stream(
        &mut self,
        input: &mut dyn Read,
        name: &str,
    ) -> Result<Option<Node>, RootError> {
        let result = self.drive(|driver, root| driver.process_stream(root, input, name));
        self.flush_notices();
        Ok(self.merge_into_main(result?))
    }

    fn process_source_file(
        &mut self,
        full_path: &Utf8Path,
        allow_reprocess: bool,
    ) -> Result<Option<Node>, RootError> {
        if !allow_reprocess && self.processed_files.contains(full_path) {
            return Ok(None);
        }
        self.processed_files.insert(full_path.clone());

        tracing::debug!(path = %full_path, "processing source file");

        // The file's own directory joins the search stack for the
        // duration of the parse, so its relative imports resolve.
        let parent = full_path.parent();
        if let Some(parent) = &parent {
            self.push_search_path(parent)?;
        }

        let result = self.drive(|driver, root| driver.process_file(root, full_path));

        // Popped on every exit path; the push above guarantees success.
        if let Some(parent) = &parent {
            let _ = self.pop_search_path(parent);
        }
        self.flush_notices();

        Ok(self.merge_into_main(result?))
    }

    /// Resolve an import request and process it: source files recurse
    /// into file processing, libraries load through the library manager.
    /// On library-load failure the OS error text is appended to
    /// `error_details` (newline-separated).
    pub fn try_import_file(&mut self, filename: &str, error_details: &mut String) -> bool {
        match self.resolve_import(filename) {
            Some(ResolvedImport::Source(path)) => {
                tracing::debug!(request = filename, path = %path, "importing source file");
                self.process_source_file(&path, false).is_ok()
            }
            Some(ResolvedImport::Library(path)) => {
                tracing::debug!(request = filename, path = %path, "importing library");
                self.load_library(&path, error_details).is_some()
            }
            None => {
                append_detail(
                    error_details,
                    &format!("could not find `{filename}` in any search path"),
                );
                false
            }
        }
    }

    fn drive<F>(&mut self, run: F) -> Result<Option<Node>, DriverError>
    where
        F: FnOnce(&mut dyn ProcessingDriver, &mut RootManager) -> Result<Option<Node>, DriverError>,
    {
        let factory = self.driver_factory.clone();
        let mut driver = factory();
        run(driver.as_mut(), self)
    }

    /// Append the parsed statements to the main root scope, returning the
    /// parsed tree itself to the caller.
    fn merge_into_main(&mut self, node: Option<Node>) -> Option<Node> {
        let node = node?;
        if let NodeKind::Scope(scope) = &node.kind {
            let statements: Vec<Node> = scope.children().to_vec();
            if let Some(root_scope) = self.root_scope.as_scope_mut() {
                for statement in statements {
                    root_scope.push(statement);
                }
            }
        }
        Some(node)
    }

    // ============================================================
    // Library loading
    // ============================================================

    /// Load a shared library and register it. A library exporting the
    /// gateway getter must return a non-null, ABI-compatible gateway;
    /// libraries without the symbol load for their symbols alone.
    pub fn load_library(
        &mut self,
        path: &Utf8Path,
        error_details: &mut String,
    ) -> Option<DlHandle> {
        let Some(handle) = dl::open(path) else {
            if let Some(message) = dl::last_error() {
                append_detail(error_details, &message);
            }
            return None;
        };

        // SAFETY: the getter symbol has the ABI-specified signature and
        // the library stays mapped for the rest of the process.
        let getter = unsafe { dl::symbol::<GatewayGetter>(handle, GATEWAY_GETTER_SYMBOL) };
        let gateway: Option<Rc<dyn LibraryGateway>> = match getter {
            Some(getter) => {
                // SAFETY: calling the exported getter per the ABI.
                let raw = unsafe { getter() };
                if raw.is_null() {
                    dl::close(handle);
                    append_detail(error_details, "library gateway getter returned null");
                    return None;
                }
                // SAFETY: non-null table from the getter, retained with
                // the library.
                let foreign = unsafe { ForeignGateway::new(raw) };
                if foreign.abi_version() != GATEWAY_ABI_VERSION {
                    dl::close(handle);
                    append_detail(
                        error_details,
                        &format!(
                            "gateway ABI version {} does not match expected {}",
                            foreign.abi_version(),
                            GATEWAY_ABI_VERSION
                        ),
                    );
                    return None;
                }
                Some(Rc::new(foreign))
            }
            None => None,
        };

        self.add_library(handle, gateway);
        Some(handle)
    }

    /// Register a loaded library. A known handle has its count bumped and
    /// its stored gateway's `initialize_duplicate` run; a new handle is
    /// inserted and `initialize` run.
    pub fn add_library(&mut self, id: DlHandle, gateway: Option<Rc<dyn LibraryGateway>>) {
        if let Some(stored) = self.libraries.bump(id) {
            debug_assert_eq!(
                stored.is_some(),
                gateway.is_some(),
                "duplicate load disagrees about the gateway"
            );
            if let Some(gateway) = stored {
                gateway.initialize_duplicate(self);
            }
            return;
        }
        self.libraries.insert(id, gateway.clone());
        if let Some(gateway) = gateway {
            gateway.initialize(self);
        }
    }

    /// Release one reference to a loaded library, running the matching
    /// gateway callback.
    pub fn remove_library(&mut self, id: DlHandle) -> Result<(), LibraryError> {
        match self.libraries.remove(id)? {
            RemoveOutcome::Removed(Some(gateway)) => gateway.uninitialize(self),
            RemoveOutcome::Decremented(Some(gateway)) => gateway.uninitialize_duplicate(self),
            RemoveOutcome::Removed(None) | RemoveOutcome::Decremented(None) => {}
        }
        Ok(())
    }

    /// Logical unload. The underlying mapping is deliberately retained:
    /// AST nodes may still point at code and type information inside the
    /// library, so it stays mapped until process exit.
    pub fn unload(&mut self, id: DlHandle) -> Result<(), LibraryError> {
        self.remove_library(id)
    }

    /// Unload every library, newest first.
    pub fn unload_all(&mut self) {
        while let Some(id) = self.libraries.last() {
            let _ = self.unload(id);
        }
    }
}

impl Drop for RootManager {
    fn drop(&mut self) {
        self.unload_all();
    }
}

/// Whether a path's extension marks it as a source file. Comparison is
/// byte-exact on the normalized UTF-8 string; no case folding.
pub fn is_source_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn canonical(path: &Utf8Path) -> Utf8Path {
    path.canonicalize().unwrap_or_else(|_| path.clone())
}

fn append_detail(details: &mut String, message: &str) {
    if !details.is_empty() {
        details.push('\n');
    }
    details.push_str(message);
}

/// The directory holding the package's bundled libraries: `<install>/lib`
/// next to the binary directory on POSIX, the binary directory itself on
/// Windows.
fn package_library_directory(bin: &Utf8Path) -> Utf8Path {
    let lib_dir_name = if cfg!(windows) { "bin" } else { "lib" };
    match bin.parent() {
        Some(install) => install.join(lib_dir_name),
        None => bin.clone(),
    }
}

/// The directory containing the running binary, derived from `argv[0]`
/// resolved through symlinks and absolutized against the working
/// directory, with the executable-path fallback for PATH-invoked names.
fn compute_core_bin_path(
    argv0: Option<&String>,
    cwd: &Utf8Path,
) -> Result<Utf8Path, RootError> {
    if let Some(argv0) = argv0 {
        let candidate = if Utf8Path::new(argv0).is_absolute() {
            Utf8Path::new(argv0)
        } else {
            cwd.join(argv0)
        };
        if let Ok(resolved) = candidate.canonicalize() {
            if let Some(parent) = resolved.parent() {
                return Ok(parent);
            }
        }
    }
    Ok(env::module_directory()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ProcessingDriver;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A driver that records invocations and returns an empty scope.
    struct NullDriver {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ProcessingDriver for NullDriver {
        fn process_string(
            &mut self,
            root: &mut RootManager,
            _source: &str,
            name: &str,
        ) -> Result<Option<Node>, DriverError> {
            self.calls.borrow_mut().push(name.to_string());
            let id = root.allocate_node_id();
            Ok(Some(Node::new(
                id,
                NodeKind::Scope(Scope::new()),
                SourceLocation::synthesized(name),
            )))
        }
    }

    fn test_manager() -> (RootManager, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let factory_calls = calls.clone();
        let factory: DriverFactory = Rc::new(move || {
            Box::new(NullDriver {
                calls: factory_calls.clone(),
            })
        });
        let manager = RootManager::new(&["alusus".to_string()], factory).unwrap();
        (manager, calls)
    }

    #[test]
    fn construction_seeds_absolute_search_paths() {
        let (manager, _) = test_manager();
        let stack: Vec<_> = manager.search_path_stack().collect();
        assert!(!stack.is_empty());
        for (path, refs) in stack {
            assert!(path.is_absolute(), "{path} is not absolute");
            assert!(refs >= 1);
        }
        // The working directory is the newest seeded entry.
        let cwd = env::working_directory().unwrap();
        let (top, _) = manager.search_path_stack().last().unwrap();
        assert_eq!(top, &cwd);
    }

    #[test]
    fn push_collapses_repeated_top() {
        let (mut manager, _) = test_manager();
        let depth = manager.search_path_stack().count();
        let path = Utf8Path::new("/some/dir");

        manager.push_search_path(&path).unwrap();
        manager.push_search_path(&path).unwrap();
        assert_eq!(manager.search_path_stack().count(), depth + 1);
        let (_, refs) = manager.search_path_stack().last().unwrap();
        assert_eq!(refs, 2);

        manager.pop_search_path(&path).unwrap();
        assert_eq!(manager.search_path_stack().count(), depth + 1);
        manager.pop_search_path(&path).unwrap();
        assert_eq!(manager.search_path_stack().count(), depth);
    }

    #[test]
    fn push_rejects_relative_and_empty() {
        let (mut manager, _) = test_manager();
        assert!(manager.push_search_path(&Utf8Path::new("relative/dir")).is_err());
        assert!(manager.push_search_path(&Utf8Path::new("")).is_err());
    }

    #[test]
    fn pop_of_absent_path_fails() {
        let (mut manager, _) = test_manager();
        assert!(matches!(
            manager.pop_search_path(&Utf8Path::new("/never/pushed")),
            Err(RootError::InvalidArgument { .. })
        ));
    }

    proptest! {
        /// A balanced push/pop sequence restores the stack exactly.
        #[test]
        fn balanced_push_pop_restores_stack(ops in prop::collection::vec(0usize..3, 0..12)) {
            let (mut manager, _) = test_manager();
            let dirs = [
                Utf8Path::new("/prop/a"),
                Utf8Path::new("/prop/b"),
                Utf8Path::new("/prop/c"),
            ];
            let before: Vec<(Utf8Path, u32)> = manager
                .search_path_stack()
                .map(|(p, r)| (p.clone(), r))
                .collect();

            let mut pushed = Vec::new();
            for op in &ops {
                manager.push_search_path(&dirs[*op]).unwrap();
                pushed.push(*op);
            }
            while let Some(op) = pushed.pop() {
                manager.pop_search_path(&dirs[op]).unwrap();
            }

            let after: Vec<(Utf8Path, u32)> = manager
                .search_path_stack()
                .map(|(p, r)| (p.clone(), r))
                .collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn process_string_merges_into_root_scope() {
        let (mut manager, calls) = test_manager();
        let result = manager.process_string("", "input").unwrap();
        assert!(result.is_some());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn parse_expression_of_empty_result_is_invalid_argument() {
        let (mut manager, _) = test_manager();
        assert!(matches!(
            manager.parse_expression(""),
            Err(RootError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let (mut manager, _) = test_manager();
        match manager.process_file("definitely_missing_source", false) {
            Err(RootError::File(FileError::NotFound(name))) => {
                assert_eq!(name, "definitely_missing_source");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
