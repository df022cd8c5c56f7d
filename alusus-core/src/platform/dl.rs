//! Dynamic-library primitives.
//!
//! Libraries are loaded with POSIX semantics (symbols global; on Linux
//! additionally deep-bound so a library's own symbols win during its
//! relocation). Loading the same path twice yields the same [`DlHandle`].
//!
//! Loaded libraries are retained in a process-global registry and are
//! never unmapped during a run: AST nodes produced by an extension may
//! keep pointing into it long after the logical unload, so [`close`] only
//! releases a logical reference and the OS reclaims the mapping at
//! process exit. This is a correctness requirement, not a shortcut.
//!
//! The last OS-level error is recorded in thread-local storage and read
//! back with [`last_error`]; it stays valid until the next `dl` call on
//! the same thread, so concurrent loads on separate threads do not race
//! on error state.

use super::path::Utf8Path;
use libloading::Library;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Opaque identifier of a loaded shared library. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DlHandle(usize);

impl DlHandle {
    pub fn raw(self) -> usize {
        self.0
    }

    /// Fabricate a handle value. Real handles come from [`open`]; this
    /// exists so tables keyed by handles can be exercised without
    /// loading anything.
    pub fn from_raw(raw: usize) -> Self {
        DlHandle(raw)
    }
}

struct Retained {
    library: Library,
    refs: u32,
}

struct Registry {
    by_path: HashMap<String, DlHandle>,
    entries: HashMap<usize, Retained>,
    next_id: usize,
}

fn registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Mutex::new(Registry {
            by_path: HashMap::new(),
            entries: HashMap::new(),
            next_id: 1,
        })
    })
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn record_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

fn clear_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// The error recorded by the most recent `dl` operation on this thread,
/// if that operation failed.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Load a shared library. Returns `None` on failure, with the OS message
/// retrievable via [`last_error`].
///
/// The registry key is the canonical path when the file exists, so two
/// spellings of the same library resolve to one handle.
pub fn open(path: &Utf8Path) -> Option<DlHandle> {
    clear_error();
    let key = std::fs::canonicalize(path.as_std_path())
        .ok()
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| path.as_str().to_string());

    let mut reg = registry().lock();
    if let Some(&handle) = reg.by_path.get(&key) {
        if let Some(entry) = reg.entries.get_mut(&handle.raw()) {
            entry.refs += 1;
        }
        return Some(handle);
    }

    match load_library(path.as_str()) {
        Ok(library) => {
            let handle = DlHandle(reg.next_id);
            reg.next_id += 1;
            reg.by_path.insert(key, handle);
            reg.entries
                .insert(handle.raw(), Retained { library, refs: 1 });
            tracing::debug!(path = %path, handle = handle.raw(), "loaded shared library");
            Some(handle)
        }
        Err(err) => {
            record_error(err.to_string());
            None
        }
    }
}

/// Resolve a symbol within a loaded library. `name` must be
/// NUL-terminated. Returns `None` (with the error recorded) when the
/// handle is unknown or the symbol is absent.
///
/// # Safety
///
/// `T` must be the symbol's true type. The registry keeps the library
/// mapped for the rest of the process, so the returned value never
/// dangles, but calling through a mistyped function pointer is undefined
/// behavior.
pub unsafe fn symbol<T: Copy>(handle: DlHandle, name: &[u8]) -> Option<T> {
    clear_error();
    let reg = registry().lock();
    let Some(entry) = reg.entries.get(&handle.raw()) else {
        record_error(format!("unknown library handle {}", handle.raw()));
        return None;
    };
    match entry.library.get::<T>(name) {
        Ok(sym) => Some(*sym),
        Err(err) => {
            record_error(err.to_string());
            None
        }
    }
}

/// Release one logical reference to a loaded library. The mapping itself
/// is retained until process exit.
pub fn close(handle: DlHandle) {
    clear_error();
    let mut reg = registry().lock();
    match reg.entries.get_mut(&handle.raw()) {
        Some(entry) => {
            entry.refs = entry.refs.saturating_sub(1);
        }
        None => record_error(format!("unknown library handle {}", handle.raw())),
    }
}

/// Whether a handle refers to a library in the retained registry.
pub fn is_loaded(handle: DlHandle) -> bool {
    registry().lock().entries.contains_key(&handle.raw())
}

/// The logical reference count of a loaded library.
pub fn ref_count(handle: DlHandle) -> Option<u32> {
    registry().lock().entries.get(&handle.raw()).map(|e| e.refs)
}

#[cfg(unix)]
fn load_library(path: &str) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_NOW};

    #[cfg(target_os = "linux")]
    const RTLD_DEEPBIND: std::os::raw::c_int = 0x8;

    #[allow(unused_mut)]
    let mut flags = RTLD_NOW | RTLD_GLOBAL;
    #[cfg(target_os = "linux")]
    {
        flags |= RTLD_DEEPBIND;
    }
    // SAFETY: library initializers run on load; the caller trusts the
    // library being loaded, as with any `dlopen`.
    unsafe { UnixLibrary::open(Some(path), flags).map(Library::from) }
}

#[cfg(windows)]
fn load_library(path: &str) -> Result<Library, libloading::Error> {
    // SAFETY: as above.
    unsafe { Library::new(path) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_library_records_error() {
        let handle = open(&Utf8Path::new("/nonexistent/libnope.so"));
        assert!(handle.is_none());
        assert!(last_error().is_some());
    }

    #[test]
    fn error_state_is_thread_local() {
        let _ = open(&Utf8Path::new("/nonexistent/libnope.so"));
        assert!(last_error().is_some());
        let other = std::thread::spawn(last_error).join().unwrap();
        assert!(other.is_none(), "fresh thread must see no recorded error");
    }

    #[test]
    fn close_unknown_handle_records_error() {
        close(DlHandle(usize::MAX));
        assert!(last_error().is_some());
    }

    #[test]
    fn symbol_on_unknown_handle_fails() {
        let sym = unsafe { symbol::<extern "C" fn()>(DlHandle(usize::MAX), b"nope\0") };
        assert!(sym.is_none());
        assert!(last_error().is_some());
    }
}
