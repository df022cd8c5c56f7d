//! The loaded-extension registry.
//!
//! Each loaded shared library gets one [`LibraryEntry`] keyed by its
//! [`DlHandle`]; repeated logical loads of the same handle share the
//! entry and bump its reference count. A library that exports the
//! well-known gateway symbol also carries a [`LibraryGateway`], through
//! which it splices grammar productions, node factories, and built-in
//! operations into the running compiler.
//!
//! The load/unload flow itself lives on
//! [`RootManager`](crate::root::RootManager), because gateway callbacks
//! receive the root manager; this module owns the table and the FFI
//! adapter over the raw gateway vtable.

use crate::platform::dl::DlHandle;
use crate::root::RootManager;
use alusus_gateway::RawGateway;
use std::ffi::{c_char, c_void, CStr};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("id not found among loaded libraries")]
    UnknownId,

    #[error("failed to load `{path}`: {message}")]
    LoadFailed { path: String, message: String },

    #[error("`{path}` carries gateway ABI version {found}, expected {expected}")]
    AbiMismatch {
        path: String,
        found: u32,
        expected: u32,
    },
}

/// Host-side view of an extension's gateway.
///
/// `initialize` runs on the first logical load of a library and
/// `initialize_duplicate` on every load after it; `uninitialize` and
/// `uninitialize_duplicate` mirror them on unload.
pub trait LibraryGateway {
    /// Stable logical identifier, e.g. `"alusus.spp"`.
    fn library_id(&self) -> String;

    fn library_version(&self) -> String {
        String::new()
    }

    fn initialize(&self, root: &mut RootManager);
    fn initialize_duplicate(&self, root: &mut RootManager);
    fn uninitialize(&self, root: &mut RootManager);
    fn uninitialize_duplicate(&self, root: &mut RootManager);

    /// Logical ids of libraries this one requires.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// One loaded library.
pub struct LibraryEntry {
    pub id: DlHandle,
    pub ref_count: u32,
    pub gateway: Option<Rc<dyn LibraryGateway>>,
}

/// Outcome of a table removal, telling the caller which gateway callback
/// to run.
pub(crate) enum RemoveOutcome {
    /// The last reference was dropped and the entry removed.
    Removed(Option<Rc<dyn LibraryGateway>>),
    /// A duplicate reference was released; the entry remains.
    Decremented(Option<Rc<dyn LibraryGateway>>),
}

/// The ref-counted table of loaded libraries. A handle appears at most
/// once; its count equals the number of unbalanced logical loads.
#[derive(Default)]
pub struct LibraryManager {
    entries: Vec<LibraryEntry>,
}

impl LibraryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn ref_count(&self, id: DlHandle) -> Option<u32> {
        self.position(id).map(|idx| self.entries[idx].ref_count)
    }

    /// The handle whose gateway reports `lib_id`, if any.
    pub fn find(&self, lib_id: &str) -> Option<DlHandle> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .gateway
                    .as_ref()
                    .is_some_and(|gw| gw.library_id() == lib_id)
            })
            .map(|entry| entry.id)
    }

    /// The gateway of a loaded library; `None` for gateway-less
    /// libraries. Unknown handles are an error.
    pub fn gateway(&self, id: DlHandle) -> Result<Option<Rc<dyn LibraryGateway>>, LibraryError> {
        self.position(id)
            .map(|idx| self.entries[idx].gateway.clone())
            .ok_or(LibraryError::UnknownId)
    }

    /// The gateway reporting `lib_id`. Unknown ids are an error.
    pub fn gateway_by_id(&self, lib_id: &str) -> Result<Rc<dyn LibraryGateway>, LibraryError> {
        self.entries
            .iter()
            .filter_map(|entry| entry.gateway.clone())
            .find(|gw| gw.library_id() == lib_id)
            .ok_or(LibraryError::UnknownId)
    }

    fn position(&self, id: DlHandle) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// The most recently added handle.
    pub(crate) fn last(&self) -> Option<DlHandle> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Bump the count of a known handle, returning its gateway; `None`
    /// when the handle is not in the table.
    pub(crate) fn bump(&mut self, id: DlHandle) -> Option<Option<Rc<dyn LibraryGateway>>> {
        let idx = self.position(id)?;
        self.entries[idx].ref_count += 1;
        Some(self.entries[idx].gateway.clone())
    }

    /// Insert a fresh entry with a count of one.
    pub(crate) fn insert(&mut self, id: DlHandle, gateway: Option<Rc<dyn LibraryGateway>>) {
        debug_assert!(self.position(id).is_none(), "handle already in the table");
        self.entries.push(LibraryEntry {
            id,
            ref_count: 1,
            gateway,
        });
    }

    /// Release one reference, removing the entry at zero.
    pub(crate) fn remove(&mut self, id: DlHandle) -> Result<RemoveOutcome, LibraryError> {
        let idx = self.position(id).ok_or(LibraryError::UnknownId)?;
        if self.entries[idx].ref_count == 1 {
            let entry = self.entries.remove(idx);
            Ok(RemoveOutcome::Removed(entry.gateway))
        } else {
            self.entries[idx].ref_count -= 1;
            Ok(RemoveOutcome::Decremented(self.entries[idx].gateway.clone()))
        }
    }
}

/// Adapter over the `#[repr(C)]` gateway table obtained through the
/// exported getter symbol.
pub(crate) struct ForeignGateway {
    raw: *const RawGateway,
}

impl ForeignGateway {
    /// # Safety
    ///
    /// `raw` must point at a valid gateway table that stays alive for the
    /// rest of the process. The platform layer guarantees this by never
    /// unmapping loaded libraries.
    pub(crate) unsafe fn new(raw: *const RawGateway) -> Self {
        Self { raw }
    }

    pub(crate) fn abi_version(&self) -> u32 {
        self.table().abi_version
    }

    fn table(&self) -> &RawGateway {
        // SAFETY: validity and lifetime guaranteed by the `new` contract.
        unsafe { &*self.raw }
    }

    fn root_ptr(root: &mut RootManager) -> *mut c_void {
        root as *mut RootManager as *mut c_void
    }
}

fn owned_c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: the gateway contract promises NUL-terminated UTF-8 with the
    // library's lifetime.
    unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() }
}

impl LibraryGateway for ForeignGateway {
    fn library_id(&self) -> String {
        // SAFETY: calling a table function pointer per the ABI contract.
        owned_c_string(unsafe { (self.table().library_id)() })
    }

    fn library_version(&self) -> String {
        // SAFETY: as above.
        owned_c_string(unsafe { (self.table().library_version)() })
    }

    fn initialize(&self, root: &mut RootManager) {
        // SAFETY: as above; the root pointer is only handed back to us.
        unsafe { (self.table().initialize)(Self::root_ptr(root)) }
    }

    fn initialize_duplicate(&self, root: &mut RootManager) {
        // SAFETY: as above.
        unsafe { (self.table().initialize_duplicate)(Self::root_ptr(root)) }
    }

    fn uninitialize(&self, root: &mut RootManager) {
        // SAFETY: as above.
        unsafe { (self.table().uninitialize)(Self::root_ptr(root)) }
    }

    fn uninitialize_duplicate(&self, root: &mut RootManager) {
        // SAFETY: as above.
        unsafe { (self.table().uninitialize_duplicate)(Self::root_ptr(root)) }
    }

    fn dependencies(&self) -> Vec<String> {
        let Some(deps_fn) = self.table().dependencies else {
            return Vec::new();
        };
        let mut deps = Vec::new();
        // SAFETY: the ABI promises a null-terminated array of
        // NUL-terminated strings.
        unsafe {
            let mut cursor = deps_fn();
            if cursor.is_null() {
                return deps;
            }
            while !(*cursor).is_null() {
                deps.push(owned_c_string(*cursor));
                cursor = cursor.add(1);
            }
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::dl::DlHandle;

    fn handle(raw: usize) -> DlHandle {
        DlHandle::from_raw(raw)
    }

    #[test]
    fn insert_bump_remove_algebra() {
        let mut manager = LibraryManager::new();
        let id = handle(7);

        manager.insert(id, None);
        assert_eq!(manager.ref_count(id), Some(1));

        assert!(manager.bump(id).is_some());
        assert!(manager.bump(id).is_some());
        assert_eq!(manager.ref_count(id), Some(3));

        assert!(matches!(
            manager.remove(id),
            Ok(RemoveOutcome::Decremented(None))
        ));
        assert!(matches!(
            manager.remove(id),
            Ok(RemoveOutcome::Decremented(None))
        ));
        assert_eq!(manager.ref_count(id), Some(1));

        assert!(matches!(manager.remove(id), Ok(RemoveOutcome::Removed(None))));
        assert!(manager.is_empty());
        assert!(matches!(manager.remove(id), Err(LibraryError::UnknownId)));
    }

    #[test]
    fn bump_unknown_handle_is_none() {
        let mut manager = LibraryManager::new();
        assert!(manager.bump(handle(9)).is_none());
    }

    #[test]
    fn gateway_lookup_on_unknown_id_errors() {
        let manager = LibraryManager::new();
        assert!(matches!(
            manager.gateway(handle(1)),
            Err(LibraryError::UnknownId)
        ));
        assert!(matches!(
            manager.gateway_by_id("nope"),
            Err(LibraryError::UnknownId)
        ));
    }
}
