//! Extension ABI for the Alusus compiler core.
//!
//! A native extension library makes itself known to the core by exporting a
//! single C-linkage function named [`GATEWAY_GETTER_NAME`] that returns a
//! pointer to a [`RawGateway`]. The core probes for that symbol after
//! loading the library; libraries that do not export it are still loaded
//! and simply publish their symbols.
//!
//! The gateway is a plain function-pointer table rather than a Rust trait
//! object: nothing about the Rust object model crosses the `dlopen`
//! boundary. The core wraps the table in its own trait on the host side.
//!
//! # Exporting a gateway
//!
//! ```no_run
//! use std::ffi::{c_char, c_void};
//! use alusus_gateway::{RawGateway, GATEWAY_ABI_VERSION};
//!
//! unsafe extern "C" fn library_id() -> *const c_char {
//!     c"my.extension".as_ptr()
//! }
//! unsafe extern "C" fn library_version() -> *const c_char {
//!     c"0.1.0".as_ptr()
//! }
//! unsafe extern "C" fn initialize(_root: *mut c_void) {}
//! unsafe extern "C" fn initialize_duplicate(_root: *mut c_void) {}
//! unsafe extern "C" fn uninitialize(_root: *mut c_void) {}
//! unsafe extern "C" fn uninitialize_duplicate(_root: *mut c_void) {}
//!
//! static GATEWAY: RawGateway = RawGateway {
//!     abi_version: GATEWAY_ABI_VERSION,
//!     library_id,
//!     library_version,
//!     initialize,
//!     initialize_duplicate,
//!     uninitialize,
//!     uninitialize_duplicate,
//!     dependencies: None,
//! };
//!
//! #[no_mangle]
//! pub extern "C" fn alusus_get_library_gateway() -> *const RawGateway {
//!     &GATEWAY
//! }
//! ```

use std::ffi::{c_char, c_void};

/// Name of the C-linkage getter symbol the core probes for after `dlopen`.
pub const GATEWAY_GETTER_NAME: &str = "alusus_get_library_gateway";

/// [`GATEWAY_GETTER_NAME`] as a NUL-terminated byte string, ready for
/// symbol lookup.
pub const GATEWAY_GETTER_SYMBOL: &[u8] = b"alusus_get_library_gateway\0";

/// Version of the gateway table layout. The core refuses tables carrying a
/// different major version.
pub const GATEWAY_ABI_VERSION: u32 = 1;

/// Signature of the exported getter function.
///
/// Returning a null pointer is an error: the core treats "getter present
/// but returned null" as a failed load and releases the library reference.
pub type GatewayGetter = unsafe extern "C" fn() -> *const RawGateway;

/// The gateway function-pointer table.
///
/// The table must live for as long as the library stays mapped (in
/// practice: a `static`). All strings returned through it are borrowed
/// NUL-terminated UTF-8 owned by the library.
///
/// `root` is an opaque handle to the host's root manager; extension code
/// hands it back to host callbacks and never dereferences it.
#[repr(C)]
pub struct RawGateway {
    /// Must equal [`GATEWAY_ABI_VERSION`].
    pub abi_version: u32,
    /// Stable logical identifier of the library (e.g. `"alusus.spp"`).
    pub library_id: unsafe extern "C" fn() -> *const c_char,
    /// Human-readable library version string.
    pub library_version: unsafe extern "C" fn() -> *const c_char,
    /// Called on the first logical load of this library.
    pub initialize: unsafe extern "C" fn(root: *mut c_void),
    /// Called on every logical load after the first (same handle).
    pub initialize_duplicate: unsafe extern "C" fn(root: *mut c_void),
    /// Called on the final logical unload.
    pub uninitialize: unsafe extern "C" fn(root: *mut c_void),
    /// Called on every logical unload that leaves the library loaded.
    pub uninitialize_duplicate: unsafe extern "C" fn(root: *mut c_void),
    /// Optional: returns a null-terminated array of NUL-terminated library
    /// ids this library depends on. Null (`None`) means no dependencies.
    pub dependencies: Option<unsafe extern "C" fn() -> *const *const c_char>,
}

// The table only carries function pointers; sharing it across threads is
// the host's concern.
unsafe impl Sync for RawGateway {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getter_symbol_is_nul_terminated_name() {
        assert_eq!(GATEWAY_GETTER_SYMBOL.last(), Some(&0u8));
        assert_eq!(
            &GATEWAY_GETTER_SYMBOL[..GATEWAY_GETTER_SYMBOL.len() - 1],
            GATEWAY_GETTER_NAME.as_bytes()
        );
    }

    #[test]
    fn table_layout_is_stable() {
        // One u32 (padded) plus six function pointers plus one optional
        // function pointer. A layout change here is an ABI break.
        let ptr = std::mem::size_of::<usize>();
        assert_eq!(std::mem::size_of::<RawGateway>(), ptr + 7 * ptr);
    }
}
