//! Library-manager integration tests: reference counting, gateway
//! callback ordering, and load-failure reporting.

use std::cell::RefCell;
use std::rc::Rc;

use alusus_core::driver::DriverFactory;
use alusus_core::engine::Engine;
use alusus_core::library::{LibraryError, LibraryGateway};
use alusus_core::platform::dl;
use alusus_core::platform::Utf8Path;
use alusus_core::root::RootManager;

/// Records every gateway callback in order.
struct RecordingGateway {
    id: String,
    events: Rc<RefCell<Vec<String>>>,
}

impl RecordingGateway {
    fn new(id: &str, events: Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            events,
        })
    }

    fn record(&self, event: &str) {
        self.events.borrow_mut().push(format!("{}:{event}", self.id));
    }
}

impl LibraryGateway for RecordingGateway {
    fn library_id(&self) -> String {
        self.id.clone()
    }

    fn initialize(&self, _root: &mut RootManager) {
        self.record("initialize");
    }

    fn initialize_duplicate(&self, _root: &mut RootManager) {
        self.record("initialize_duplicate");
    }

    fn uninitialize(&self, _root: &mut RootManager) {
        self.record("uninitialize");
    }

    fn uninitialize_duplicate(&self, _root: &mut RootManager) {
        self.record("uninitialize_duplicate");
    }
}

fn new_root() -> RootManager {
    let factory: DriverFactory = Rc::new(|| Box::new(Engine::new()));
    RootManager::new(&["alusus".to_string()], factory).unwrap()
}

fn root_with_events() -> (RootManager, Rc<RefCell<Vec<String>>>) {
    (new_root(), Rc::new(RefCell::new(Vec::new())))
}

#[test]
fn refcount_algebra_over_loads_and_unloads() {
    let (mut root, events) = root_with_events();
    let gateway = RecordingGateway::new("test.lib", events.clone());
    let id = dl::DlHandle::from_raw(41);

    // Three logical loads of the same handle.
    root.add_library(id, Some(gateway.clone()));
    root.add_library(id, Some(gateway.clone()));
    root.add_library(id, Some(gateway.clone()));
    assert_eq!(root.libraries().ref_count(id), Some(3));
    assert_eq!(
        &*events.borrow(),
        &[
            "test.lib:initialize",
            "test.lib:initialize_duplicate",
            "test.lib:initialize_duplicate"
        ]
    );

    // Two unloads leave the entry alive.
    root.unload(id).unwrap();
    root.unload(id).unwrap();
    assert_eq!(root.libraries().ref_count(id), Some(1));

    // The final unload removes it and runs uninitialize.
    root.unload(id).unwrap();
    assert!(root.libraries().is_empty());
    assert_eq!(
        events.borrow().last().map(String::as_str),
        Some("test.lib:uninitialize")
    );
    let dup_uninits = events
        .borrow()
        .iter()
        .filter(|e| e.ends_with("uninitialize_duplicate"))
        .count();
    assert_eq!(dup_uninits, 2);
}

#[test]
fn unload_of_unknown_id_is_an_error() {
    let (mut root, _) = root_with_events();
    assert!(matches!(
        root.unload(dl::DlHandle::from_raw(99)),
        Err(LibraryError::UnknownId)
    ));
}

#[test]
fn find_and_gateway_lookups() {
    let (mut root, events) = root_with_events();
    let first = RecordingGateway::new("lib.first", events.clone());
    let second = RecordingGateway::new("lib.second", events.clone());
    let first_id = dl::DlHandle::from_raw(1);
    let second_id = dl::DlHandle::from_raw(2);

    root.add_library(first_id, Some(first));
    root.add_library(second_id, Some(second));
    root.add_library(dl::DlHandle::from_raw(3), None);

    assert_eq!(root.libraries().find("lib.second"), Some(second_id));
    assert_eq!(root.libraries().find("lib.missing"), None);

    let gateway = root.libraries().gateway(first_id).unwrap().unwrap();
    assert_eq!(gateway.library_id(), "lib.first");

    // The gateway-less library is present but exposes no gateway.
    let none = root
        .libraries()
        .gateway(dl::DlHandle::from_raw(3))
        .unwrap();
    assert!(none.is_none());

    assert!(matches!(
        root.libraries().gateway_by_id("lib.missing"),
        Err(LibraryError::UnknownId)
    ));
}

#[test]
fn unload_all_releases_newest_first() {
    let (mut root, events) = root_with_events();
    root.add_library(
        dl::DlHandle::from_raw(1),
        Some(RecordingGateway::new("lib.a", events.clone())),
    );
    root.add_library(
        dl::DlHandle::from_raw(2),
        Some(RecordingGateway::new("lib.b", events.clone())),
    );

    events.borrow_mut().clear();
    root.unload_all();
    assert!(root.libraries().is_empty());
    assert_eq!(
        &*events.borrow(),
        &["lib.b:uninitialize", "lib.a:uninitialize"]
    );
}

#[test]
fn load_failure_appends_os_error_details() {
    let mut root = new_root();
    let mut details = String::new();
    let handle = root.load_library(&Utf8Path::new("/nonexistent/libnope.so"), &mut details);
    assert!(handle.is_none());
    assert!(!details.is_empty());

    // A second failure appends on a new line rather than replacing.
    let previous = details.clone();
    let handle = root.load_library(&Utf8Path::new("/nonexistent/libnope2.so"), &mut details);
    assert!(handle.is_none());
    assert!(details.starts_with(&previous));
    assert!(details.len() > previous.len());
    assert!(details.contains('\n'));
}
