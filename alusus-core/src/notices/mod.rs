//! Build notices: the diagnostics that passes and the processing driver
//! produce during a compilation.
//!
//! Notices are collected rather than thrown; exceptions are reserved for
//! unrecoverable conditions. Each notice pairs a stable code with a
//! severity, an optional source location, and descriptive text that is
//! localized through the [`l18n::L18nDictionary`] at display time.
//!
//! The [`NoticeBus`] is the relay every diagnostic flows through: passes
//! append to its store, [`NoticeBus::flush`] delivers the stored notices
//! to the connected slots in order, and the minimum severity seen since
//! the last reset is tracked on every delivery.

pub mod l18n;

use crate::span::SourceLocation;
use colored::Colorize;
use l18n::L18nDictionary;
use std::rc::Rc;

/// Notice severity. Lower numeric levels are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Fatal = 0,
    Error = 1,
    CriticalWarning = 2,
    Warning = 3,
    Info = 4,
}

impl Severity {
    /// Numeric level, 0 (fatal) through 4 (info).
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Whether a build that encountered this severity has failed.
    pub fn is_failure(self) -> bool {
        self.level() <= 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::CriticalWarning | Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

/// The notice codes the core itself produces. Extension libraries add
/// their own codes as plain strings through [`Notice::custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCode {
    // Driver notices (A1xxx).
    UnexpectedToken,
    UnexpectedEof,
    UnclosedString,
    InvalidNumber,
    InvalidCharLiteral,
    // Orchestration notices (A2xxx).
    ImportLoadFailed,
    InvalidImportArg,
    InvalidDumpArg,
}

impl NoticeCode {
    /// The stable code string, which doubles as the L18n dictionary key.
    pub fn key(self) -> &'static str {
        match self {
            NoticeCode::UnexpectedToken => "A1001",
            NoticeCode::UnexpectedEof => "A1002",
            NoticeCode::UnclosedString => "A1003",
            NoticeCode::InvalidNumber => "A1004",
            NoticeCode::InvalidCharLiteral => "A1005",
            NoticeCode::ImportLoadFailed => "A2001",
            NoticeCode::InvalidImportArg => "A2002",
            NoticeCode::InvalidDumpArg => "A2003",
        }
    }

    /// Built-in English text, used when the dictionary has no entry.
    pub fn default_text(self) -> &'static str {
        match self {
            NoticeCode::UnexpectedToken => "unexpected token",
            NoticeCode::UnexpectedEof => "unexpected end of input",
            NoticeCode::UnclosedString => "unclosed string literal",
            NoticeCode::InvalidNumber => "invalid numeric literal",
            NoticeCode::InvalidCharLiteral => "invalid character literal",
            NoticeCode::ImportLoadFailed => "importing failed",
            NoticeCode::InvalidImportArg => "invalid import argument",
            NoticeCode::InvalidDumpArg => "invalid dump argument",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            NoticeCode::UnexpectedToken
            | NoticeCode::UnexpectedEof
            | NoticeCode::UnclosedString
            | NoticeCode::InvalidNumber
            | NoticeCode::InvalidCharLiteral
            | NoticeCode::ImportLoadFailed => Severity::Error,
            NoticeCode::InvalidImportArg | NoticeCode::InvalidDumpArg => Severity::Warning,
        }
    }
}

/// An immutable diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    code: String,
    severity: Severity,
    location: Option<SourceLocation>,
    default_text: String,
    detail: Option<String>,
}

impl Notice {
    /// Create a notice for one of the core's codes.
    pub fn new(code: NoticeCode, location: impl Into<Option<SourceLocation>>) -> Self {
        Self {
            code: code.key().to_string(),
            severity: code.severity(),
            location: location.into(),
            default_text: code.default_text().to_string(),
            detail: None,
        }
    }

    /// Create a notice with a caller-supplied code, for extensions.
    pub fn custom(
        code: impl Into<String>,
        severity: Severity,
        location: impl Into<Option<SourceLocation>>,
        default_text: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            location: location.into(),
            default_text: default_text.into(),
            detail: None,
        }
    }

    /// Attach free-form detail text (an offending name, an OS error).
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The human-readable description: the localized text for this
    /// notice's code when the dictionary has one, the built-in text
    /// otherwise, with any detail appended.
    pub fn description(&self, dictionary: &L18nDictionary) -> String {
        let base = dictionary.get(&self.code).unwrap_or(&self.default_text);
        match &self.detail {
            Some(detail) => format!("{base}: {detail}"),
            None => base.to_string(),
        }
    }
}

/// A connected notice observer.
pub type NoticeSlot = Box<dyn FnMut(&Notice)>;

/// The relay all compilation diagnostics flow through.
///
/// The store is append-only between flushes; delivery order equals
/// insertion order. The minimum severity encountered is snapshotted on
/// every delivery and survives flushes until explicitly reset.
#[derive(Default)]
pub struct NoticeBus {
    store: Vec<Rc<Notice>>,
    slots: Vec<NoticeSlot>,
    min_severity: Option<Severity>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect an observer that sees every delivered notice.
    pub fn connect(&mut self, slot: NoticeSlot) {
        self.slots.push(slot);
    }

    /// Append a notice to the store without delivering it.
    pub fn add(&mut self, notice: Notice) {
        self.store.push(Rc::new(notice));
    }

    /// Deliver a notice to every slot immediately, bypassing the store.
    pub fn emit(&mut self, notice: Notice) {
        self.deliver(Rc::new(notice));
    }

    fn deliver(&mut self, notice: Rc<Notice>) {
        let severity = notice.severity();
        if self.min_severity.map_or(true, |min| severity < min) {
            self.min_severity = Some(severity);
        }
        for slot in &mut self.slots {
            slot(&notice);
        }
    }

    /// Number of stored, not-yet-flushed notices.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn get(&self, index: usize) -> Option<&Notice> {
        self.store.get(index).map(Rc::as_ref)
    }

    /// Deliver and remove the first `n` stored notices, in order.
    pub fn flush_first(&mut self, n: usize) {
        let n = n.min(self.store.len());
        let pending: Vec<Rc<Notice>> = self.store.drain(..n).collect();
        for notice in pending {
            self.deliver(notice);
        }
    }

    /// Deliver and remove every stored notice, in order.
    pub fn flush(&mut self) {
        self.flush_first(self.store.len());
    }

    /// The minimum severity delivered since the last reset, or `None`
    /// when nothing has been delivered.
    pub fn min_severity(&self) -> Option<Severity> {
        self.min_severity
    }

    pub fn reset_min_severity(&mut self) {
        self.min_severity = None;
    }
}

/// Print a notice to stderr with a severity-colored label.
pub fn print_notice(notice: &Notice, dictionary: &L18nDictionary) {
    let label = match notice.severity() {
        Severity::Fatal | Severity::Error => notice.severity().label().red().bold(),
        Severity::CriticalWarning | Severity::Warning => notice.severity().label().yellow().bold(),
        Severity::Info => notice.severity().label().cyan(),
    };
    match notice.location() {
        Some(location) => eprintln!(
            "{} [{}] {} ({})",
            label,
            notice.code(),
            notice.description(dictionary),
            location
        ),
        None => eprintln!(
            "{} [{}] {}",
            label,
            notice.code(),
            notice.description(dictionary)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation::new("test.alusus", line, 1)
    }

    #[test]
    fn severity_ordering_and_failure() {
        assert!(Severity::Fatal < Severity::Error);
        assert!(Severity::Error < Severity::Info);
        assert!(Severity::Error.is_failure());
        assert!(!Severity::CriticalWarning.is_failure());
    }

    #[test]
    fn flush_preserves_insertion_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NoticeBus::new();
        let sink = seen.clone();
        bus.connect(Box::new(move |n: &Notice| {
            sink.borrow_mut().push(n.code().to_string());
        }));

        bus.add(Notice::new(NoticeCode::UnexpectedToken, loc(1)));
        bus.add(Notice::new(NoticeCode::ImportLoadFailed, loc(2)));
        bus.add(Notice::new(NoticeCode::InvalidDumpArg, loc(3)));
        assert_eq!(bus.count(), 3);

        bus.flush();
        assert_eq!(bus.count(), 0);
        assert_eq!(&*seen.borrow(), &["A1001", "A2001", "A2003"]);
    }

    #[test]
    fn flush_first_removes_exactly_n() {
        let mut bus = NoticeBus::new();
        bus.add(Notice::new(NoticeCode::UnexpectedToken, loc(1)));
        bus.add(Notice::new(NoticeCode::UnexpectedEof, loc(2)));
        bus.flush_first(1);
        assert_eq!(bus.count(), 1);
        assert_eq!(bus.get(0).unwrap().code(), "A1002");
    }

    #[test]
    fn min_severity_tracks_deliveries_only() {
        let mut bus = NoticeBus::new();
        assert_eq!(bus.min_severity(), None);

        // Stored but not delivered: not yet tracked.
        bus.add(Notice::new(NoticeCode::UnexpectedToken, loc(1)));
        assert_eq!(bus.min_severity(), None);

        bus.flush();
        assert_eq!(bus.min_severity(), Some(Severity::Error));

        bus.emit(Notice::new(NoticeCode::InvalidDumpArg, loc(2)));
        assert_eq!(bus.min_severity(), Some(Severity::Error));

        bus.reset_min_severity();
        assert_eq!(bus.min_severity(), None);

        bus.emit(Notice::new(NoticeCode::InvalidDumpArg, loc(3)));
        assert_eq!(bus.min_severity(), Some(Severity::Warning));
    }

    #[test]
    fn min_severity_bounds_every_delivery() {
        let mut bus = NoticeBus::new();
        for code in [
            NoticeCode::InvalidDumpArg,
            NoticeCode::UnexpectedToken,
            NoticeCode::InvalidImportArg,
        ] {
            bus.emit(Notice::new(code, loc(1)));
            let min = bus.min_severity().unwrap();
            assert!(min <= code.severity());
        }
    }

    #[test]
    fn description_prefers_dictionary_text() {
        let mut dict = L18nDictionary::new();
        let notice = Notice::new(NoticeCode::ImportLoadFailed, None).with_detail("foo");
        assert_eq!(notice.description(&dict), "importing failed: foo");

        dict.add_entry("en", "A2001", "could not import");
        assert_eq!(notice.description(&dict), "could not import: foo");
    }
}
