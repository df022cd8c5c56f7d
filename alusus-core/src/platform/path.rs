//! UTF-8 path values.
//!
//! [`Utf8Path`] is a semantic wrapper over the native path representation
//! that always presents UTF-8 externally. Values are normalized on
//! construction, so equality, ordering, and hashing operate on identical
//! byte sequences for equal paths. Normalization is lexical (it collapses
//! `.`, `..`, and duplicate separators without touching the filesystem);
//! [`Utf8Path::canonicalize`] additionally resolves symlinks through the
//! OS.

use super::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path as StdPath;

/// An owned, normalized, UTF-8 path.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Utf8Path {
    inner: String,
}

impl Utf8Path {
    /// Create a path from a UTF-8 string, normalizing it.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            inner: normalize(path.as_ref()),
        }
    }

    /// The normalized path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// View as a standard-library path for filesystem calls.
    pub fn as_std_path(&self) -> &StdPath {
        StdPath::new(&self.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Join another path onto this one. An absolute `other` replaces
    /// `self` entirely; the result is normalized.
    pub fn join(&self, other: impl AsRef<str>) -> Utf8Path {
        let other = other.as_ref();
        if is_absolute_str(other) || self.inner.is_empty() {
            return Utf8Path::new(other);
        }
        Utf8Path::new(format!("{}/{}", self.inner, other))
    }

    /// The parent directory, or `None` at a filesystem root or for a
    /// single relative component.
    pub fn parent(&self) -> Option<Utf8Path> {
        let trimmed = self.inner.trim_end_matches('/');
        let cut = trimmed.rfind('/')?;
        if cut == 0 {
            if trimmed.len() == 1 {
                return None; // already at "/"
            }
            return Some(Utf8Path::new("/"));
        }
        Some(Utf8Path::new(&trimmed[..cut]))
    }

    /// The final component, or `None` for a root or for `.`/`..`.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        let name = match trimmed.rfind('/') {
            Some(cut) => &trimmed[cut + 1..],
            None => trimmed,
        };
        match name {
            "" | "." | ".." => None,
            _ => Some(name),
        }
    }

    /// The extension of the final component, including the leading dot
    /// (`".alusus"`). A leading dot alone (`".profile"`) is not an
    /// extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx..]),
        }
    }

    /// Whether the path is absolute.
    pub fn is_absolute(&self) -> bool {
        is_absolute_str(&self.inner)
    }

    /// Whether something exists at this path.
    pub fn exists(&self) -> bool {
        fs::metadata(self.as_std_path()).is_ok()
    }

    /// Whether this path names a regular file.
    pub fn is_file(&self) -> bool {
        fs::metadata(self.as_std_path())
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Whether this path names a directory.
    pub fn is_dir(&self) -> bool {
        fs::metadata(self.as_std_path())
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Whether this path names a symbolic link (not followed).
    pub fn is_symlink(&self) -> bool {
        fs::symlink_metadata(self.as_std_path())
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// Resolve the path through the OS: symlinks followed, the result
    /// absolute. Fails when the path does not exist or is not UTF-8.
    pub fn canonicalize(&self) -> Result<Utf8Path, PlatformError> {
        let resolved = fs::canonicalize(self.as_std_path())
            .map_err(|e| PlatformError::io(self.as_str(), e))?;
        from_std_path(&resolved)
    }
}

impl fmt::Display for Utf8Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl fmt::Debug for Utf8Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

impl From<&str> for Utf8Path {
    fn from(s: &str) -> Self {
        Utf8Path::new(s)
    }
}

impl From<String> for Utf8Path {
    fn from(s: String) -> Self {
        Utf8Path::new(s)
    }
}

impl AsRef<str> for Utf8Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

/// Convert a standard-library path, failing on non-UTF-8 contents.
pub fn from_std_path(path: &StdPath) -> Result<Utf8Path, PlatformError> {
    path.to_str()
        .map(Utf8Path::new)
        .ok_or_else(|| PlatformError::NonUtf8Path(path.to_string_lossy().into_owned()))
}

fn is_absolute_str(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    #[cfg(windows)]
    {
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            return true;
        }
        if path.starts_with("\\\\") {
            return true;
        }
    }
    false
}

/// Lexical path normalization: separators unified to `/`, `.` segments
/// dropped, `..` collapsed against preceding segments, trailing
/// separators removed. Idempotent.
pub fn normalize(path: &str) -> String {
    #[cfg(windows)]
    let path = &path.replace('\\', "/");
    #[cfg(not(windows))]
    let path: &str = path;

    if path.is_empty() {
        return String::new();
    }

    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {} // "/.." stays at the root
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize("/a/b/../c"), "/a/c");
        assert_eq!(normalize("/a//b/./c/"), "/a/b/c");
        assert_eq!(normalize("a/../.."), "..");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("./a"), "a");
        assert_eq!(normalize("a/.."), ".");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["/a/b/../c", "a//b", "../x/./y", "/", ".", "x/../../y"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "normalize({raw:?}) not stable");
        }
    }

    #[test]
    fn equality_is_on_normalized_form() {
        assert_eq!(Utf8Path::new("/a/./b"), Utf8Path::new("/a//b"));
        assert_ne!(Utf8Path::new("/a/b"), Utf8Path::new("/a/c"));
    }

    #[test]
    fn join_and_parent() {
        let base = Utf8Path::new("/work/dir");
        assert_eq!(base.join("b.alusus").as_str(), "/work/dir/b.alusus");
        assert_eq!(base.join("/other").as_str(), "/other");
        assert_eq!(base.parent(), Some(Utf8Path::new("/work")));
        assert_eq!(Utf8Path::new("/").parent(), None);
        assert_eq!(Utf8Path::new("name").parent(), None);
    }

    #[test]
    fn file_name_and_extension() {
        let p = Utf8Path::new("/work/m.alusus");
        assert_eq!(p.file_name(), Some("m.alusus"));
        assert_eq!(p.extension(), Some(".alusus"));
        assert_eq!(Utf8Path::new("/work/.profile").extension(), None);
        assert_eq!(Utf8Path::new("/work/plain").extension(), None);
        assert_eq!(Utf8Path::new("/").file_name(), None);
    }

    #[test]
    fn arabic_extension_round_trips() {
        let p = Utf8Path::new("/work/وحدة.مصدر");
        assert_eq!(p.file_name(), Some("وحدة.مصدر"));
        assert_eq!(p.extension(), Some(".مصدر"));
    }

    #[test]
    fn absoluteness() {
        assert!(Utf8Path::new("/a").is_absolute());
        assert!(!Utf8Path::new("a/b").is_absolute());
    }
}
