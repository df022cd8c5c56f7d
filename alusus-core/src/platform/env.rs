//! Process environment: variables, working directory, the module
//! directory, PATH-style variable splitting, language detection, and
//! temp-file placement.
//!
//! Mutating the environment or the CWD concurrently with a compilation
//! yields undefined results; see the concurrency notes on the crate root.

use super::path::{from_std_path, Utf8Path};
use super::PlatformError;
use std::env;
use std::sync::OnceLock;

/// Read an environment variable as UTF-8. Unset and non-UTF-8 values both
/// read as `None`.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Set an environment variable.
pub fn set_var(name: &str, value: &str) {
    env::set_var(name, value);
}

/// Remove an environment variable.
pub fn remove_var(name: &str) {
    env::remove_var(name);
}

/// The process working directory as a UTF-8 path.
pub fn working_directory() -> Result<Utf8Path, PlatformError> {
    let cwd = env::current_dir().map_err(|e| PlatformError::io("<cwd>", e))?;
    from_std_path(&cwd)
}

/// Absolute path of the directory containing the running executable,
/// resolved through symlinks.
///
/// Computed once per process and cached; later calls return the cached
/// value even if the executable is moved.
pub fn module_directory() -> Result<Utf8Path, PlatformError> {
    static MODULE_DIR: OnceLock<Option<Utf8Path>> = OnceLock::new();
    MODULE_DIR
        .get_or_init(|| {
            let exe = env::current_exe().ok()?;
            let resolved = std::fs::canonicalize(&exe).ok()?;
            let dir = resolved.parent()?;
            from_std_path(dir).ok()
        })
        .clone()
        .ok_or_else(|| {
            PlatformError::NoModuleDirectory("executable path unavailable".to_string())
        })
}

/// Split a PATH-style environment variable value into its entries, using
/// the platform separator (`:` on POSIX, `;` with `"…"` quoting on
/// Windows). Empty entries are dropped.
pub fn parse_path_variable(value: &str) -> Vec<String> {
    #[cfg(windows)]
    {
        split_path_quoted(value, ';')
    }
    #[cfg(not(windows))]
    {
        split_path_plain(value, ':')
    }
}

/// Serialize a list of paths into a PATH-style variable value; the inverse
/// of [`parse_path_variable`] for entries that do not contain the
/// separator.
pub fn join_path_variable(paths: &[String]) -> String {
    #[cfg(windows)]
    {
        join_path_quoted(paths, ';')
    }
    #[cfg(not(windows))]
    {
        paths.join(":")
    }
}

/// POSIX splitting: the separator cannot be escaped.
#[cfg_attr(windows, allow(dead_code))]
fn split_path_plain(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Windows splitting: `"…"` quoting escapes the separator; the quotes
/// themselves are not part of the entry.
#[cfg_attr(not(test), allow(dead_code))]
fn split_path_quoted(value: &str, separator: char) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in value.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == separator && !in_quotes {
            if !current.is_empty() {
                paths.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }
    paths
}

#[cfg_attr(not(test), allow(dead_code))]
fn join_path_quoted(paths: &[String], separator: char) -> String {
    paths
        .iter()
        .map(|p| {
            if p.contains(separator) {
                format!("\"{p}\"")
            } else {
                p.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

/// The OS user language: `"ar"` when the user locale is Arabic, `"en"`
/// otherwise. Read from `LANGUAGE` then `LANG`.
pub fn system_language() -> &'static str {
    for name in ["LANGUAGE", "LANG"] {
        if let Some(value) = get_var(name) {
            if value.starts_with("ar") {
                return "ar";
            }
        }
    }
    "en"
}

/// Directory for temporary files: `TMPDIR`, `TMP`, `TEMP`, and `TEMPDIR`
/// consulted in that order, then the OS default.
pub fn temp_directory() -> Utf8Path {
    for name in ["TMPDIR", "TMP", "TEMP", "TEMPDIR"] {
        if let Some(value) = get_var(name) {
            if !value.is_empty() {
                return Utf8Path::new(value);
            }
        }
    }
    from_std_path(&env::temp_dir()).unwrap_or_else(|_| Utf8Path::new("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_split_drops_empty_entries() {
        assert_eq!(
            split_path_plain("/a:/b::/c:", ':'),
            vec!["/a", "/b", "/c"]
        );
        assert!(split_path_plain("", ':').is_empty());
    }

    #[test]
    fn quoted_split_escapes_separator() {
        assert_eq!(
            split_path_quoted(r#"C:/a;"C:/with;semi";C:/b"#, ';'),
            vec!["C:/a", "C:/with;semi", "C:/b"]
        );
    }

    #[test]
    fn quoted_join_round_trips() {
        let paths = vec!["C:/a".to_string(), "C:/with;semi".to_string()];
        assert_eq!(split_path_quoted(&join_path_quoted(&paths, ';'), ';'), paths);
    }

    proptest::proptest! {
        /// Splitting a joined list recovers the list, for entries free of
        /// the separator.
        #[test]
        fn plain_path_variable_round_trips(
            paths in proptest::collection::vec("[a-z0-9/._-]{1,12}", 0..6)
        ) {
            let joined = paths.join(":");
            proptest::prop_assert_eq!(split_path_plain(&joined, ':'), paths);
        }

        /// The quoted variant round-trips even when entries contain the
        /// separator.
        #[test]
        fn quoted_path_variable_round_trips(
            paths in proptest::collection::vec("[a-zA-Z0-9/;._-]{1,12}", 0..6)
        ) {
            let joined = join_path_quoted(&paths, ';');
            proptest::prop_assert_eq!(split_path_quoted(&joined, ';'), paths);
        }
    }

    #[test]
    fn working_directory_is_absolute() {
        assert!(working_directory().unwrap().is_absolute());
    }

    #[test]
    fn module_directory_is_stable() {
        let first = module_directory().unwrap();
        let second = module_directory().unwrap();
        assert_eq!(first, second);
        assert!(first.is_absolute());
    }
}
