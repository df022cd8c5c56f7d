//! Locale dictionary for notice descriptions.
//!
//! The dictionary is loaded from `<install>/Notices_L18n/<locale>.txt`:
//! UTF-8, one `key:value` entry per line, with the literal substring
//! `\n` in the value decoded to a newline. Unknown locales and unreadable
//! files fail soft, leaving lookups to fall back on built-in text.

use crate::platform::Utf8Path;
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Default)]
pub struct L18nDictionary {
    entries: HashMap<String, String>,
    locale: String,
}

impl L18nDictionary {
    /// An empty dictionary with the default locale.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            locale: "en".to_string(),
        }
    }

    /// The active locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Load entries for `locale` from `<dir>/<locale>.txt`, replacing any
    /// previous contents. A missing or unreadable file leaves the
    /// dictionary empty; lookups then return nothing and callers use
    /// their built-in text.
    pub fn initialize(&mut self, locale: &str, dir: &Utf8Path) {
        self.entries.clear();
        self.locale = locale.to_string();

        let file = dir.join(format!("{locale}.txt"));
        let Ok(content) = fs::read_to_string(file.as_std_path()) else {
            return;
        };
        for line in content.lines() {
            if let Some((key, value)) = line.split_once(':') {
                self.entries
                    .insert(key.to_string(), value.replace("\\n", "\n"));
            }
        }
    }

    /// Insert an entry if the key is absent; overwrite an existing entry
    /// only when `locale` matches the active locale. Extension libraries
    /// use this to register their notice texts: the compiled-in default
    /// fills the slot, and the matching-locale text wins over it.
    pub fn add_entry(&mut self, locale: &str, key: &str, value: &str) {
        if !self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), value.to_string());
        } else if self.locale == locale {
            self.entries.insert(key.to_string(), value.to_string());
        }
    }

    /// Look up the localized text for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
