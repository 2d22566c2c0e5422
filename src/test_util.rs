//! Canned host collaborators for tests: an in-memory virtual file system and
//! fixed settings/culture providers, gated behind `#[cfg(test)]` so they
//! never ship in the library itself.

use crate::{
    host::{CultureFormat, SettingsProvider, VirtualFileSystem},
    value::Value,
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::Mutex,
    time::SystemTime,
};

/// A virtual file system backed by an in-process map, with an artificial
/// modification clock so debug-mode cache invalidation can be exercised
/// deterministically without real file system timestamps.
pub struct InMemoryVfs {
    files: Mutex<HashMap<String, (String, SystemTime)>>,
}

impl InMemoryVfs {
    pub fn new(files: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        let now = SystemTime::now();
        Self {
            files: Mutex::new(
                files
                    .into_iter()
                    .map(|(path, source)| (path.into(), (source.into(), now)))
                    .collect(),
            ),
        }
    }

    /// Overwrite `path` with new contents and a fresh modification time,
    /// simulating an edit a host's debug-mode reload should pick up.
    pub fn write(&self, path: impl Into<String>, source: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), (source.into(), SystemTime::now()));
    }
}

impl VirtualFileSystem for InMemoryVfs {
    fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).map(|(source, _)| source.clone())
    }

    fn last_modified(&self, path: &str) -> Option<SystemTime> {
        self.files.lock().unwrap().get(path).map(|(_, mtime)| *mtime)
    }
}

/// A settings provider backed by a fixed map, for filter tests that don't
/// care about real configuration plumbing.
pub struct FixedSettings {
    values: HashMap<String, Value>,
}

impl FixedSettings {
    pub fn new(values: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl SettingsProvider for FixedSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

/// An invariant-culture formatter: never supplies a named timestamp format
/// (so callers fall back to `strftime`) and renders currency as a bare
/// two-decimal number, same as having no culture at all. Useful as an
/// explicit collaborator in tests that want to confirm a `Context` reaches
/// for its culture rather than silently using no culture.
pub struct InvariantCulture;

impl CultureFormat for InvariantCulture {
    fn format_timestamp(&self, _timestamp: &DateTime<Utc>, _pattern: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_vfs_round_trips_contents() {
        let vfs = InMemoryVfs::new([("a.html", "hello")]);
        assert_eq!(vfs.read("a.html").as_deref(), Some("hello"));
        assert!(vfs.exists("a.html"));
        assert!(!vfs.exists("missing.html"));
    }

    #[test]
    fn write_bumps_modification_time() {
        let vfs = InMemoryVfs::new([("a.html", "v1")]);
        let before = vfs.last_modified("a.html");
        std::thread::sleep(std::time::Duration::from_millis(5));
        vfs.write("a.html", "v2");
        assert!(vfs.last_modified("a.html") > before);
        assert_eq!(vfs.read("a.html").as_deref(), Some("v2"));
    }
}
