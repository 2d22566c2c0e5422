//! Collaborator traits the embedding application implements and hands to a
//! [crate::Context] (spec.md §4.G "External interfaces"). None of these are
//! implemented by this crate itself; [crate::test_util] provides canned
//! implementations for tests.

use crate::value::Value;
use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Where page, layout, and partial source text comes from. Implementations
/// are free to back this with a real filesystem, an embedded asset bundle,
/// or an in-memory map.
pub trait VirtualFileSystem: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// Read the full contents of `path`. Returns `None` if `path` does not
    /// exist; callers turn that into a [crate::error::PageNotFoundError].
    fn read(&self, path: &str) -> Option<String>;

    /// Last-modified time, used to drive the debug-mode cache invalidation
    /// described in spec.md §5 ("Concurrency & resource model"). Returns
    /// `None` if the backing store doesn't track modification times, in
    /// which case the page cache treats the entry as never stale.
    fn last_modified(&self, path: &str) -> Option<SystemTime>;
}

/// A host-side key/value settings source, reachable from templates via the
/// `appSetting` filter.
pub trait SettingsProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

/// Culture-aware formatting, backing the `format`, `dateFormat`,
/// `dateTimeFormat`, and `currency` filters. A default, invariant-culture
/// implementation lives in [crate::filters::formatting].
pub trait CultureFormat: Send + Sync {
    /// Render a timestamp using a host-defined named format (e.g. `"short"`,
    /// `"long"`), falling back to the filter's own `strftime`-style pattern
    /// handling when the host returns `None`.
    fn format_timestamp(&self, timestamp: &DateTime<Utc>, pattern: &str) -> Option<String>;

    /// Render an integer/float amount as currency in the host's culture
    /// (symbol, decimal separator, grouping).
    fn format_currency(&self, amount: f64) -> String {
        format!("{amount:.2}")
    }
}

/// A registered page output format: the file extension it's keyed by, and
/// the transform applied to a page's rendered body before it's handed back
/// to the caller (e.g. minification, wrapping in an envelope). Mirrors
/// spec.md §4.F's "output transformer" concept at the Context level rather
/// than per-page.
pub struct PageFormat {
    pub extension: String,
    pub content_type: String,
    pub transform: Box<dyn Fn(String) -> String + Send + Sync>,
}

impl PageFormat {
    pub fn new(
        extension: impl Into<String>,
        content_type: impl Into<String>,
        transform: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            extension: extension.into(),
            content_type: content_type.into(),
            transform: Box::new(transform),
        }
    }

    /// The identity format: no extension filtering, body passed through
    /// unchanged. Used as the Context default so unconfigured hosts still
    /// get working output.
    pub fn identity() -> Self {
        Self::new("html", "text/html; charset=utf-8", |body| body)
    }
}

impl std::fmt::Debug for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFormat")
            .field("extension", &self.extension)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
