//! The `Context`: a configured, reusable rendering engine instance (spec.md
//! §4.G, §5 "Concurrency & resource model"). One `Context` is built once per
//! application (mirroring how a host wires up a single template engine at
//! startup) and is `Send + Sync` so it can be shared behind an `Arc` across
//! request-handling threads.

use crate::{
    composer,
    error::{PageNotFoundError, RenderError},
    filters::Registry,
    host::{CultureFormat, PageFormat, SettingsProvider, VirtualFileSystem},
    page::PageResult,
    parse::Template,
    value::Value,
};
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tracing::debug;

struct EmptyVfs;

impl VirtualFileSystem for EmptyVfs {
    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn read(&self, _path: &str) -> Option<String> {
        None
    }

    fn last_modified(&self, _path: &str) -> Option<SystemTime> {
        None
    }
}

struct CacheEntry {
    template: Arc<Template>,
    loaded_at: Option<SystemTime>,
}

/// Point-in-time counts of the page cache, exposed for host diagnostics
/// (e.g. an admin page reporting how many templates are currently loaded).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
}

/// The engine itself: filter registry, host collaborators, and the page
/// cache. Construct with [Context::builder].
pub struct Context {
    vfs: Arc<dyn VirtualFileSystem>,
    settings: Option<Arc<dyn SettingsProvider>>,
    culture: Option<Arc<dyn CultureFormat>>,
    filters: Registry,
    formats: HashMap<String, PageFormat>,
    default_args: IndexMap<String, Value>,
    debug: bool,
    strict: bool,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn default_args(&self) -> &IndexMap<String, Value> {
        &self.default_args
    }

    pub(crate) fn filters(&self) -> &Registry {
        &self.filters
    }

    pub(crate) fn settings(&self) -> Option<&dyn SettingsProvider> {
        self.settings.as_deref()
    }

    pub(crate) fn culture(&self) -> Option<&dyn CultureFormat> {
        self.culture.as_deref()
    }

    /// Current page cache occupancy, for host diagnostics.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.lock().unwrap().len(),
        }
    }

    /// Parse and cache the template source stored at `path`. In debug mode
    /// the virtual file system's modification time is consulted on every
    /// call and a stale entry is reparsed; outside debug mode a path is
    /// parsed at most once for the lifetime of the `Context` (spec.md §5).
    pub(crate) fn get_template(&self, path: &str) -> Result<Arc<Template>, RenderError> {
        let current_mtime = self.vfs.last_modified(path);

        {
            let cache = self.cache.lock().unwrap();
            if let Some(entry) = cache.get(path) {
                let stale = self.debug && current_mtime.is_some() && current_mtime != entry.loaded_at;
                if !stale {
                    return Ok(Arc::clone(&entry.template));
                }
            }
        }

        let source = self.vfs.read(path).ok_or_else(|| PageNotFoundError {
            name: path.to_string(),
        })?;
        debug!(path, "loading template");
        let template: Template = source.parse()?;
        let template = Arc::new(template);

        self.cache.lock().unwrap().insert(
            path.to_string(),
            CacheEntry {
                template: Arc::clone(&template),
                loaded_at: current_mtime,
            },
        );
        Ok(template)
    }

    /// Check whether a path exists in the virtual file system, used by the
    /// composer's layout-convention lookup (`_layout.<ext>`).
    pub(crate) fn page_exists(&self, path: &str) -> bool {
        self.vfs.exists(path)
    }

    /// Apply the registered [PageFormat]'s transform for `extension` to
    /// `body`, if one is registered. Used by the composer when a page's
    /// extension differs from its layout's, so the page body is normalized
    /// to the layout's format before injection (spec.md §6).
    pub(crate) fn transform_page_body(&self, extension: &str, body: String) -> String {
        match self.formats.get(extension) {
            Some(format) => (format.transform)(body),
            None => body,
        }
    }

    /// Render a page through the composer: layout resolution, scope
    /// chaining, filter evaluation, and HTML escaping.
    pub fn render(&self, result: PageResult) -> Result<String, RenderError> {
        composer::render(self, result)
    }
}

/// Builder for [Context], following the same fluent-setter shape as
/// [crate::page::PageResult]'s builder methods.
pub struct ContextBuilder {
    vfs: Option<Arc<dyn VirtualFileSystem>>,
    settings: Option<Arc<dyn SettingsProvider>>,
    culture: Option<Arc<dyn CultureFormat>>,
    filters: Option<Registry>,
    formats: HashMap<String, PageFormat>,
    default_args: IndexMap<String, Value>,
    debug: bool,
    strict: bool,
}

impl ContextBuilder {
    pub fn vfs(mut self, vfs: impl VirtualFileSystem + 'static) -> Self {
        self.vfs = Some(Arc::new(vfs));
        self
    }

    pub fn settings(mut self, settings: impl SettingsProvider + 'static) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    pub fn culture(mut self, culture: impl CultureFormat + 'static) -> Self {
        self.culture = Some(Arc::new(culture));
        self
    }

    /// Replace the default filter registry entirely. Most hosts should
    /// start from [Registry::with_builtins] and add their own filters on
    /// top rather than building a registry from scratch.
    pub fn filters(mut self, filters: Registry) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn format(mut self, format: PageFormat) -> Self {
        self.formats.insert(format.extension.clone(), format);
        self
    }

    pub fn default_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_args.insert(name.into(), value.into());
        self
    }

    /// Enables per-call mtime checking on the page cache (spec.md §5) and
    /// relaxes nothing else: strictness toward filter errors is controlled
    /// separately by [ContextBuilder::strict].
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// When `true` (the default), a filter implementation error aborts the
    /// whole render. When `false`, the composer substitutes an empty string
    /// for the offending placeholder instead (spec.md §7).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Context {
        Context {
            vfs: self.vfs.unwrap_or_else(|| Arc::new(EmptyVfs)),
            settings: self.settings,
            culture: self.culture,
            filters: self.filters.unwrap_or_default(),
            formats: self.formats,
            default_args: self.default_args,
            debug: self.debug,
            strict: self.strict,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            vfs: None,
            settings: None,
            culture: None,
            filters: None,
            formats: HashMap::new(),
            default_args: IndexMap::new(),
            debug: false,
            strict: true,
        }
    }
}
