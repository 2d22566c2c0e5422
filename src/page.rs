//! Pages and the per-render invocation they're composed with (spec.md §3
//! "Page", "PageResult").

use crate::error::FilterError;
use crate::filters::{FilterContext, Registry};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// A unit of template source the [crate::Context] can render.
///
/// `FilePage` is backed by the host's [crate::host::VirtualFileSystem] and
/// participates in the debug-mode mtime cache; `OneTimePage` carries its own
/// source text and is never cached, for ad hoc rendering of a string a host
/// assembled at request time rather than loaded from storage.
#[derive(Clone, Debug)]
pub enum Page {
    FilePage { path: String },
    OneTimePage { name: String, source: Arc<str> },
}

impl Page {
    pub fn file(path: impl Into<String>) -> Self {
        Self::FilePage { path: path.into() }
    }

    /// Build a page directly from source text, named only for error messages
    /// and layout self-recursion checks. Never touches the virtual file
    /// system and is never cached.
    pub fn one_time(name: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
        Self::OneTimePage {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Page::FilePage { path } => path,
            Page::OneTimePage { name, .. } => name,
        }
    }
}

/// A single render invocation against a [Page]: the model bound as `model`
/// (and exploded into the top-level scope frame), any extra args, and the
/// optional per-result knobs that override the `Context` defaults.
pub struct PageResult {
    page: Page,
    model: Value,
    args: IndexMap<String, Value>,
    layout_override: Option<LayoutChoice>,
    trim: bool,
    content_type: Option<String>,
    page_transformers: Vec<Box<dyn Fn(String) -> String + Send + Sync>>,
    output_transformers: Vec<Box<dyn Fn(String) -> String + Send + Sync>>,
    extra_filters: Registry,
}

/// How layout resolution should behave for one render (spec.md §4.F
/// "Layout resolution": explicit choice, falling back to the
/// `_layout.<ext>` convention, falling back to no layout at all).
#[derive(Clone, Debug)]
pub enum LayoutChoice {
    Explicit(String),
    None,
}

impl PageResult {
    pub fn new(page: Page, model: impl Into<Value>) -> Self {
        Self {
            page,
            model: model.into(),
            args: IndexMap::new(),
            layout_override: None,
            trim: false,
            content_type: None,
            page_transformers: Vec::new(),
            output_transformers: Vec::new(),
            extra_filters: Registry::new(),
        }
    }

    /// A result for a one-time page built directly from a source string, a
    /// convenience pairing of [Page::one_time] with [PageResult::new] for
    /// the common case of rendering an ad hoc template with no stored file
    /// behind it.
    pub fn one_time(name: impl Into<String>, source: impl Into<Arc<str>>, model: impl Into<Value>) -> Self {
        Self::new(Page::one_time(name, source), model)
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn with_layout(mut self, layout_path: impl Into<String>) -> Self {
        self.layout_override = Some(LayoutChoice::Explicit(layout_path.into()));
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.layout_override = Some(LayoutChoice::None);
        self
    }

    /// Request trimming of leading/trailing whitespace from the final
    /// rendered output. Off by default, since templates that intentionally
    /// emit surrounding whitespace (e.g. inside `<pre>`) shouldn't have it
    /// silently stripped.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Register a transform applied to the page's own body before it's
    /// injected into its layout (spec.md §3 "PageResult"'s page-transformer
    /// list).
    pub fn with_page_transform(
        mut self,
        transform: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.page_transformers.push(Box::new(transform));
        self
    }

    /// Register a transform applied to the final composed output, after
    /// layout injection and trimming (spec.md §3 "PageResult"'s
    /// output-transformer list).
    pub fn with_output_transform(
        mut self,
        transform: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.output_transformers.push(Box::new(transform));
        self
    }

    /// Register a filter that takes precedence over the `Context`'s registry
    /// for this render only (spec.md §3 "PageResult"'s optional per-result
    /// filter list).
    pub fn with_filter(
        mut self,
        name: &str,
        arity: usize,
        handles_unknown: bool,
        call: impl Fn(&[Value], &FilterContext) -> Result<Value, FilterError> + Send + Sync + 'static,
    ) -> Self {
        self.extra_filters.register(name, arity, handles_unknown, call);
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    pub fn args(&self) -> &IndexMap<String, Value> {
        &self.args
    }

    pub fn layout_override(&self) -> Option<&LayoutChoice> {
        self.layout_override.as_ref()
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub(crate) fn page_transformers(&self) -> &[Box<dyn Fn(String) -> String + Send + Sync>] {
        &self.page_transformers
    }

    pub(crate) fn output_transformers(&self) -> &[Box<dyn Fn(String) -> String + Send + Sync>] {
        &self.output_transformers
    }

    pub(crate) fn extra_filters(&self) -> &Registry {
        &self.extra_filters
    }
}
