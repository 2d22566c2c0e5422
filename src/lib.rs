//! A server-side template evaluation engine: moustache-style `{{ }}`
//! placeholders composed with a Unix-style filter pipeline.
//!
//! A [Context] owns the filter registry, host collaborators, and page
//! cache; build one with [Context::builder] and render a [PageResult]
//! against it with [Context::render]. Templates never run host logic
//! directly — values reach them only through [Value] and the read-only
//! [HostObject] reflection trait, and the one attempt at invoking a method
//! from within a binding expression (`model.GetName()`) is rejected at
//! resolve time with [BindingExpressionError] rather than silently running
//! arbitrary code.

mod composer;
mod context;
mod error;
mod escape;
mod expr;
mod filters;
mod host;
mod page;
mod parse;
mod scope;
#[cfg(test)]
mod test_util;
mod value;

pub use context::{CacheStats, Context, ContextBuilder};
pub use error::{
    BindingExpressionError, FilterError, LayoutRecursionError, PageNotFoundError, RenderError,
    TemplateParseError,
};
pub use filters::{FilterContext, Registry};
pub use host::{CultureFormat, PageFormat, SettingsProvider, VirtualFileSystem};
pub use page::{LayoutChoice, Page, PageResult};
pub use parse::Template;
pub use value::{HostObject, Value};
