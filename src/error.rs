//! Error taxonomy (spec.md §7).
//!
//! Two channels are kept deliberately separate: "unknown" is data
//! ([crate::Value::Unresolved], propagated and eventually passed through as
//! literal source by the composer) while "malformed / forbidden" is an
//! error, represented by the types in this module. `UnresolvedPassthrough`
//! and `NullDereferenceSuppression` from spec.md §7 are not error variants at
//! all; they're documented here as a reminder of that split, not
//! implemented as types.

use crate::expr::Identifier;
use winnow::error::{ContextError, ParseError};

/// Lexer/parser failure: unterminated placeholder, malformed filter call.
/// Fatal; aborts the render with the source offset baked into the message by
/// winnow.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TemplateParseError(pub(crate) String);

impl From<ParseError<&str, ContextError>> for TemplateParseError {
    fn from(error: ParseError<&str, ContextError>) -> Self {
        Self(error.to_string())
    }
}

/// `Context::get_page` was called with a name that has no corresponding
/// source. Fatal.
#[derive(Debug, thiserror::Error)]
#[error("No page registered for `{name}`")]
pub struct PageNotFoundError {
    pub name: String,
}

/// An expression attempted to invoke a method on a bound host object. This is
/// the one hard safety rule in the engine (spec.md §1, §4.C) and is always
/// fatal, regardless of debug/strict mode.
#[derive(Debug, thiserror::Error)]
#[error("Method invocation is forbidden in binding expression `{expression}`")]
pub struct BindingExpressionError {
    pub expression: String,
}

/// A registered filter implementation raised an error while running. By
/// default this aborts the render (`strict` mode, the shipped default); a
/// `Context` may be configured non-strict, in which case the composer
/// substitutes an empty string for the offending placeholder instead of
/// failing the whole render (spec.md §7).
#[derive(Debug, thiserror::Error)]
#[error("Filter `{filter}` failed: {source}")]
pub struct FilterError {
    pub filter: Identifier,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FilterError {
    pub fn new(
        filter: impl Into<Identifier>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            filter: filter.into(),
            source: source.into(),
        }
    }
}

/// Layout resolution found the page's own layout slot pointing back at
/// itself, either directly or transitively. This would otherwise recurse
/// forever (spec.md §3 invariant: "the composer must detect and refuse
/// self-recursion of the page into its own layout slot").
#[derive(Debug, thiserror::Error)]
#[error("Page `{page}` may not be its own layout")]
pub struct LayoutRecursionError {
    pub page: String,
}

/// The umbrella error type returned by the public rendering entry points.
/// Each variant wraps one taxonomy member from spec.md §7; `Other` is an
/// escape hatch for errors bubbled out of host-provided collaborators (the
/// virtual file system, settings provider, etc.).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] TemplateParseError),
    #[error(transparent)]
    PageNotFound(#[from] PageNotFoundError),
    #[error(transparent)]
    Binding(#[from] BindingExpressionError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    LayoutRecursion(#[from] LayoutRecursionError),
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }
}
