//! The filter pipeline: registry, invocation, and the built-in filter
//! library (spec.md §4.D "Filter invoker", §4.E "Built-in filters").
//!
//! Every filter is registered under `(name, arity)`, where arity counts the
//! filter's own arguments — the piped subject, when present, is prepended
//! before dispatch and does not count toward arity. This lets `add(1)` (one
//! argument, invoked as `x | add(1)`) coexist with a hypothetical two-arg
//! `add(a, b)` prefix form without either shadowing the other.

mod alternative;
mod arithmetic;
mod comparison;
mod composition;
mod conditional;
mod counting;
mod flow;
mod formatting;
mod logical;
mod output;
mod serialization;
mod settings;
mod string;
mod truthy;
mod url;

use crate::{
    error::FilterError,
    expr::{Identifier, Literal},
    host::{CultureFormat, SettingsProvider},
    value::Value,
};
use std::{collections::HashMap, sync::Arc};

/// Convert a literal AST node straight to a runtime value. Shared by the
/// expression evaluator and the binding resolver's index-key handling.
pub(crate) fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
    }
}

/// Host services a filter may need beyond its arguments. Not every filter
/// uses every field; `settings` and `culture` are `None` when the embedding
/// `Context` was built without them, in which case filters that need them
/// fall back to an invariant default.
pub struct FilterContext<'a> {
    pub settings: Option<&'a dyn SettingsProvider>,
    pub culture: Option<&'a dyn CultureFormat>,
    /// Renders a named partial page against a scope frame built from an
    /// args object, used by `partial`. Wired up by the composer, which is
    /// the only component that can recursively render a page.
    pub render_partial: Option<&'a dyn Fn(&str, Value) -> Result<String, FilterError>>,
    /// Parses a string as a template fragment and renders it with a single
    /// named binding added to a child of the current scope, used by
    /// `forEach` to render its subject once per list element.
    pub render_fragment: Option<&'a dyn Fn(&str, &str, Value) -> Result<String, FilterError>>,
}

impl FilterContext<'_> {
    pub fn bare() -> Self {
        Self {
            settings: None,
            culture: None,
            render_partial: None,
            render_fragment: None,
        }
    }
}

type FilterFn = dyn Fn(&[Value], &FilterContext) -> Result<Value, FilterError> + Send + Sync;

struct FilterEntry {
    handles_unknown: bool,
    call: Arc<FilterFn>,
}

/// The built-in and (if a host registers its own) extension filter table.
/// Built once via [Registry::with_builtins] and shared read-only for the
/// lifetime of a `Context`.
pub struct Registry {
    entries: HashMap<(String, usize), FilterEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry preloaded with every filter spec.md §4.E names.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        output::register(&mut registry);
        serialization::register(&mut registry);
        settings::register(&mut registry);
        arithmetic::register(&mut registry);
        counting::register(&mut registry);
        comparison::register(&mut registry);
        logical::register(&mut registry);
        conditional::register(&mut registry);
        alternative::register(&mut registry);
        truthy::register(&mut registry);
        string::register(&mut registry);
        formatting::register(&mut registry);
        flow::register(&mut registry);
        composition::register(&mut registry);
        url::register(&mut registry);
        registry
    }

    /// Register a filter under `name` with the given arity (not counting a
    /// piped subject). `handles_unknown` controls whether this filter is
    /// still invoked when its subject is [Value::Unresolved] rather than the
    /// call being short-circuited back to `Unresolved`.
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        handles_unknown: bool,
        call: impl Fn(&[Value], &FilterContext) -> Result<Value, FilterError> + Send + Sync + 'static,
    ) {
        self.entries.insert(
            (name.to_string(), arity),
            FilterEntry {
                handles_unknown,
                call: Arc::new(call),
            },
        );
    }

    /// Register the same implementation under several aliases, e.g.
    /// `greaterThan`/`gt`.
    fn register_aliases(
        &mut self,
        names: &[&str],
        arity: usize,
        handles_unknown: bool,
        call: impl Fn(&[Value], &FilterContext) -> Result<Value, FilterError> + Send + Sync + 'static + Clone,
    ) {
        for name in names {
            self.register(name, arity, handles_unknown, call.clone());
        }
    }

    /// Invoke `name` with `subject` prepended to `args`. Arity is derived
    /// from `args.len()` (the subject doesn't count).
    ///
    /// An unknown `(name, arity)` pair is not an error: it joins Unresolved
    /// names under the same passthrough contract (spec.md §4.D), so a typo'd
    /// filter name survives into output as the original placeholder source
    /// rather than aborting the render.
    ///
    /// Unresolved propagation (spec.md §4.D): unless the filter declared
    /// `handles_unknown`, an Unresolved subject passes straight through
    /// without the filter body running at all.
    pub fn invoke(
        &self,
        name: &Identifier,
        subject: Value,
        args: &[Value],
        ctx: &FilterContext,
    ) -> Result<Value, FilterError> {
        let Some(entry) = self.entries.get(&(name.as_str().to_string(), args.len())) else {
            return Ok(Value::Unresolved);
        };

        if subject.is_unresolved() && !entry.handles_unknown {
            return Ok(Value::Unresolved);
        }

        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(subject);
        full_args.extend_from_slice(args);
        (entry.call)(&full_args, ctx)
    }

    /// Like [Registry::invoke], but consults `overrides` first: a
    /// PageResult-local filter list takes precedence over the Context's
    /// built-in/registered filters for the same `(name, arity)` pair.
    pub(crate) fn invoke_with_override(
        &self,
        overrides: &Registry,
        name: &Identifier,
        subject: Value,
        args: &[Value],
        ctx: &FilterContext,
    ) -> Result<Value, FilterError> {
        if overrides
            .entries
            .contains_key(&(name.as_str().to_string(), args.len()))
        {
            overrides.invoke(name, subject, args, ctx)
        } else {
            self.invoke(name, subject, args, ctx)
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Helper shared by filter implementations: pull the Nth argument (0 is the
/// subject) or fail with a uniform message.
pub(crate) fn arg<'a>(args: &'a [Value], index: usize, filter: &str) -> Result<&'a Value, FilterError> {
    args.get(index)
        .ok_or_else(|| FilterError::new(filter, format!("missing argument {index}")))
}
