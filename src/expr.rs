//! The expression AST produced by the parser (spec.md §4.B) and consumed by
//! the binding resolver and filter invoker.

use itertools::Itertools;
use std::fmt;

/// An identifier: a filter name, object-literal key, or the head/field names
/// of a binding path. Case-sensitive, non-empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq, derive_more::Display)]
pub struct Identifier(pub(crate) String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A scalar literal value embedded directly in template source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(fl) => write!(f, "{fl}"),
            Literal::String(s) => write!(f, "'{s}'"),
        }
    }
}

/// One step in a dotted/indexed binding path: `.field`, `[expr]`, or the
/// forbidden `.method(args)` form.
#[derive(Clone, Debug, PartialEq)]
pub enum PathStep {
    Field(Identifier),
    /// `[expr]`; the inner expression is evaluated at resolve time and used
    /// as a string key (for maps) or integer index (for lists).
    Index(Box<Expr>),
    /// `.name(args)`. The grammar accepts this so the engine can reject it
    /// with a dedicated [crate::error::BindingExpressionError] at resolve
    /// time rather than a generic parse failure — method invocation on a
    /// bound value is the one hard safety rule in the language (spec.md
    /// §1, §4.C).
    MethodCall(Identifier, Vec<Expr>),
}

/// A dotted/indexed variable expression: `head.field[0].other`.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub head: Identifier,
    pub steps: Vec<PathStep>,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for step in &self.steps {
            match step {
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Index(expr) => write!(f, "[{expr}]")?,
                PathStep::MethodCall(name, args) => {
                    write!(f, ".{name}({})", args.iter().format(", "))?;
                }
            }
        }
        Ok(())
    }
}

/// A filter invocation: `name(arg, arg, ...)`. Used both for the prefix call
/// form (`f(x, a, b)`) and as the right-hand side of a pipe (`x | f(a, b)`),
/// where the piped subject is prepended to `args` before invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCall {
    pub name: Identifier,
    pub args: Vec<Expr>,
}

impl fmt::Display for FilterCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().format(", "))
    }
}

/// A parsed expression node (spec.md §3 "Expression node").
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Binding(Binding),
    Array(Vec<Expr>),
    /// `{ key: expr, ... }`. Keys are plain identifiers per the grammar.
    Object(Vec<(Identifier, Expr)>),
    /// Prefix call form, no piped subject: `f(a, b)`.
    Call(FilterCall),
    /// Pipe form: `lhs | f(a, b)`. Left-associative chains are represented as
    /// nested `Pipe` nodes, mirroring how `parse::expr` folds them.
    Pipe { subject: Box<Expr>, call: FilterCall },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Binding(binding) => write!(f, "{binding}"),
            Expr::Array(items) => write!(f, "[{}]", items.iter().format(", ")),
            Expr::Object(entries) => write!(
                f,
                "{{{}}}",
                entries.iter().format_with(", ", |(key, value), fmt| fmt(&format_args!("{key}: {value}")))
            ),
            Expr::Call(call) => write!(f, "{call}"),
            Expr::Pipe { subject, call } => write!(f, "{subject} | {call}"),
        }
    }
}
