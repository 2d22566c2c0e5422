//! Comparison filters (spec.md §4.E "Comparison"). Numbers compare
//! numerically (mixed int/float is coerced to float); strings compare
//! lexicographically. Comparing across those two families is always
//! `false` rather than an error, so a stray comparison against an
//! Unresolved-turned-empty-string doesn't abort a render.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};
use std::cmp::Ordering;

pub(super) fn register(registry: &mut Registry) {
    registry.register_aliases(&["greaterThan", "gt"], 1, false, |a, c| cmp(a, c, "greaterThan", |o| o == Ordering::Greater));
    registry.register_aliases(&["lessThan", "lt"], 1, false, |a, c| cmp(a, c, "lessThan", |o| o == Ordering::Less));
    registry.register_aliases(
        &["greaterThanEqual", "gte"],
        1,
        false,
        |a, c| cmp(a, c, "greaterThanEqual", |o| o != Ordering::Less),
    );
    registry.register_aliases(
        &["lessThanEqual", "lte"],
        1,
        false,
        |a, c| cmp(a, c, "lessThanEqual", |o| o != Ordering::Greater),
    );
    registry.register_aliases(&["equals", "eq"], 1, true, |args, _ctx| {
        Ok(Value::Boolean(args[0] == args[1]))
    });
    registry.register_aliases(&["notEquals", "not"], 1, true, |args, _ctx| {
        Ok(Value::Boolean(args[0] != args[1]))
    });
}

fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        _ => None,
    }
}

fn cmp(
    args: &[Value],
    _ctx: &FilterContext,
    filter: &str,
    predicate: impl Fn(Ordering) -> bool,
) -> Result<Value, FilterError> {
    let rhs = arg(args, 1, filter)?;
    Ok(Value::Boolean(
        ordering(&args[0], rhs).map(&predicate).unwrap_or(false),
    ))
}
