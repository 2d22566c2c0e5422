//! Counting filters (spec.md §4.E "Counting"): integer-only increment and
//! decrement, by one or by an explicit amount.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("incr", 0, false, |args, ctx| step(args, ctx, "incr", 1));
    registry.register("decr", 0, false, |args, ctx| step(args, ctx, "decr", -1));
    registry.register("incrBy", 1, false, incr_by);
    registry.register("decrBy", 1, false, decr_by);
}

fn as_int(value: &Value, filter: &str) -> Result<i64, FilterError> {
    match value {
        Value::Integer(i) => Ok(*i),
        other => Err(FilterError::new(
            filter,
            format!("expected an integer, got {other:?}"),
        )),
    }
}

fn step(args: &[Value], _ctx: &FilterContext, filter: &str, by: i64) -> Result<Value, FilterError> {
    Ok(Value::Integer(as_int(&args[0], filter)? + by))
}

fn incr_by(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    let base = as_int(&args[0], "incrBy")?;
    let by = as_int(arg(args, 1, "incrBy")?, "incrBy")?;
    Ok(Value::Integer(base + by))
}

fn decr_by(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    let base = as_int(&args[0], "decrBy")?;
    let by = as_int(arg(args, 1, "decrBy")?, "decrBy")?;
    Ok(Value::Integer(base - by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn incr_then_decr_is_identity() {
        let incremented = step(&[Value::Integer(5)], &FilterContext::bare(), "incr", 1).unwrap();
        assert_eq!(incremented, Value::Integer(6));
        let back = step(&[incremented], &FilterContext::bare(), "decr", -1).unwrap();
        assert_eq!(back, Value::Integer(5));
    }

    #[test]
    fn incr_by_adds_explicit_amount() {
        let result = incr_by(&[Value::Integer(5), Value::Integer(10)], &FilterContext::bare()).unwrap();
        assert_eq!(result, Value::Integer(15));
    }

    proptest! {
        #[test]
        fn incr_by_then_decr_by_is_identity(base in -1_000_000i64..1_000_000, delta in -1_000_000i64..1_000_000) {
            let up = incr_by(&[Value::Integer(base), Value::Integer(delta)], &FilterContext::bare()).unwrap();
            let back = decr_by(&[up, Value::Integer(delta)], &FilterContext::bare()).unwrap();
            prop_assert_eq!(back, Value::Integer(base));
        }
    }
}
