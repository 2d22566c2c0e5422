//! Logical filters (spec.md §4.E "Logical"): boolean combination of two
//! values' truthiness (see [crate::value::Value::is_truthy]).

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("and", 1, true, |args, _ctx| {
        let rhs = arg(args, 1, "and")?;
        Ok(Value::Boolean(args[0].is_truthy() && rhs.is_truthy()))
    });
    registry.register("or", 1, true, |args, _ctx| {
        let rhs = arg(args, 1, "or")?;
        Ok(Value::Boolean(args[0].is_truthy() || rhs.is_truthy()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_requires_both_truthy() {
        let registry = Registry::with_builtins();
        let result = registry
            .invoke(
                &crate::expr::Identifier::from("and"),
                Value::Boolean(true),
                &[Value::Integer(0)],
                &FilterContext::bare(),
            )
            .unwrap();
        assert_eq!(result, Value::Boolean(false));
    }
}
