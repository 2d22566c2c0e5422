//! Truthy/falsy filters (spec.md §4.E "Truthy"): `truthy(v)` returns the
//! subject iff `v` is truthy, `falsy(v)` iff `v` is falsy; `ifTruthy`/
//! `ifFalsey` mirror the same gate under a more explicit name (spec.md §9's
//! open question notes the overload is deliberate, matching `if`/`ifNot`'s
//! shape one-for-one).

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("truthy", 1, true, |args, _ctx| gate(args, "truthy", true));
    registry.register("falsy", 1, true, |args, _ctx| gate(args, "falsy", false));
    registry.register("ifTruthy", 1, true, |args, _ctx| gate(args, "ifTruthy", true));
    registry.register("ifFalsey", 1, true, |args, _ctx| gate(args, "ifFalsey", false));
}

fn gate(args: &[Value], filter: &str, take_when_truthy: bool) -> Result<Value, FilterError> {
    let cond = arg(args, 1, filter)?;
    if cond.is_truthy() == take_when_truthy {
        Ok(args[0].clone())
    } else {
        Ok(Value::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_returns_subject_when_argument_is_truthy() {
        let result = gate(&[Value::String("hi".into()), Value::Integer(1)], "truthy", true).unwrap();
        assert_eq!(result, Value::String("hi".into()));
    }

    #[test]
    fn falsy_returns_subject_when_argument_is_falsy() {
        let result = gate(&[Value::String("hi".into()), Value::Integer(0)], "falsy", false).unwrap();
        assert_eq!(result, Value::String("hi".into()));
    }

    #[test]
    fn truthy_is_unresolved_when_argument_is_falsy() {
        let result = gate(&[Value::String("hi".into()), Value::Boolean(false)], "truthy", true).unwrap();
        assert_eq!(result, Value::Unresolved);
    }

    #[test]
    fn if_truthy_and_truthy_agree() {
        let registry = Registry::with_builtins();
        let via_truthy = registry
            .invoke(
                &crate::expr::Identifier::from("truthy"),
                Value::String("x".into()),
                &[Value::Integer(1)],
                &FilterContext::bare(),
            )
            .unwrap();
        let via_if_truthy = registry
            .invoke(
                &crate::expr::Identifier::from("ifTruthy"),
                Value::String("x".into()),
                &[Value::Integer(1)],
                &FilterContext::bare(),
            )
            .unwrap();
        assert_eq!(via_truthy, via_if_truthy);
    }
}
