//! Conditional filters (spec.md §4.E "Conditional"): gate the subject on an
//! explicit condition argument, yielding [Value::Unresolved] when the
//! condition doesn't match so a following `| otherwise(...)` stage can
//! supply a fallback (spec.md §8: `if(cond) | otherwise(alt)` equals the
//! subject if `cond` is truthy, else `alt`).

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register_aliases(&["if", "when"], 1, true, |args, _ctx| {
        gate(args, "if", true)
    });
    registry.register_aliases(&["ifNot", "unless"], 1, true, |args, _ctx| {
        gate(args, "ifNot", false)
    });
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
    fn if_returns_subject_on_truthy_condition() {
        let result = gate(&[Value::String("yes".into()), Value::Boolean(true)], "if", true).unwrap();
        assert_eq!(result, Value::String("yes".into()));
    }

    #[test]
    fn if_is_unresolved_on_falsy_condition() {
        let result = gate(&[Value::String("yes".into()), Value::Boolean(false)], "if", true).unwrap();
        assert_eq!(result, Value::Unresolved);
    }

    #[test]
    fn if_not_inverts_the_gate() {
        let result = gate(&[Value::String("no".into()), Value::Boolean(false)], "ifNot", false).unwrap();
        assert_eq!(result, Value::String("no".into()));
    }
}
