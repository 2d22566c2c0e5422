//! The `otherwise`/`else` fallback filter (spec.md §4.E "Alternative"):
//! supplies a default when the upstream pipeline produced
//! [Value::Unresolved], and is a no-op otherwise. This is the one filter in
//! the library whose entire purpose is consuming Unresolved, so it must
//! declare `handles_unknown`.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register_aliases(&["otherwise", "else"], 1, true, |args, _ctx| {
        let fallback = arg(args, 1, "otherwise")?;
        if args[0].is_unresolved() {
            Ok(fallback.clone())
        } else {
            Ok(args[0].clone())
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplies_fallback_only_when_unresolved() {
        let registry = Registry::with_builtins();
        let resolved = registry
            .invoke(
                &crate::expr::Identifier::from("otherwise"),
                Value::Integer(5),
                &[Value::Integer(0)],
                &FilterContext::bare(),
            )
            .unwrap();
        assert_eq!(resolved, Value::Integer(5));

        let fell_back = registry
            .invoke(
                &crate::expr::Identifier::from("otherwise"),
                Value::Unresolved,
                &[Value::Integer(0)],
                &FilterContext::bare(),
            )
            .unwrap();
        assert_eq!(fell_back, Value::Integer(0));
    }
}
