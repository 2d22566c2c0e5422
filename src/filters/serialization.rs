//! The `json` filter (spec.md §4.E "Serialization").

use super::{FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("json", 0, true, json);
}

/// `x | json`. Handles unknown so that `{{ missing | json }}` renders the
/// JSON literal `null` rather than passing the placeholder through
/// verbatim — once a value reaches `json`, the author has asked for a
/// serialized representation regardless of whether the source resolved.
fn json(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    let json_value: serde_json::Value = (&args[0]).into();
    let rendered = serde_json::to_string(&json_value)
        .map_err(|err| FilterError::new("json", err))?;
    Ok(Value::String(rendered))
}
