//! The `raw` filter (spec.md §4.E "Output"): marks a placeholder as exempt
//! from the composer's HTML escaping pass. The filter body itself is the
//! identity function — the exemption is recognized structurally by the
//! composer, which looks at whether a placeholder's outermost pipe stage is
//! named `raw` rather than at anything this filter returns.

use super::{FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("raw", 0, false, raw);
}

fn raw(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    Ok(args[0].clone())
}
