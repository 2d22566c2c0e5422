//! The `forEach` filter (spec.md §4.E "Flow"): the piped subject is a
//! template fragment string, rendered once per list element with the
//! element bound to `it` (or a caller-chosen name) in a child scope.
//! Delegates the actual parsing and rendering to the composer via
//! [super::FilterContext::render_fragment], since only the composer can
//! recursively evaluate a template.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("forEach", 1, false, |args, ctx| for_each(args, ctx, "it"));
    registry.register("forEach", 2, false, |args, ctx| {
        let var_name = arg(args, 2, "forEach")?
            .as_str()
            .ok_or_else(|| FilterError::new("forEach", "varName must be a string"))?
            .to_owned();
        for_each(args, ctx, &var_name)
    });
}

fn for_each(args: &[Value], ctx: &FilterContext, var_name: &str) -> Result<Value, FilterError> {
    let fragment = args[0]
        .as_str()
        .ok_or_else(|| FilterError::new("forEach", "subject must be a template fragment string"))?;
    let items = arg(args, 1, "forEach")?
        .as_list()
        .ok_or_else(|| FilterError::new("forEach", "list argument must be a list"))?;
    let Some(render_fragment) = ctx.render_fragment else {
        return Err(FilterError::new("forEach", "no fragment renderer available"));
    };

    let mut out = String::new();
    for item in items {
        out.push_str(&render_fragment(fragment, var_name, item.clone())?);
    }
    Ok(Value::String(out))
}
