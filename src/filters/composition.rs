//! The `partial` filter (spec.md §4.E "Composition"): `partial(name[,
//! argsObject])`. The subject (the first positional argument, whether
//! reached via prefix call or as the piped subject) is the partial's page
//! name; the optional filter argument is the args object populating the
//! partial's own scope frame. Defers to the composer's
//! [super::FilterContext::render_partial] callback.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("partial", 0, false, |args, ctx| partial(args, ctx, None));
    registry.register("partial", 1, false, |args, ctx| partial(args, ctx, Some(1)));
}

fn partial(args: &[Value], ctx: &FilterContext, args_object_index: Option<usize>) -> Result<Value, FilterError> {
    let name = args[0]
        .as_str()
        .ok_or_else(|| FilterError::new("partial", "partial name must be a string"))?;
    let model = match args_object_index {
        Some(index) => arg(args, index, "partial")?.clone(),
        None => Value::Null,
    };
    let Some(render_partial) = ctx.render_partial else {
        return Err(FilterError::new("partial", "no partial renderer available"));
    };
    Ok(Value::String(render_partial(name, model)?))
}
