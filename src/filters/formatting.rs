//! Culture-aware formatting filters (spec.md §4.E "Formatting"), backed by
//! the host's optional [crate::host::CultureFormat]. Without one, these fall
//! back to an invariant-culture rendering so templates still work in tests
//! and minimal hosts.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

/// Default pattern applied when `dateFormat` is called with no explicit
/// pattern argument.
const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd";
/// Default pattern applied when `dateTimeFormat` is called with no explicit
/// pattern argument.
const DEFAULT_DATE_TIME_PATTERN: &str = "yyyy-MM-dd HH:mm:ssZ";

pub(super) fn register(registry: &mut Registry) {
    registry.register("format", 1, false, format_template);
    registry.register("dateFormat", 0, false, |args, ctx| {
        date_format(args, ctx, DEFAULT_DATE_PATTERN)
    });
    registry.register("dateFormat", 1, false, |args, ctx| {
        let pattern = arg(args, 1, "dateFormat")?
            .as_str()
            .ok_or_else(|| FilterError::new("dateFormat", "pattern must be a string"))?
            .to_owned();
        date_format(args, ctx, &pattern)
    });
    registry.register("dateTimeFormat", 0, false, |args, ctx| {
        date_format(args, ctx, DEFAULT_DATE_TIME_PATTERN)
    });
    registry.register("dateTimeFormat", 1, false, |args, ctx| {
        let pattern = arg(args, 1, "dateTimeFormat")?
            .as_str()
            .ok_or_else(|| FilterError::new("dateTimeFormat", "pattern must be a string"))?
            .to_owned();
        date_format(args, ctx, &pattern)
    });
    registry.register("currency", 0, false, currency);
}

/// `x | format(pattern)` substitutes every `{}` in `pattern` with the
/// stringified subject.
fn format_template(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    let pattern = arg(args, 1, "format")?
        .as_str()
        .ok_or_else(|| FilterError::new("format", "pattern must be a string"))?;
    Ok(Value::String(pattern.replacen("{}", &args[0].stringify(), 1)))
}

fn date_format(args: &[Value], ctx: &FilterContext, pattern: &str) -> Result<Value, FilterError> {
    let timestamp = match &args[0] {
        Value::Timestamp(ts) => ts,
        other => return Err(FilterError::new("dateFormat", format!("expected a timestamp, got {other:?}"))),
    };

    if let Some(culture) = ctx.culture {
        if let Some(rendered) = culture.format_timestamp(timestamp, pattern) {
            return Ok(Value::String(rendered));
        }
    }
    Ok(Value::String(timestamp.format(&to_strftime(pattern)).to_string()))
}

/// Translates the .NET-style date-pattern tokens this filter documents
/// (`yyyy`, `MM`, `dd`, `HH`, `mm`, `ss`, `Z`) into chrono's strftime
/// directives, for the fallback path used when no culture handles the
/// pattern itself.
fn to_strftime(pattern: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("yyyy", "%Y"),
        ("MM", "%m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("Z", "%z"),
    ];
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        for (token, directive) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(directive);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        out.push(chars.next().expect("rest is non-empty"));
        rest = chars.as_str();
    }
    out
}

fn currency(args: &[Value], ctx: &FilterContext) -> Result<Value, FilterError> {
    let amount = match &args[0] {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        other => return Err(FilterError::new("currency", format!("expected a number, got {other:?}"))),
    };
    let rendered = match ctx.culture {
        Some(culture) => culture.format_currency(amount),
        None => format!("{amount:.2}"),
    };
    Ok(Value::String(rendered))
}
