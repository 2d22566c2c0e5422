//! URL-building filters (spec.md §4.E "URL"): append a percent-encoded map
//! of parameters to a URL's query string or hash fragment.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register("addQueryString", 1, false, |args, _ctx| append(args, '?', '&'));
    registry.register("addHashParams", 1, false, |args, _ctx| append(args, '#', '&'));
}

fn append(args: &[Value], separator: char, join: char) -> Result<Value, FilterError> {
    let url = args[0]
        .as_str()
        .ok_or_else(|| FilterError::new("addQueryString", "subject must be a string"))?;
    let params = match arg(args, 1, "addQueryString")? {
        Value::Map(map) => map,
        other => return Err(FilterError::new("addQueryString", format!("expected a map, got {other:?}"))),
    };
    if params.is_empty() {
        return Ok(Value::String(url.to_owned()));
    }

    let already_has_section = url.contains(separator);
    let pairs: Vec<(&String, &Value)> = params.iter().collect();
    let joined = serde_urlencoded::to_string(&pairs)
        .map_err(|e| FilterError::new("addQueryString", format!("failed to encode query string: {e}")))?;
    debug_assert_eq!(join, '&', "serde_urlencoded always joins pairs with '&'");

    Ok(Value::String(if already_has_section {
        format!("{url}{join}{joined}")
    } else {
        format!("{url}{separator}{joined}")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn adds_query_string_when_absent() {
        let mut params = IndexMap::new();
        params.insert("a".to_string(), Value::Integer(1));
        let result = append(&[Value::String("/x".into()), Value::Map(params)], '?', '&').unwrap();
        assert_eq!(result, Value::String("/x?a=1".into()));
    }

    #[test]
    fn extends_existing_query_string() {
        let mut params = IndexMap::new();
        params.insert("b".to_string(), Value::Integer(2));
        let result = append(&[Value::String("/x?a=1".into()), Value::Map(params)], '?', '&').unwrap();
        assert_eq!(result, Value::String("/x?a=1&b=2".into()));
    }

    #[test]
    fn percent_encodes_special_characters_in_values() {
        let mut params = IndexMap::new();
        params.insert("q".to_string(), Value::String("a&b=c d".into()));
        let result = append(&[Value::String("/x".into()), Value::Map(params)], '?', '&').unwrap();
        assert_eq!(result, Value::String("/x?q=a%26b%3Dc+d".into()));
    }
}
