//! String-shaping filters (spec.md §4.E "String").

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};
use regex::Regex;
use std::sync::OnceLock;

pub(super) fn register(registry: &mut Registry) {
    registry.register("lower", 0, false, |args, _ctx| {
        Ok(Value::String(string_of(&args[0])?.to_lowercase()))
    });
    registry.register("upper", 0, false, |args, _ctx| {
        Ok(Value::String(string_of(&args[0])?.to_uppercase()))
    });
    registry.register("titleCase", 0, false, |args, _ctx| {
        Ok(Value::String(title_case(&string_of(&args[0])?)))
    });
    registry.register("humanize", 0, false, |args, _ctx| {
        Ok(Value::String(humanize(&string_of(&args[0])?)))
    });
    registry.register("pascalCase", 0, false, |args, _ctx| {
        Ok(Value::String(join_words(&words_of(&string_of(&args[0])?), true)))
    });
    registry.register("camelCase", 0, false, |args, _ctx| {
        Ok(Value::String(join_words(&words_of(&string_of(&args[0])?), false)))
    });
    registry.register("substring", 1, false, |args, ctx| substring(args, ctx, None));
    registry.register("substring", 2, false, |args, ctx| substring(args, ctx, Some(2)));
    registry.register("padLeft", 1, false, |args, ctx| pad(args, ctx, Side::Left, ' '));
    registry.register("padLeft", 2, false, |args, ctx| pad_with_char(args, ctx, Side::Left));
    registry.register("padRight", 1, false, |args, ctx| pad(args, ctx, Side::Right, ' '));
    registry.register("padRight", 2, false, |args, ctx| pad_with_char(args, ctx, Side::Right));
    registry.register("repeating", 1, false, repeating);
}

fn string_of(value: &Value) -> Result<String, FilterError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| FilterError::new("string", format!("expected a string, got {value:?}")))
}

/// Split on whitespace/underscore/hyphen separators and camelCase/PascalCase
/// boundaries, so `humanize`/`pascalCase`/`camelCase` all agree on what a
/// "word" is: a run of digits, a run of lowercase letters, or a leading
/// uppercase letter followed by lowercase letters.
fn words_of(input: &str) -> Vec<String> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"[A-Z]+[a-z]*|[a-z0-9]+").unwrap());
    word.find_iter(input).map(|m| m.as_str().to_owned()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn join_words(words: &[String], capitalize_first: bool) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i == 0 && !capitalize_first {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn humanize(input: &str) -> String {
    words_of(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn substring(args: &[Value], _ctx: &FilterContext, len_index: Option<usize>) -> Result<Value, FilterError> {
    let source = string_of(&args[0])?;
    let start = as_usize(arg(args, 1, "substring")?, "substring")?;
    let chars: Vec<char> = source.chars().collect();
    let end = match len_index {
        Some(index) => {
            let len = as_usize(arg(args, index, "substring")?, "substring")?;
            (start + len).min(chars.len())
        }
        None => chars.len(),
    };
    let start = start.min(chars.len());
    Ok(Value::String(chars[start..end.max(start)].iter().collect()))
}

fn as_usize(value: &Value, filter: &str) -> Result<usize, FilterError> {
    match value {
        Value::Integer(i) if *i >= 0 => Ok(*i as usize),
        other => Err(FilterError::new(filter, format!("expected a non-negative integer, got {other:?}"))),
    }
}

enum Side {
    Left,
    Right,
}

fn pad(args: &[Value], _ctx: &FilterContext, side: Side, fill: char) -> Result<Value, FilterError> {
    pad_impl(&string_of(&args[0])?, as_usize(arg(args, 1, "pad")?, "pad")?, fill, side)
}

fn pad_with_char(args: &[Value], _ctx: &FilterContext, side: Side) -> Result<Value, FilterError> {
    let width = as_usize(arg(args, 1, "pad")?, "pad")?;
    let fill_str = string_of(arg(args, 2, "pad")?)?;
    let fill = fill_str.chars().next().unwrap_or(' ');
    pad_impl(&string_of(&args[0])?, width, fill, side)
}

fn pad_impl(source: &str, width: usize, fill: char, side: Side) -> Result<Value, FilterError> {
    let len = source.chars().count();
    if len >= width {
        return Ok(Value::String(source.to_owned()));
    }
    let padding: String = std::iter::repeat(fill).take(width - len).collect();
    Ok(Value::String(match side {
        Side::Left => padding + source,
        Side::Right => source.to_owned() + &padding,
    }))
}

fn repeating(args: &[Value], _ctx: &FilterContext) -> Result<Value, FilterError> {
    let source = string_of(&args[0])?;
    let count = as_usize(arg(args, 1, "repeating")?, "repeating")?;
    Ok(Value::String(source.repeat(count)))
}
