//! Built-in filters
//!
//! Every filter here is registered under its name constant by
//! [`register_builtins`], except [`sprintf`], which callers register
//! themselves when they want it.
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use super::date;
use super::format;
use super::registry::FilterRegistry;
use super::types::FilterContext;
use crate::{Error, Result, Value};

pub const STRING: &str = "string";
pub const STRING_WITH_BLANK: &str = "string-with-blank";
pub const BLANK_TO_NULL: &str = "blank-to-null";
pub const BOOLEAN: &str = "boolean";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const NUMBER: &str = "number";
pub const DATE: &str = "date";
pub const ARRAY: &str = "array";
pub const CALLBACK: &str = "callback";
pub const TRANSFORM: &str = "transform";
pub const TRANSFORM_LIST: &str = "transform-list";
pub const SPRINTF: &str = "sprintf";

/// Seed `registry` with the default filter set
pub fn register_builtins(registry: &mut FilterRegistry) {
    registry.register(STRING, string);
    registry.register(STRING_WITH_BLANK, string_with_blank);
    registry.register(BLANK_TO_NULL, blank_to_null);
    registry.register(BOOLEAN, boolean);
    registry.register(INTEGER, integer);
    registry.register(FLOAT, float);
    registry.register(NUMBER, number);
    registry.register(DATE, date);
    registry.register(ARRAY, array);
    registry.register(CALLBACK, callback);
    registry.register(TRANSFORM, transform);
    registry.register(TRANSFORM_LIST, transform_list);
}

fn text_of(value: &Value, ctx: &FilterContext<'_>) -> Result<String> {
    value
        .to_text()
        .ok_or_else(|| Error::filter(ctx.name(), format!("cannot convert {} to string", value.kind())))
}

/// Cast to text; the empty string becomes null
pub fn string(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let text = text_of(&value, ctx)?;
    Ok(if text.is_empty() {
        Value::Null
    } else {
        Value::String(text)
    })
}

/// Cast to text, keeping the empty string
pub fn string_with_blank(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    text_of(&value, ctx).map(Value::String)
}

/// Map the empty string to null and cast anything else to text
pub fn blank_to_null(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    match value {
        Value::String(s) if s.is_empty() => Ok(Value::Null),
        Value::String(s) => Ok(Value::String(s)),
        other => text_of(&other, ctx).map(Value::String),
    }
}

pub fn boolean(value: Value, _ctx: &FilterContext<'_>) -> Result<Value> {
    Ok(Value::Bool(value.truthy()))
}

pub fn integer(value: Value, _ctx: &FilterContext<'_>) -> Result<Value> {
    Ok(Value::Integer(value.to_integer()))
}

pub fn float(value: Value, _ctx: &FilterContext<'_>) -> Result<Value> {
    Ok(Value::Float(value.to_float()))
}

/// Format a number as text
///
/// Arguments: decimals (default 0), decimal separator (default `.`),
/// thousands separator (default `,`).
pub fn number(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    if matches!(value, Value::List(_) | Value::Map(_)) {
        return Err(Error::filter(
            ctx.name(),
            format!("cannot format {} as a number", value.kind()),
        ));
    }

    let decimals = ctx
        .value_arg(0)
        .map_or(0, Value::to_integer)
        .clamp(0, 100) as usize;
    let decimal_separator = text_arg(ctx, 1)?.unwrap_or_else(|| ".".to_string());
    let thousands_separator = text_arg(ctx, 2)?.unwrap_or_else(|| ",".to_string());

    Ok(Value::String(format::number_format(
        value.to_float(),
        decimals,
        &decimal_separator,
        &thousands_separator,
    )))
}

fn text_arg(ctx: &FilterContext<'_>, index: usize) -> Result<Option<String>> {
    ctx.value_arg(index)
        .map(|arg| {
            arg.to_text().ok_or_else(|| {
                Error::filter(ctx.name(), format!("argument {} must be text", index + 1))
            })
        })
        .transpose()
}

/// Parse a date and render it with a pattern
///
/// Arguments: format (default [`date::DEFAULT_FORMAT`]) and an optional time
/// zone used to read text without an offset. Values that are neither text
/// nor instants become null.
pub fn date(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let pattern = text_arg(ctx, 0)?.unwrap_or_else(|| date::DEFAULT_FORMAT.to_string());
    let zone = match text_arg(ctx, 1)? {
        Some(name) => Some(date::parse_timezone(&name).ok_or_else(|| {
            Error::filter(ctx.name(), format!("Unknown or bad timezone ({})", name))
        })?),
        None => None,
    };

    let instant = match value {
        Value::String(text) => date::parse_datetime(&text, zone).ok_or_else(|| {
            Error::filter(ctx.name(), format!("Failed to parse time string ({})", text))
        })?,
        Value::DateTime(dt) => {
            if zone.is_some() {
                return Err(Error::filter(
                    ctx.name(),
                    "Changing the time zone of an existing instant is not supported",
                ));
            }
            dt
        }
        _ => return Ok(Value::Null),
    };

    Ok(Value::String(date::format_datetime(&instant, &pattern)))
}

/// Wrap anything that is not already a container in a one-element list
pub fn array(value: Value, _ctx: &FilterContext<'_>) -> Result<Value> {
    Ok(match value {
        Value::List(_) | Value::Map(_) => value,
        scalar => Value::List(vec![scalar]),
    })
}

/// Hand the value to the callable passed as first argument
pub fn callback(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let callback = ctx.callback_arg(0)?;
    callback(value)
}

/// Run the nested transformer on a single object
///
/// Empty containers yield null so that optional fields are omitted.
pub fn transform(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let nested = ctx.transformer_arg(0)?;
    match value {
        Value::Map(_) | Value::List(_) if value.is_empty_container() => Ok(Value::Null),
        Value::Map(_) | Value::List(_) => nested.to_target_in(&value, Value::map(), Some(ctx.scope())),
        other => Err(Error::filter(
            ctx.name(),
            format!("expected a map or list, got {}", other.kind()),
        )),
    }
}

/// Run the nested transformer on every element of a list (or every value of
/// a map), collecting the results in order
pub fn transform_list(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let nested = ctx.transformer_arg(0)?;
    let items: Vec<Value> = match value {
        Value::List(items) => items,
        Value::Map(map) => map.into_values().collect(),
        other => {
            return Err(Error::filter(
                ctx.name(),
                format!("expected a list, got {}", other.kind()),
            ));
        }
    };
    if items.is_empty() {
        return Ok(Value::Null);
    }

    items
        .iter()
        .map(|item| nested.to_target_in(item, Value::map(), Some(ctx.scope())))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

/// printf-style formatting with the format string as first argument
///
/// Not registered by default: `transformer.register_filter("sprintf", built_in::sprintf)`.
pub fn sprintf(value: Value, ctx: &FilterContext<'_>) -> Result<Value> {
    let pattern = text_arg(ctx, 0)?
        .ok_or_else(|| Error::filter(ctx.name(), "missing format argument"))?;
    format::sprintf(&pattern, &value).map(Value::String)
}
