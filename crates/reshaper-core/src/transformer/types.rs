//! Core types for the transformation engine
//!
//! This module defines the frozen [`Rule`] snapshot, filter invocations and
//! their arguments, and the [`FilterContext`] handed to every filter call.
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use super::engine::Transformer;
use super::registry::FilterRegistry;
use crate::{Error, Result, Value};
use std::fmt;
use std::sync::Arc;

/// User callable passed to the `callback` filter
pub type Callback = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// A registered filter: receives the current value and its invocation context
pub type FilterFn = Arc<dyn Fn(Value, &FilterContext<'_>) -> Result<Value> + Send + Sync>;

/// Argument of a filter invocation
#[derive(Clone)]
pub enum Argument {
    /// Plain data argument (decimals, separators, formats, time zones...)
    Value(Value),
    /// User callable, consumed by `callback`
    Callback(Callback),
    /// Nested transformer, consumed by `transform` and `transform-list`
    Transformer(Arc<Transformer>),
}

impl Argument {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Argument::Callback(callback) => Some(callback),
            _ => None,
        }
    }

    pub fn as_transformer(&self) -> Option<&Transformer> {
        match self {
            Argument::Transformer(transformer) => Some(transformer.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Argument::Callback(_) => f.write_str("Callback(..)"),
            Argument::Transformer(transformer) => f
                .debug_struct("Transformer")
                .field("rules", &transformer.rule_count())
                .finish(),
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Value(Value::from(s))
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Value(Value::from(s))
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Argument::Value(Value::from(i))
    }
}

impl From<i32> for Argument {
    fn from(i: i32) -> Self {
        Argument::Value(Value::from(i))
    }
}

impl From<f64> for Argument {
    fn from(f: f64) -> Self {
        Argument::Value(Value::from(f))
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Value(Value::from(b))
    }
}

/// One step of a rule's filter chain
///
/// The name is resolved against the registry when the chain runs, not when
/// the rule is built.
#[derive(Debug, Clone)]
pub struct FilterInvocation {
    name: String,
    arguments: Vec<Argument>,
}

impl FilterInvocation {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

/// A single field mapping rule
///
/// Rules are frozen once built; use [`RuleBuilder`](super::RuleBuilder) to
/// assemble one.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Dot path written in the target; empty means nothing is written
    pub(crate) destination: String,
    /// Dot path read from the source; empty means the default is used
    pub(crate) source: String,
    /// Fallback for a missing or null source value
    pub(crate) default: Value,
    /// Write null results instead of omitting the field
    pub(crate) required: bool,
    /// Filters applied left to right
    pub(crate) filters: Vec<FilterInvocation>,
}

impl Rule {
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn filters(&self) -> &[FilterInvocation] {
        &self.filters
    }
}

/// Chain of registries visible while a transformer runs
///
/// A nested transformer sees its own registry first and then the registry of
/// every transformer that invoked it.
pub(crate) struct Scope<'a> {
    registry: &'a FilterRegistry,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(registry: &'a FilterRegistry, parent: Option<&'a Scope<'a>>) -> Self {
        Self { registry, parent }
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<&'a FilterFn> {
        match self.registry.resolve(name) {
            Some(filter) => Some(filter),
            None => self.parent.and_then(|parent| parent.resolve(name)),
        }
    }
}

/// Context information available to filters
pub struct FilterContext<'a> {
    name: &'a str,
    arguments: &'a [Argument],
    scope: &'a Scope<'a>,
}

impl<'a> FilterContext<'a> {
    pub(crate) fn new(name: &'a str, arguments: &'a [Argument], scope: &'a Scope<'a>) -> Self {
        Self {
            name,
            arguments,
            scope,
        }
    }

    /// Name the filter was invoked under
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Arguments of the invocation, in declaration order
    pub fn arguments(&self) -> &'a [Argument] {
        self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&'a Argument> {
        self.arguments.get(index)
    }

    /// Data argument at `index`; absent and null arguments both yield `None`
    pub fn value_arg(&self, index: usize) -> Option<&'a Value> {
        self.argument(index)
            .and_then(Argument::as_value)
            .filter(|value| !value.is_null())
    }

    /// Callable argument at `index`
    pub fn callback_arg(&self, index: usize) -> Result<&'a Callback> {
        self.argument(index)
            .and_then(Argument::as_callback)
            .ok_or_else(|| Error::filter(self.name, format!("argument {} must be a callable", index + 1)))
    }

    /// Nested transformer argument at `index`
    pub fn transformer_arg(&self, index: usize) -> Result<&'a Transformer> {
        self.argument(index)
            .and_then(Argument::as_transformer)
            .ok_or_else(|| {
                Error::filter(self.name, format!("argument {} must be a transformer", index + 1))
            })
    }

    pub(crate) fn scope(&self) -> &'a Scope<'a> {
        self.scope
    }
}

impl fmt::Debug for FilterContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}
