//! Transformer: ordered rules plus a filter registry
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use super::builder::{RuleBuilder, RuleInput};
use super::pipeline::FilterPipeline;
use super::registry::FilterRegistry;
use super::types::{FilterContext, Rule, Scope};
use crate::{path, Result, Value};

/// Maps source structures into target structures
///
/// Rules are applied in declaration order. A finished transformer holds no
/// per-call state, so it can be reused and shared across threads.
#[derive(Debug, Clone)]
pub struct Transformer {
    rules: Vec<Rule>,
    registry: FilterRegistry,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    /// Create a transformer with the built-in filters and no rules
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            registry: FilterRegistry::with_builtins(),
        }
    }

    /// Register a filter under `name`, replacing any existing one
    pub fn register_filter<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(Value, &FilterContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register(name, filter);
        self
    }

    /// Register a filter that only looks at the value
    pub fn register_fn<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register(name, move |value, _ctx| filter(value));
        self
    }

    /// Start a new rule
    pub fn rule(&self) -> RuleBuilder {
        RuleBuilder::new()
    }

    /// Map `source` to `destination` through a rule or a compact DSL string
    ///
    /// Malformed DSL strings and failed nested configuration are reported
    /// here rather than when the transformer runs.
    pub fn map(
        &mut self,
        destination: impl Into<String>,
        source: impl Into<String>,
        rule: impl Into<RuleInput>,
    ) -> Result<&mut Self> {
        let rule = rule
            .into()
            .into_builder()?
            .destination(destination)
            .source(source)
            .build()?;
        Ok(self.add_rule(rule))
    }

    /// Copy `source` to `destination` unchanged
    pub fn copy(&mut self, destination: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.add_rule(Rule {
            destination: destination.into(),
            source: source.into(),
            default: Value::Null,
            required: false,
            filters: Vec::new(),
        })
    }

    /// Write a fixed value at `destination`
    pub fn set(&mut self, destination: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.add_rule(Rule {
            destination: destination.into(),
            source: String::new(),
            default: value.into(),
            required: false,
            filters: Vec::new(),
        })
    }

    /// Append an already built rule, keeping its own paths
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Transform one source into a new map
    pub fn to_target(&self, source: &Value) -> Result<Value> {
        self.to_target_with(source, Value::map())
    }

    /// Transform one source into an existing target
    pub fn to_target_with(&self, source: &Value, target: Value) -> Result<Value> {
        self.to_target_in(source, target, None)
    }

    /// Transform every source independently
    pub fn to_target_list(&self, sources: &[Value]) -> Result<Vec<Value>> {
        self.to_target_list_with(sources, Vec::with_capacity(sources.len()))
    }

    /// Transform every source independently, appending to `target`
    pub fn to_target_list_with(&self, sources: &[Value], mut target: Vec<Value>) -> Result<Vec<Value>> {
        let span = tracing::debug_span!("to_target_list", elements = sources.len());
        let _enter = span.enter();

        target.reserve(sources.len());
        for source in sources {
            target.push(self.to_target(source)?);
        }

        tracing::debug!(elements = sources.len(), "list transformation complete");
        Ok(target)
    }

    /// Apply every rule, resolving filters in this transformer first and then
    /// in `parent`
    pub(crate) fn to_target_in(&self, source: &Value, mut target: Value, parent: Option<&Scope<'_>>) -> Result<Value> {
        let span = tracing::debug_span!("to_target", rules = self.rules.len(), nested = parent.is_some());
        let _enter = span.enter();

        let scope = Scope::new(&self.registry, parent);
        for rule in &self.rules {
            let value = path::get(source, &rule.source, &rule.default);
            let value = FilterPipeline::apply(value, rule, &scope)?;

            if value.is_null() && !rule.required {
                tracing::trace!(destination = %rule.destination, source = %rule.source, "skipped null value");
                continue;
            }

            tracing::trace!(destination = %rule.destination, source = %rule.source, "writing value");
            path::set(&mut target, &rule.destination, value);
        }

        tracing::debug!("transformation complete");
        Ok(target)
    }
}
