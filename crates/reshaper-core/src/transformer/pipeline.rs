//! Filter pipeline implementation
//!
//! Runs a rule's filter chain against one resolved value. A null value ends
//! the chain immediately, so no filter ever observes a null input: neither
//! the initial value nor the output of an earlier filter.
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use super::types::{FilterContext, Rule, Scope};
use crate::{Error, Result, Value};

/// Executes filter chains
pub(crate) struct FilterPipeline;

impl FilterPipeline {
    /// Apply the rule's filters in order, resolving each name in `scope`
    ///
    /// An unresolvable name fails with [`Error::FilterNotFound`]; filter
    /// errors are returned unchanged.
    pub(crate) fn apply(mut value: Value, rule: &Rule, scope: &Scope<'_>) -> Result<Value> {
        for invocation in rule.filters() {
            if value.is_null() {
                break;
            }

            let name = invocation.name();
            let filter = scope.resolve(name).ok_or_else(|| Error::FilterNotFound {
                name: name.to_string(),
            })?;

            tracing::trace!(filter = name, destination = rule.destination(), "applying filter");
            let context = FilterContext::new(name, invocation.arguments(), scope);
            value = filter(value, &context)?;
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::{FilterRegistry, RuleBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_registry(calls: Arc<AtomicUsize>) -> FilterRegistry {
        let mut registry = FilterRegistry::with_builtins();
        registry.register("count", move |value, _ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        });
        registry
    }

    #[test]
    fn test_null_input_skips_every_filter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let scope = Scope::new(&registry, None);
        let rule = RuleBuilder::new().filter("count").filter("count").build().unwrap();

        let result = FilterPipeline::apply(Value::Null, &rule, &scope).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_null_mid_chain_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let scope = Scope::new(&registry, None);
        let rule = RuleBuilder::new().string().filter("count").build().unwrap();

        let result = FilterPipeline::apply(Value::from(""), &rule, &scope).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_filters_run_left_to_right() {
        let mut registry = FilterRegistry::with_builtins();
        registry.register("append-a", |value, _ctx| {
            Ok(Value::from(format!("{}a", value.as_str().unwrap_or_default())))
        });
        registry.register("append-b", |value, _ctx| {
            Ok(Value::from(format!("{}b", value.as_str().unwrap_or_default())))
        });
        let scope = Scope::new(&registry, None);
        let rule = RuleBuilder::new().filter("append-a").filter("append-b").build().unwrap();

        let result = FilterPipeline::apply(Value::from(">"), &rule, &scope).unwrap();
        assert_eq!(result, Value::from(">ab"));
    }

    #[test]
    fn test_unknown_filter_is_reported_by_name() {
        let registry = FilterRegistry::with_builtins();
        let scope = Scope::new(&registry, None);
        let rule = RuleBuilder::new().filter("foo").build().unwrap();

        let err = FilterPipeline::apply(Value::from("value"), &rule, &scope).unwrap_err();
        assert!(matches!(err, Error::FilterNotFound { ref name } if name == "foo"));
        assert_eq!(err.to_string(), "Filter not found: foo");
    }

    #[test]
    fn test_parent_scope_is_consulted() {
        let mut parent_registry = FilterRegistry::new();
        parent_registry.register("lower", |value, _ctx| {
            Ok(Value::from(value.as_str().unwrap_or_default().to_lowercase()))
        });
        let parent = Scope::new(&parent_registry, None);
        let child_registry = FilterRegistry::with_builtins();
        let scope = Scope::new(&child_registry, Some(&parent));
        let rule = RuleBuilder::new().filter("lower").build().unwrap();

        let result = FilterPipeline::apply(Value::from("ABC"), &rule, &scope).unwrap();
        assert_eq!(result, Value::from("abc"));
    }
}
