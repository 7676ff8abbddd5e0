//! Named filter registry
//!
//! Maps filter names to callables. Registering an existing name replaces the
//! previous filter, which is how callers override built-ins.

use super::built_in;
use super::types::{FilterContext, FilterFn};
use crate::{Result, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Mapping from filter name to filter callable
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        built_in::register_builtins(&mut registry);
        registry
    }

    /// Register a filter, replacing any filter of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value, &FilterContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    /// Register an already shared filter
    pub fn register_shared(&mut self, name: impl Into<String>, filter: FilterFn) {
        self.filters.insert(name.into(), filter);
    }

    pub fn resolve(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}
