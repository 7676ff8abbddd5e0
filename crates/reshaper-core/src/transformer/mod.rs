//! Rule-driven transformation of nested structures
//!
//! A [`Transformer`] holds an ordered list of [`Rule`]s. Each rule reads a
//! value from the source by dot path, runs it through a chain of named
//! filters and writes the result to the target by dot path.
//!
//! # Module Organization
//!
//! - [`types`] - Rules, filter invocations, arguments and the filter context
//! - [`builder`] - Fluent rule builder and the compact `"a|b|required"` DSL
//! - [`registry`] - Named filter registry
//! - `pipeline` - Filter chain execution with null short-circuit
//! - [`engine`] - The transformer itself
//! - [`built_in`] - Pre-registered filters
//! - [`format`] / [`date`] - Number, printf and date rendering helpers
//!
//! # Examples
//!
//! ## Compact rules
//!
//! ```
//! use reshaper_core::{Transformer, Value};
//! use serde_json::json;
//!
//! let mut transformer = Transformer::new();
//! transformer
//!     .map("id", "user.id", "integer|required")?
//!     .map("name", "user.name", "string")?;
//!
//! let source = Value::from(json!({"user": {"id": "42", "name": ""}}));
//! let target = transformer.to_target(&source)?;
//! assert_eq!(serde_json::Value::from(target), json!({"id": 42}));
//! # Ok::<(), reshaper_core::Error>(())
//! ```
//!
//! ## Nested transformers
//!
//! ```
//! use reshaper_core::{Transformer, Value};
//! use serde_json::json;
//!
//! let mut transformer = Transformer::new();
//! let rule = transformer.rule().transform_list(|item| {
//!     item.map("sku", "code", "string")?;
//!     Ok(())
//! });
//! transformer.map("lines", "items", rule)?;
//!
//! let source = Value::from(json!({"items": [{"code": 7}, {"code": "x"}]}));
//! let target = transformer.to_target(&source)?;
//! assert_eq!(
//!     serde_json::Value::from(target),
//!     json!({"lines": [{"sku": "7"}, {"sku": "x"}]})
//! );
//! # Ok::<(), reshaper_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

// Core types
pub mod types;

// Rule builder API
pub mod builder;

// Filter lookup
pub mod registry;

// Filter chain execution
mod pipeline;

// Transformer
pub mod engine;

// Pre-registered filters and their helpers
pub mod built_in;
pub mod date;
pub mod format;


pub use builder::{RuleBuilder, RuleInput, REQUIRED_TOKEN};
pub use engine::Transformer;
pub use registry::FilterRegistry;
pub use types::{Argument, Callback, FilterContext, FilterFn, FilterInvocation, Rule};
