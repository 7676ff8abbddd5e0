//! Reshaper Core - Rule-driven reshaping of nested key/value data
//!
//! This crate maps an arbitrary nested source structure into a new target
//! structure according to a declarative list of field-mapping rules. Each
//! rule reads a dot path from the source, runs the value through a chain of
//! named filters and writes the result to a dot path in the target.
//!
//! # Main Components
//!
//! - **Values**: [`Value`], the dynamically typed payload flowing through the engine
//! - **Paths**: dot-notation reads and writes over nested maps and lists ([`path`])
//! - **Transformer**: rules, filter registry and filter pipeline ([`transformer`])
//! - **Rule Sets**: rules declared in JSON or YAML documents ([`ruleset`])
//! - **Error Handling**: error types built with `thiserror` and `anyhow`
//!
//! # Example
//!
//! ```
//! use reshaper_core::{Result, RuleBuilder, Transformer, Value};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let mut transformer = Transformer::new();
//!     transformer
//!         .map("username", "username", "string|required")?
//!         .map("enabled", "enabled", RuleBuilder::new().boolean())?
//!         .copy("city", "address.city");
//!
//!     let source = Value::from(json!({
//!         "username": "admin",
//!         "enabled": "1",
//!         "address": {"city": "Berlin"}
//!     }));
//!     let target = transformer.to_target(&source)?;
//!     assert_eq!(
//!         serde_json::Value::from(target),
//!         json!({"username": "admin", "enabled": true, "city": "Berlin"})
//!     );
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod path;
pub mod ruleset;
pub mod transformer;
pub mod value;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use ruleset::{FilterCall, FilterChainSpec, FilterSpec, RuleSet, RuleSpec};
pub use transformer::{
    Argument, Callback, FilterContext, FilterFn, FilterInvocation, FilterRegistry, Rule,
    RuleBuilder, RuleInput, Transformer,
};
pub use value::{Map, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
