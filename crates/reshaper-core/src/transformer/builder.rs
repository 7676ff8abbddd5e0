//! Builder for creating mapping rules
//!
//! This module provides the fluent [`RuleBuilder`] and the compact rule DSL
//! (`"string|required"`). Configuration problems are recorded while the
//! chain is assembled and reported once by [`RuleBuilder::build`].
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use super::built_in;
use super::engine::Transformer;
use super::types::{Argument, FilterInvocation, Rule};
use crate::{Error, Result, Value};
use std::sync::Arc;

/// Reserved DSL token that marks a rule as required
pub const REQUIRED_TOKEN: &str = "required";

/// Builder for creating mapping rules
#[derive(Debug, Default)]
pub struct RuleBuilder {
    destination: String,
    source: String,
    default: Value,
    required: bool,
    filters: Vec<FilterInvocation>,
    error: Option<Error>,
}

impl RuleBuilder {
    /// Create an empty rule builder
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Parse a compact rule such as `"integer|required"`
    ///
    /// Tokens are separated by `|` and trimmed. The `required` token may
    /// appear anywhere; every other token names a filter. The empty string
    /// yields a rule without filters, while an empty token is rejected.
    pub fn from_dsl(dsl: &str) -> Result<Self> {
        let mut builder = Self::new();
        builder.push_dsl(dsl)?;
        Ok(builder)
    }

    /// Append the tokens of a compact rule to this builder
    pub fn dsl(mut self, dsl: &str) -> Self {
        if let Err(err) = self.push_dsl(dsl) {
            self.error.get_or_insert(err);
        }
        self
    }

    fn push_dsl(&mut self, dsl: &str) -> Result<()> {
        if dsl.trim().is_empty() {
            return Ok(());
        }

        for token in dsl.split('|').map(str::trim) {
            match token {
                "" => {
                    return Err(Error::InvalidRule {
                        message: "empty filter name".to_string(),
                        rule: Some(dsl.to_string()),
                    });
                }
                REQUIRED_TOKEN => self.required = true,
                built_in::CALLBACK | built_in::TRANSFORM | built_in::TRANSFORM_LIST => {
                    return Err(Error::InvalidRule {
                        message: format!(
                            "filter '{}' needs an argument and cannot be named in a compact rule",
                            token
                        ),
                        rule: Some(dsl.to_string()),
                    });
                }
                name => self.filters.push(FilterInvocation::new(name, Vec::new())),
            }
        }
        Ok(())
    }

    /// Set the destination path
    pub fn destination(mut self, path: impl Into<String>) -> Self {
        self.destination = path.into();
        self
    }

    /// Set the source path
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = path.into();
        self
    }

    /// Value used when the source is missing or null
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Write the field even when the result is null
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Append a filter without arguments
    pub fn filter(self, name: impl Into<String>) -> Self {
        self.filter_with(name, Vec::new())
    }

    /// Append a filter with arguments
    pub fn filter_with(mut self, name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        self.filters.push(FilterInvocation::new(name, arguments));
        self
    }

    /// Cast to text, turning blanks into null
    pub fn string(self) -> Self {
        self.filter(built_in::STRING)
    }

    /// Cast to text, keeping blanks
    pub fn string_with_blank(self) -> Self {
        self.filter(built_in::STRING_WITH_BLANK)
    }

    pub fn boolean(self) -> Self {
        self.filter(built_in::BOOLEAN)
    }

    pub fn integer(self) -> Self {
        self.filter(built_in::INTEGER)
    }

    pub fn float(self) -> Self {
        self.filter(built_in::FLOAT)
    }

    /// Format as text with fixed decimals and custom separators
    pub fn number(self, decimals: u32, decimal_separator: &str, thousands_separator: &str) -> Self {
        self.filter_with(
            built_in::NUMBER,
            vec![
                Argument::from(Value::from(decimals)),
                Argument::from(decimal_separator),
                Argument::from(thousands_separator),
            ],
        )
    }

    /// Render a date with `format`, reading naive text as UTC
    pub fn date(self, format: &str) -> Self {
        self.filter_with(built_in::DATE, vec![Argument::from(format)])
    }

    /// Render a date with `format`, reading naive text in `timezone`
    pub fn date_in(self, format: &str, timezone: &str) -> Self {
        self.filter_with(
            built_in::DATE,
            vec![Argument::from(format), Argument::from(timezone)],
        )
    }

    pub fn array(self) -> Self {
        self.filter(built_in::ARRAY)
    }

    /// Pass the value through a user callable
    pub fn callback<F>(self, callback: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.filter_with(built_in::CALLBACK, vec![Argument::Callback(Arc::new(callback))])
    }

    /// Map the value through a nested transformer
    ///
    /// `configure` runs once, right here, against a fresh transformer; the
    /// configured transformer is reused by every later call.
    pub fn transform<F>(self, configure: F) -> Self
    where
        F: FnOnce(&mut Transformer) -> Result<()>,
    {
        self.nested(built_in::TRANSFORM, configure)
    }

    /// Map every element of a list through a nested transformer
    pub fn transform_list<F>(self, configure: F) -> Self
    where
        F: FnOnce(&mut Transformer) -> Result<()>,
    {
        self.nested(built_in::TRANSFORM_LIST, configure)
    }

    fn nested<F>(self, filter: &str, configure: F) -> Self
    where
        F: FnOnce(&mut Transformer) -> Result<()>,
    {
        let mut nested = Transformer::new();
        match configure(&mut nested) {
            Ok(()) => self.with_transformer(filter, nested),
            Err(err) => {
                let mut builder = self;
                builder.error.get_or_insert(Error::InvalidRule {
                    message: format!("nested transformer configuration failed: {}", err),
                    rule: Some(filter.to_string()),
                });
                builder
            }
        }
    }

    /// Append `filter` with an already configured transformer
    pub fn with_transformer(self, filter: &str, transformer: Transformer) -> Self {
        self.filter_with(filter, vec![Argument::Transformer(Arc::new(transformer))])
    }

    /// Freeze the rule
    pub fn build(self) -> Result<Rule> {
        if let Some(err) = self.error {
            return Err(err);
        }

        Ok(Rule {
            destination: self.destination,
            source: self.source,
            default: self.default,
            required: self.required,
            filters: self.filters,
        })
    }
}

impl From<Rule> for RuleBuilder {
    fn from(rule: Rule) -> Self {
        Self {
            destination: rule.destination,
            source: rule.source,
            default: rule.default,
            required: rule.required,
            filters: rule.filters,
            error: None,
        }
    }
}

/// The forms a rule can take when passed to [`Transformer::map`]
#[derive(Debug)]
pub enum RuleInput {
    Dsl(String),
    Builder(RuleBuilder),
    Rule(Rule),
}

impl RuleInput {
    pub(crate) fn into_builder(self) -> Result<RuleBuilder> {
        match self {
            RuleInput::Dsl(dsl) => RuleBuilder::from_dsl(&dsl),
            RuleInput::Builder(builder) => Ok(builder),
            RuleInput::Rule(rule) => Ok(RuleBuilder::from(rule)),
        }
    }
}

impl From<&str> for RuleInput {
    fn from(dsl: &str) -> Self {
        RuleInput::Dsl(dsl.to_string())
    }
}

impl From<String> for RuleInput {
    fn from(dsl: String) -> Self {
        RuleInput::Dsl(dsl)
    }
}

impl From<RuleBuilder> for RuleInput {
    fn from(builder: RuleBuilder) -> Self {
        RuleInput::Builder(builder)
    }
}

impl From<Rule> for RuleInput {
    fn from(rule: Rule) -> Self {
        RuleInput::Rule(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rule: &Rule) -> Vec<&str> {
        rule.filters().iter().map(FilterInvocation::name).collect()
    }

    #[test]
    fn test_dsl_required_anywhere() {
        let rule = RuleBuilder::from_dsl("required|string| trim ").unwrap().build().unwrap();
        assert!(rule.is_required());
        assert_eq!(names(&rule), vec!["string", "trim"]);
    }

    #[test]
    fn test_dsl_empty_string_has_no_filters() {
        let rule = RuleBuilder::from_dsl("").unwrap().build().unwrap();
        assert!(rule.filters().is_empty());
        assert!(!rule.is_required());
    }

    #[test]
    fn test_dsl_rejects_empty_segment() {
        let err = RuleBuilder::from_dsl("string||integer").unwrap_err();
        assert!(matches!(err, Error::InvalidRule { rule: Some(ref r), .. } if r == "string||integer"));

        let err = RuleBuilder::new().integer().dsl("|").build().unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));
    }

    #[test]
    fn test_dsl_rejects_filters_that_need_arguments() {
        for dsl in ["callback", "string|transform", "transform-list|required"] {
            let err = RuleBuilder::from_dsl(dsl).unwrap_err();
            assert!(matches!(err, Error::InvalidRule { rule: Some(ref r), .. } if r == dsl));
        }

        let err = RuleBuilder::new().string().dsl("transform").build().unwrap_err();
        assert!(err.to_string().contains("transform"));
    }

    #[test]
    fn test_dsl_appends_to_existing_chain() {
        let rule = RuleBuilder::new().boolean().dsl("integer|required").build().unwrap();
        assert_eq!(names(&rule), vec!["boolean", "integer"]);
        assert!(rule.is_required());
    }

    #[test]
    fn test_shorthands_record_arguments() {
        let rule = RuleBuilder::new()
            .number(2, ",", ".")
            .date_in("Y-m-d", "+01:00")
            .build()
            .unwrap();
        let filters = rule.filters();
        assert_eq!(filters[0].name(), "number");
        assert_eq!(filters[0].arguments().len(), 3);
        assert_eq!(filters[0].arguments()[0].as_value(), Some(&Value::Integer(2)));
        assert_eq!(filters[1].name(), "date");
        assert_eq!(filters[1].arguments()[1].as_value(), Some(&Value::from("+01:00")));
    }

    #[test]
    fn test_failed_nested_configuration_surfaces_on_build() {
        let err = RuleBuilder::new()
            .transform(|nested| {
                nested.map("a", "a", "string||")?;
                Ok(())
            })
            .string()
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRule { rule: Some(ref r), .. } if r == "transform"));
    }

    #[test]
    fn test_rule_round_trips_through_builder() {
        let rule = RuleBuilder::new()
            .destination("out")
            .source("in")
            .default(5)
            .integer()
            .build()
            .unwrap();
        let again = RuleBuilder::from(rule).required().build().unwrap();
        assert_eq!(again.destination(), "out");
        assert_eq!(again.source(), "in");
        assert_eq!(again.default_value(), &Value::Integer(5));
        assert!(again.is_required());
        assert_eq!(names(&again), vec!["integer"]);
    }
}
