//! Declarative rule sets loaded from JSON or YAML
//!
//! A rule set describes the rules of a [`Transformer`] as data:
//!
//! ```yaml
//! rules:
//!   - destination: id
//!     source: id
//!     filters: "integer|required"
//!   - destination: amount
//!     source: amount
//!     filters:
//!       - name: number
//!         args: [2, ".", ","]
//!   - destination: owner
//!     source: user
//!     transform:
//!       rules:
//!         - { destination: name, source: full_name, filters: string }
//! ```
//!
//! Filter names are resolved when the transformer runs, so a rule set may
//! reference custom filters registered with [`RuleSet::apply_to`].

use crate::transformer::{built_in, Argument, Rule, RuleBuilder, Transformer};
use crate::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered list of rule declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub destination: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub filters: FilterChainSpec,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Value,
    /// Nested rule set applied to the value as a single object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<RuleSet>,
    /// Nested rule set applied to every element of the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_list: Option<RuleSet>,
}

/// Filter chain as a compact string or as a list of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterChainSpec {
    Dsl(String),
    List(Vec<FilterSpec>),
}

impl Default for FilterChainSpec {
    fn default() -> Self {
        FilterChainSpec::List(Vec::new())
    }
}

/// Entry of a filter list: a compact string or a call with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Dsl(String),
    Call(FilterCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterCall {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RuleSet {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Json {
            message: format!("Failed to parse rule set: {}", e),
            source: e,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Yaml {
            message: format!("Failed to parse rule set: {}", e),
            source: e,
        })
    }

    /// Load a rule set, choosing the format from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read rule set from {:?}", path),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "loading rule set");
        match extension.as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(Error::Configuration {
                message: format!("Unsupported rule set format: {:?}", path),
                source: None,
            }),
        }
    }

    /// Build a fresh transformer carrying these rules
    pub fn build(&self) -> Result<Transformer> {
        let mut transformer = Transformer::new();
        self.apply_to(&mut transformer)?;
        Ok(transformer)
    }

    /// Append these rules to an existing transformer
    ///
    /// Nothing is added when any rule is invalid.
    pub fn apply_to(&self, transformer: &mut Transformer) -> Result<()> {
        let rules = self
            .rules
            .iter()
            .map(RuleSpec::to_rule)
            .collect::<Result<Vec<_>>>()?;
        for rule in rules {
            transformer.add_rule(rule);
        }
        Ok(())
    }
}

impl RuleSpec {
    /// Convert the declaration into a frozen rule
    pub fn to_rule(&self) -> Result<Rule> {
        let mut builder = RuleBuilder::new()
            .destination(self.destination.as_str())
            .source(self.source.as_str())
            .default(self.default.clone());
        if self.required {
            builder = builder.required();
        }

        builder = match &self.filters {
            FilterChainSpec::Dsl(dsl) => builder.dsl(dsl),
            FilterChainSpec::List(entries) => entries.iter().fold(builder, |builder, entry| match entry {
                FilterSpec::Dsl(dsl) => builder.dsl(dsl),
                FilterSpec::Call(call) => builder.filter_with(
                    call.name.as_str(),
                    call.args.iter().cloned().map(Argument::from).collect(),
                ),
            }),
        };

        builder = match (&self.transform, &self.transform_list) {
            (Some(_), Some(_)) => {
                return Err(Error::Configuration {
                    message: format!(
                        "Rule for '{}' declares both transform and transform_list",
                        self.destination
                    ),
                    source: None,
                });
            }
            (Some(nested), None) => builder.with_transformer(built_in::TRANSFORM, nested.build()?),
            (None, Some(nested)) => builder.with_transformer(built_in::TRANSFORM_LIST, nested.build()?),
            (None, None) => builder,
        };

        builder.build()
    }
}
