//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random
//! values and dot paths for property testing.

#![cfg(test)]

use crate::value::{Map, Value};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for generating map keys (no dots, so every key is addressable)
pub fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Strategy for generating dot paths of one to four segments
pub fn path_strategy() -> impl Strategy<Value = String> {
    vec(prop_oneof![key_strategy(), "[0-3]"], 1..=4).prop_map(|segments| segments.join("."))
}

/// Strategy for generating scalar values (NaN excluded so equality holds)
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 .,!?]{0,20}".prop_map(Value::String),
    ]
}

/// Strategy for generating nested values up to three levels deep
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::List),
            vec((key_strategy(), inner), 0..4)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

/// Strategy for generating non-empty source records of scalar fields
pub fn record_strategy() -> impl Strategy<Value = Value> {
    vec((key_strategy(), scalar_strategy()), 1..6)
        .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>()))
}
