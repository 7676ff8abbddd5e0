//! Property-based tests for the transformation engine
//!
//! These tests verify the invariants that hold for every source record:
//! how null results are written, that filters never receive null and that
//! list transformation is element-wise.

use proptest::prelude::*;
use reshaper_core::{Error, RuleBuilder, Transformer, Value};
use serde_json::json;

// Strategy functions for property testing

/// Strategy for generating map keys without path separators
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Strategy for generating scalar JSON values
fn scalar_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i32>().prop_map(serde_json::Value::from),
        (-1.0e6f64..1.0e6).prop_map(serde_json::Value::from),
        "[a-zA-Z0-9 .,-]{0,12}".prop_map(serde_json::Value::from),
    ]
}

/// Strategy for generating nested JSON values
fn json_strategy() -> impl Strategy<Value = serde_json::Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map(key_strategy(), inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for generating flat source records
fn record_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..6)
        .prop_map(|map| Value::from(serde_json::Value::Object(map.into_iter().collect())))
}

/// Strategy for generating filter chains over the test filters
fn chain_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(
        prop_oneof![Just("nullify"), Just("guard"), Just("string"), Just("blank-to-null")],
        0..5,
    )
}

/// Transformer whose "guard" filter fails when handed null
fn guarded_transformer(chain: &[&str]) -> Transformer {
    let mut transformer = Transformer::new();
    transformer
        .register_fn("nullify", |_| Ok(Value::Null))
        .register_fn("guard", |v| {
            if v.is_null() {
                return Err(Error::filter("guard", "received null"));
            }
            Ok(v)
        });
    transformer
        .map("out", "in", RuleBuilder::new().dsl(&chain.join("|")))
        .unwrap();
    transformer
}

proptest! {
    #[test]
    fn prop_null_without_required_is_omitted(key in key_strategy(), record in record_strategy()) {
        let mut transformer = Transformer::new();
        transformer.map("out", key.as_str(), "nullify").unwrap();
        transformer.register_fn("nullify", |_| Ok(Value::Null));

        let target = transformer.to_target(&record).unwrap();
        prop_assert_eq!(target, Value::map());
    }

    #[test]
    fn prop_null_with_required_is_written(key in key_strategy(), record in record_strategy()) {
        let mut transformer = Transformer::new();
        transformer.map("out", key.as_str(), "nullify|required").unwrap();
        transformer.register_fn("nullify", |_| Ok(Value::Null));

        let target = transformer.to_target(&record).unwrap();
        prop_assert_eq!(target, Value::from(json!({"out": null})));
    }

    #[test]
    fn prop_filters_never_receive_null(chain in chain_strategy(), input in scalar_strategy()) {
        let transformer = guarded_transformer(&chain);
        let source = Value::from(json!({"in": input}));

        prop_assert!(transformer.to_target(&source).is_ok());
    }

    #[test]
    fn prop_dsl_matches_builder(input in scalar_strategy()) {
        let mut from_dsl = Transformer::new();
        from_dsl.map("id", "id", "integer|required").unwrap();

        let mut from_builder = Transformer::new();
        from_builder
            .map("id", "id", RuleBuilder::new().integer().required())
            .unwrap();

        let source = Value::from(json!({"id": input}));
        prop_assert_eq!(
            from_dsl.to_target(&source).unwrap(),
            from_builder.to_target(&source).unwrap()
        );
    }

    #[test]
    fn prop_list_is_element_wise(sources in prop::collection::vec(json_strategy(), 0..6)) {
        let mut transformer = Transformer::new();
        transformer
            .copy("copied", "a")
            .map("label", "b", "required")
            .unwrap()
            .map("flag", "c", "boolean|required")
            .unwrap()
            .set("origin", "import");

        let sources: Vec<Value> = sources.into_iter().map(Value::from).collect();
        let targets = transformer.to_target_list(&sources).unwrap();

        prop_assert_eq!(targets.len(), sources.len());
        for (source, target) in sources.iter().zip(targets) {
            prop_assert_eq!(transformer.to_target(source).unwrap(), target);
        }
    }
}
