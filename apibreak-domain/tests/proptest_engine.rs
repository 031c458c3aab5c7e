//! Property-based tests for activation and request transforms.
//!
//! These tests verify that:
//! - Normal mode always picks `floor(n/2)+1` available categories, identically on every run
//! - ALL mode activates exactly what is available; disabled mode nothing
//! - Renaming maps every old key to its new key at any depth and touches nothing else
//! - The deprecated-field check fires iff an old key sits at the top level

use apibreak_domain::{ActivationPolicy, BreakingHandler, RecordedResponse, normal_mode_size};
use apibreak_profiles::ProfileRegistry;
use apibreak_types::{
    ActivationMode, Category, Definition, EndpointBreakingProfile, FieldRenameDef, ProfileDecl,
};
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

const OLD: [&str; 3] = ["category_id", "min_price", "sort_by"];
const NEW: [&str; 3] = ["categoryId", "minPrice", "sortBy"];

fn rename_handler() -> BreakingHandler {
    let mapping: BTreeMap<String, String> = NEW
        .iter()
        .zip(OLD.iter())
        .map(|(n, o)| (n.to_string(), o.to_string()))
        .collect();
    let profile = EndpointBreakingProfile::empty("POST /search".parse().unwrap()).with_definition(
        Definition::FieldRename(FieldRenameDef::new(mapping).unwrap()),
    );
    BreakingHandler::new(
        Arc::new(profile),
        &[Category::FieldRename].into_iter().collect(),
    )
}

fn to_new(k: &str) -> String {
    OLD.iter()
        .position(|o| *o == k)
        .map(|i| NEW[i].to_string())
        .unwrap_or_else(|| k.to_string())
}

/// Keys drawn from old names plus a couple of neutral ones.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(OLD.to_vec()).prop_map(str::to_string),
        prop::sample::select(vec!["limit", "page", "name"]).prop_map(str::to_string),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Reference rename, written independently of the engine's walker.
fn expected_rename(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(to_new(k), expected_rename(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(expected_rename).collect()),
        other => other.clone(),
    }
}

fn profile_decl(path: &str, cats: &[Category]) -> ProfileDecl {
    ProfileDecl {
        method: "GET".to_string(),
        path: path.to_string(),
        available_categories: cats.iter().map(|c| c.as_str().to_string()).collect(),
        definitions: BTreeMap::new(),
    }
}

fn arb_categories() -> impl Strategy<Value = Vec<Category>> {
    prop::sample::subsequence(Category::ALL.to_vec(), 0..=6)
}

proptest! {
    #[test]
    fn rename_matches_reference_at_every_depth(input in arb_json()) {
        let out = rename_handler().transform_request(input.clone());
        prop_assert_eq!(out, expected_rename(&input));
    }

    #[test]
    fn deprecated_check_fires_iff_old_key_on_top(input in arb_json()) {
        let violation = rename_handler().check_deprecated_fields(&input);
        let has_old = input
            .as_object()
            .map(|m| OLD.iter().any(|o| m.contains_key(*o)))
            .unwrap_or(false);
        prop_assert_eq!(violation.is_some(), has_old);
        if let Some(v) = violation {
            prop_assert_eq!(v.code.as_str(), "UNKNOWN_FIELD");
        }
    }

    #[test]
    fn normal_mode_size_subset_and_determinism(
        cats in arb_categories(),
        seed in "[a-z0-9]{1,12}",
    ) {
        let decl = profile_decl("/categories/:id/sales-stats", &cats);
        let registry = ProfileRegistry::from_decls([("p", &decl)]).unwrap();
        let key = "GET /categories/{id}/sales-stats".parse().unwrap();

        let first = ActivationPolicy::new(ActivationMode::Normal, seed.clone()).activate(&registry);
        let second = ActivationPolicy::new(ActivationMode::Normal, seed).activate(&registry);
        prop_assert_eq!(&first, &second);

        let active = first.get(&key).unwrap();
        prop_assert_eq!(active.len(), normal_mode_size(cats.len()));
        prop_assert!(active.iter().all(|c| cats.contains(c)));
    }

    #[test]
    fn all_and_disabled_modes(cats in arb_categories()) {
        let decl = profile_decl("/orders", &cats);
        let registry = ProfileRegistry::from_decls([("p", &decl)]).unwrap();
        let key = "GET /orders".parse().unwrap();

        let all = ActivationPolicy::new(ActivationMode::All, "x").activate(&registry);
        let active: Vec<Category> = all.get(&key).unwrap().iter().copied().collect();
        prop_assert_eq!(active, cats.clone());

        let off = ActivationPolicy::new(ActivationMode::Disabled, "x").activate(&registry);
        prop_assert!(off.get(&key).unwrap().is_empty());
    }

    #[test]
    fn disabled_mode_response_is_untouched(data in arb_json()) {
        let decl: ProfileDecl = serde_json::from_value(json!({
            "method": "GET",
            "path": "/x",
            "availableCategories": ["STATUS_CODE", "RESPONSE_STRUCTURE"],
            "definitions": {
                "STATUS_CODE": { "successCode": 218 },
                "RESPONSE_STRUCTURE": { "wrapKey": "data" }
            }
        })).unwrap();
        let registry = ProfileRegistry::from_decls([("p", &decl)]).unwrap();
        let map = ActivationPolicy::new(ActivationMode::Disabled, "x").activate(&registry);
        let key = "GET /x".parse().unwrap();

        let handler = BreakingHandler::new(registry.get(&key).unwrap().clone(), map.get(&key).unwrap());
        let mut sink = RecordedResponse::new();
        handler.send_response(&mut sink, data.clone(), 200);
        prop_assert_eq!(sink.status, Some(200));
        prop_assert_eq!(sink.body, Some(data));
    }

    #[test]
    fn status_code_218_regardless_of_payload(data in arb_json()) {
        let profile = EndpointBreakingProfile::empty("GET /x".parse().unwrap()).with_definition(
            Definition::from_params(Category::StatusCode, &json!({ "successCode": 218 })).unwrap(),
        );
        let handler = BreakingHandler::new(
            Arc::new(profile),
            &[Category::StatusCode].into_iter().collect(),
        );
        let out = handler.finalize(data.clone(), 200);
        prop_assert_eq!(out.status, 218);
        prop_assert_eq!(out.body, data);
    }
}
