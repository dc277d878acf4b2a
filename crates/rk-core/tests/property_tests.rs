//! Property-based tests for the universal invariants the resolution engine
//! must hold regardless of input shape: hash idempotence, interning
//! order-independence, and round-tripping through a bundle.

use proptest::prelude::*;
use rk_core::builder::{CandidateDeclaration, ConditionDeclaration, ResourceDeclaration, ResourceManagerBuilder};
use rk_core::bundle::{BundleBuildOptions, BundleBuilder, BundleLoadOptions, BundleLoader};
use rk_core::config::SystemConfiguration;
use rk_core::hash::{default_hash, CanonicalNormalizer, Normalizer};
use serde_json::Value;
use std::collections::HashMap;

// ── Arbitrary JSON values, bounded in depth so the recursive strategy terminates ──

fn arb_json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_json_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Property 2: hashing a value's normalized form twice in a row never
    /// changes the hash, for arbitrary JSON shapes.
    #[test]
    fn hash_idempotence(value in arb_json()) {
        let once = default_hash(&value);
        let normalized_bytes = CanonicalNormalizer.normalize(&value);
        let reparsed: Value = serde_json::from_slice(&normalized_bytes).unwrap();
        let twice = default_hash(&reparsed);
        prop_assert_eq!(once, twice);
    }

    /// Reordering an object's keys never changes its canonical hash.
    #[test]
    fn hash_ignores_object_key_order(entries in prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 1..8)) {
        let mut forward = serde_json::Map::new();
        for (k, v) in &entries {
            forward.insert(k.clone(), Value::Number((*v).into()));
        }
        let mut reversed = serde_json::Map::new();
        for (k, v) in entries.iter().rev() {
            reversed.insert(k.clone(), Value::Number((*v).into()));
        }
        prop_assert_eq!(default_hash(&Value::Object(forward)), default_hash(&Value::Object(reversed)));
    }
}

fn single_resource(id: &str, lang: &str, text: &str) -> ResourceDeclaration {
    ResourceDeclaration {
        id: id.to_string(),
        resource_type_name: "string".to_string(),
        candidates: vec![CandidateDeclaration {
            json: serde_json::json!({"text": text}),
            conditions: vec![ConditionDeclaration {
                qualifier_name: "language".to_string(),
                value: lang.to_string(),
                operator: None,
                priority: None,
            }],
            is_partial: false,
            merge_method: None,
        }],
    }
}

proptest! {
    /// Property 1: declaring the same set of resources in any permutation
    /// of insertion order yields the same interned entity counts — the
    /// content keys, not insertion order, determine identity.
    #[test]
    fn interning_is_order_independent(perm_seed in 0u64..6) {
        let langs = ["en", "fr", "de"];
        let mut order: Vec<usize> = (0..langs.len()).collect();
        // Deterministic pseudo-shuffle keyed by perm_seed (no RNG allowed).
        for i in (1..order.len()).rev() {
            let j = (perm_seed as usize + i) % (i + 1);
            order.swap(i, j);
        }

        let mut builder = ResourceManagerBuilder::new(SystemConfiguration::default_profile());
        for &i in &order {
            builder
                .add_resource(single_resource(&format!("app.title.{i}"), langs[i], langs[i]))
                .unwrap();
        }
        let compiled = builder.compile();
        // Every permutation declares three distinct resources, each with its
        // own language condition and candidate payload — the interned counts
        // are the same regardless of the order they were added in.
        prop_assert_eq!(compiled.conditions.len(), 3);
        prop_assert_eq!(compiled.candidate_values.len(), 3);
        prop_assert_eq!(compiled.resources.len(), 3);
    }
}

proptest! {
    /// Property 4: resolving through a freshly-built manager and resolving
    /// through a manager loaded back from the serialized bundle agree,
    /// for arbitrary resource payload text.
    #[test]
    fn round_trip_resolves_identically(text in "[a-zA-Z0-9 ]{1,24}") {
        let config = SystemConfiguration::default_profile();
        let mut builder = ResourceManagerBuilder::new(config.clone());
        builder.add_resource(single_resource("app.title", "en", &text)).unwrap();
        let compiled = builder.compile();

        let mut ctx: HashMap<String, String> = HashMap::new();
        ctx.insert("language".to_string(), "en".to_string());

        let direct = rk_core::manager::ResourceManager::new(config.clone(), compiled.clone())
            .resolve("app.title", &ctx)
            .unwrap();

        let bundle = BundleBuilder::build(
            config,
            compiled,
            BundleBuildOptions { normalize: true, version: None, description: None },
            chrono::Utc::now(),
        );
        let manager = BundleLoader::load(bundle, BundleLoadOptions::default()).unwrap();
        let via_bundle = manager.resolve("app.title", &ctx).unwrap();

        prop_assert_eq!(direct, via_bundle);
    }
}
