//! Candidate values and the candidates that reference them inside a decision.

use crate::hash::default_hash;
use crate::ids::{CandidateValueIndex, ConditionSetIndex, ContentKey};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON payload deduplicated by the hash of its canonical form across the
/// entire corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateValue(pub Value);

impl CandidateValue {
    /// Content key: CRC32 hash of the canonical serialization of the payload.
    #[must_use]
    pub fn content_key(&self) -> ContentKey {
        default_hash(&self.0)
    }
}

/// How a partial candidate's payload combines with the next non-partial
/// candidate in resolver rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Deep-merge JSON objects; arrays are replaced wholesale; primitives
    /// are overwritten only where the partial specifies them.
    Augment,
    /// The partial replaces the base value wholesale.
    Replace,
    /// The partial payload enumerates keys to drop from the base value.
    Delete,
}

/// A `(condition set, payload)` pair inside a [`crate::decision::ConcreteDecision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The condition set guarding this candidate.
    pub condition_set_index: ConditionSetIndex,
    /// The interned payload value.
    pub value_index: CandidateValueIndex,
    /// Whether this candidate only partially specifies its payload.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_partial: bool,
    /// How a partial candidate merges into the next non-partial one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<MergeMethod>,
    /// Original declaration order, used as the final resolver tie-break.
    pub declaration_index: usize,
}

/// Deep-merge `patch` into `base` per `augment` semantics: objects merge
/// key-by-key recursively, arrays are replaced wholesale, and primitives
/// are overwritten only where `patch` specifies them.
#[must_use]
pub fn merge_augment(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (k, v) in patch_map {
                let next = match merged.get(k) {
                    Some(existing) => merge_augment(existing, v),
                    None => v.clone(),
                };
                merged.insert(k.clone(), next);
            }
            Value::Object(merged)
        }
        (_, patch_val) => patch_val.clone(),
    }
}

/// Delete semantics: `patch` enumerates keys (an array of strings, or a
/// single string) to drop from `base`.
#[must_use]
pub fn merge_delete(base: &Value, patch: &Value) -> Value {
    let Value::Object(base_map) = base else {
        return base.clone();
    };
    let mut result = base_map.clone();
    let keys: Vec<&str> = match patch {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => vec![s.as_str()],
        _ => Vec::new(),
    };
    for key in keys {
        result.remove(key);
    }
    Value::Object(result)
}

/// Apply `method` to fold `patch` onto `base`.
#[must_use]
pub fn apply_merge(method: MergeMethod, base: &Value, patch: &Value) -> Value {
    match method {
        MergeMethod::Augment => merge_augment(base, patch),
        MergeMethod::Replace => patch.clone(),
        MergeMethod::Delete => merge_delete(base, patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn augment_merges_objects_recursively() {
        let base = json!({"a": 1, "b": 2});
        let patch = json!({"b": 20, "c": 3});
        assert_eq!(merge_augment(&base, &patch), json!({"a": 1, "b": 20, "c": 3}));
    }

    #[test]
    fn augment_replaces_arrays_wholesale() {
        let base = json!({"items": [1, 2, 3]});
        let patch = json!({"items": [9]});
        assert_eq!(apply_merge(MergeMethod::Augment, &base, &patch), json!({"items": [9]}));
    }

    #[test]
    fn replace_overwrites_base_entirely() {
        let base = json!({"a": 1});
        let patch = json!({"b": 2});
        assert_eq!(apply_merge(MergeMethod::Replace, &base, &patch), json!({"b": 2}));
    }

    #[test]
    fn delete_removes_listed_keys() {
        let base = json!({"a": 1, "b": 2, "c": 3});
        let patch = json!(["a", "c"]);
        assert_eq!(apply_merge(MergeMethod::Delete, &base, &patch), json!({"b": 2}));
    }

    #[test]
    fn candidate_value_content_key_ignores_key_order() {
        let a = CandidateValue(json!({"x": 1, "y": 2}));
        let b = CandidateValue(json!({"y": 2, "x": 1}));
        assert_eq!(a.content_key(), b.content_key());
    }
}
