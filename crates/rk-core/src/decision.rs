//! Decisions: ordered lists of candidates. Abstract decisions share
//! structure (condition-set shape) across resources; concrete decisions
//! additionally key on the payload sequence.

use crate::candidate::Candidate;
use crate::condition::Condition;
use crate::condition_set::ConditionSet;
use crate::hash::default_hash_bytes;
use crate::ids::{CandidateValueIndex, ConditionSetIndex, ContentKey};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ordered list of condition-set indices shared by every resource whose
/// decision has the same condition-set shape, ignoring payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbstractDecision {
    /// Condition sets, one per candidate slot, in canonical specificity order.
    pub condition_set_indices: Vec<ConditionSetIndex>,
}

impl AbstractDecision {
    /// Key: sorted condition-set content keys, concatenated with `+`.
    #[must_use]
    pub fn content_key(&self, condition_sets: &[ConditionSet], conditions: &[Condition]) -> ContentKey {
        let mut keys: Vec<String> = self
            .condition_set_indices
            .iter()
            .map(|idx| condition_sets[idx.get()].content_key(conditions))
            .collect();
        keys.sort();
        keys.join("+")
    }
}

/// An abstract decision plus the concrete payload sequence bound to each slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConcreteDecision {
    /// The candidates, in canonical specificity order.
    pub candidates: Vec<Candidate>,
}

impl ConcreteDecision {
    /// Key: `<abstract-key>|<CRC32 of the JSON-serialized value-index sequence>`.
    #[must_use]
    pub fn content_key(&self, abstract_key: &str) -> ContentKey {
        let values: Vec<usize> = self
            .candidates
            .iter()
            .map(|c| c.value_index.get())
            .collect();
        let serialized = serde_json::to_vec(&values).expect("usize sequence always serializes");
        let value_hash = default_hash_bytes(&serialized);
        format!("{abstract_key}|{value_hash}")
    }

    /// Derive the shared abstract-decision shape (condition sets only).
    #[must_use]
    pub fn abstract_shape(&self) -> AbstractDecision {
        AbstractDecision {
            condition_set_indices: self.candidates.iter().map(|c| c.condition_set_index).collect(),
        }
    }
}

/// Order `candidates` from most specific to least specific.
///
/// Specificity is each candidate's condition set's descending-sorted
/// priority multiset, compared lexicographically (longer/higher-priority
/// multisets rank first). Ties are broken by condition-set content key
/// ascending, then by original declaration index ascending for stability.
pub fn order_by_specificity(
    candidates: &mut [Candidate],
    condition_sets: &[ConditionSet],
    conditions: &[Condition],
) {
    candidates.sort_by(|a, b| {
        let a_set = &condition_sets[a.condition_set_index.get()];
        let b_set = &condition_sets[b.condition_set_index.get()];
        let a_spec = a_set.specificity(conditions);
        let b_spec = b_set.specificity(conditions);
        // Lexicographic compare, descending (more specific first).
        b_spec
            .cmp(&a_spec)
            .then_with(|| a_set.content_key(conditions).cmp(&b_set.content_key(conditions)))
            .then_with(|| a.declaration_index.cmp(&b.declaration_index))
    });
}
