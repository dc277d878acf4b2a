//! The normalization pass: re-orders every interned array of a compiled
//! collection by ascending canonical content key, independent of the
//! order entities were interned in during the build. Used by the bundle
//! builder to make checksums insensitive to declaration order.

use crate::candidate::CandidateValue;
use crate::compiled::CompiledCollection;
use crate::condition::Condition;
use crate::condition_set::ConditionSet;
use crate::decision::ConcreteDecision;
use crate::ids::{CandidateValueIndex, ConditionIndex, ConditionSetIndex, DecisionIndex};
use crate::resource::Resource;

fn sorted_permutation<T>(entries: &[T], key_of: impl Fn(&T) -> String) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| key_of(&entries[i]));
    let mut old_to_new = vec![0usize; entries.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        old_to_new[old_idx] = new_idx;
    }
    (order, old_to_new)
}

fn reorder<T: Clone>(entries: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| entries[i].clone()).collect()
}

/// Re-intern every entity in `compiled` through a canonical-key sort,
/// producing a collection whose arrays no longer depend on the order the
/// source declarations were built in.
#[must_use]
pub fn normalize(compiled: CompiledCollection) -> CompiledCollection {
    let CompiledCollection {
        qualifier_types,
        qualifiers,
        resource_types,
        conditions,
        condition_sets,
        decisions,
        resources,
        candidate_values,
    } = compiled;

    // qualifier_index references config, which normalization does not reorder.
    let (cond_order, cond_old_to_new) = sorted_permutation(&conditions, Condition::content_key);
    let conditions: Vec<Condition> = reorder(&conditions, &cond_order);

    let remap_condition_set = |set: &ConditionSet| -> ConditionSet {
        ConditionSet {
            condition_indices: set
                .condition_indices
                .iter()
                .map(|idx| ConditionIndex(cond_old_to_new[idx.get()]))
                .collect(),
        }
    };
    let remapped_condition_sets: Vec<ConditionSet> =
        condition_sets.iter().map(remap_condition_set).collect();
    let (cs_order, cs_old_to_new) = sorted_permutation(&remapped_condition_sets, |cs| {
        cs.content_key(&conditions)
    });
    let condition_sets = reorder(&remapped_condition_sets, &cs_order);

    let (cv_order, cv_old_to_new) =
        sorted_permutation(&candidate_values, CandidateValue::content_key);
    let candidate_values = reorder(&candidate_values, &cv_order);

    let remap_decision = |d: &ConcreteDecision| -> ConcreteDecision {
        ConcreteDecision {
            candidates: d
                .candidates
                .iter()
                .map(|c| {
                    let mut c = c.clone();
                    c.condition_set_index = ConditionSetIndex(cs_old_to_new[c.condition_set_index.get()]);
                    c.value_index = CandidateValueIndex(cv_old_to_new[c.value_index.get()]);
                    c
                })
                .collect(),
        }
    };
    let remapped_decisions: Vec<ConcreteDecision> = decisions.iter().map(remap_decision).collect();
    let (dec_order, dec_old_to_new) = sorted_permutation(&remapped_decisions, |d| {
        let shape = d.abstract_shape();
        let abstract_key = shape.content_key(&condition_sets, &conditions);
        d.content_key(&abstract_key)
    });
    let decisions = reorder(&remapped_decisions, &dec_order);

    let mut resources: Vec<Resource> = resources
        .into_iter()
        .map(|mut r| {
            r.decision_index = DecisionIndex(dec_old_to_new[r.decision_index.get()]);
            r
        })
        .collect();
    resources.sort_by(|a, b| a.id.cmp(&b.id));

    CompiledCollection {
        qualifier_types,
        qualifiers,
        resource_types,
        conditions,
        condition_sets,
        decisions,
        resources,
        candidate_values,
    }
}
