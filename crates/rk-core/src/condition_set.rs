//! Condition sets: ordered, deduplicated collections of [`Condition`]s,
//! canonicalized independent of declaration order.

use crate::condition::Condition;
use crate::hash::default_hash_bytes;
use crate::ids::{ConditionIndex, ContentKey};
use crate::qualifiers::Qualifier;
use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ordered, deduplicated collection of conditions; all members must
/// match for the owning candidate to be considered. Canonicalized by
/// `(qualifier.defaultPriority DESC, qualifier.name ASC, value ASC, operator ASC)`
/// before hashing, so declaration order never affects interning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    /// Indices of this set's member conditions, in canonical order.
    pub condition_indices: Vec<ConditionIndex>,
}

/// Canonically sort `conditions` and detect duplicate qualifiers.
///
/// `lookup` maps a condition's `qualifier_index` to `(name, default_priority)`, used
/// only for ordering — the condition's own `priority` still drives resolver scoring.
pub fn canonical_order<F>(conditions: &[(ConditionIndex, Condition)], lookup: F) -> Result<Vec<ConditionIndex>>
where
    F: Fn(crate::ids::QualifierIndex) -> (String, u32),
{
    let mut seen_qualifiers = std::collections::HashSet::new();
    for (_, cond) in conditions {
        if !seen_qualifiers.insert(cond.qualifier_index) {
            let (name, _) = lookup(cond.qualifier_index);
            return Err(ResError::new(
                ErrorCode::DuplicateQualifierInSet,
                format!("qualifier '{name}' appears more than once in a condition set"),
            ));
        }
    }

    let mut annotated: Vec<_> = conditions
        .iter()
        .map(|(idx, cond)| {
            let (name, default_priority) = lookup(cond.qualifier_index);
            (*idx, cond.clone(), name, default_priority)
        })
        .collect();

    annotated.sort_by(|a, b| {
        b.3.cmp(&a.3) // defaultPriority DESC
            .then_with(|| a.2.cmp(&b.2)) // qualifier.name ASC
            .then_with(|| a.1.value.cmp(&b.1.value)) // value ASC
            .then_with(|| a.1.operator.cmp(&b.1.operator)) // operator ASC
    });

    Ok(annotated.into_iter().map(|(idx, ..)| idx).collect())
}

impl ConditionSet {
    /// Content key: CRC32 hash of the joined canonical condition tokens, in
    /// canonical order, separated by `,`.
    #[must_use]
    pub fn content_key(&self, conditions: &[Condition]) -> ContentKey {
        let joined = self
            .condition_indices
            .iter()
            .map(|idx| conditions[idx.get()].canonical_token())
            .collect::<Vec<_>>()
            .join(",");
        default_hash_bytes(joined.as_bytes())
    }

    /// Number of member conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.condition_indices.len()
    }

    /// Whether this set has no conditions (matches any context).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.condition_indices.is_empty()
    }

    /// The multiset of priorities attached to this set's conditions, sorted
    /// descending — used to compare specificity (§4.5).
    #[must_use]
    pub fn specificity(&self, conditions: &[Condition]) -> Vec<u32> {
        let mut priorities: Vec<u32> = self
            .condition_indices
            .iter()
            .map(|idx| conditions[idx.get()].priority)
            .collect();
        priorities.sort_unstable_by(|a, b| b.cmp(a));
        priorities
    }
}

/// Convenience used by tests and the builder to look up qualifier ordering keys.
#[must_use]
pub fn qualifier_lookup(qualifiers: &[Qualifier]) -> impl Fn(crate::ids::QualifierIndex) -> (String, u32) + '_ {
    move |idx| {
        let q = &qualifiers[idx.get()];
        (q.name.clone(), q.default_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::QualifierIndex;

    fn qualifiers() -> Vec<Qualifier> {
        vec![
            Qualifier::new("language", "language", 900).unwrap(),
            Qualifier::new("currentTerritory", "territory", 700).unwrap(),
        ]
    }

    #[test]
    fn rejects_duplicate_qualifier() {
        let conds = vec![
            (ConditionIndex(0), Condition::new(QualifierIndex(0), "en", None, 900).unwrap()),
            (ConditionIndex(1), Condition::new(QualifierIndex(0), "fr", None, 900).unwrap()),
        ];
        let qs = qualifiers();
        let err = canonical_order(&conds, qualifier_lookup(&qs)).unwrap_err();
        assert_eq!(err.code, rk_error::ErrorCode::DuplicateQualifierInSet);
    }

    #[test]
    fn orders_by_descending_default_priority_then_name() {
        let conds = vec![
            (ConditionIndex(0), Condition::new(QualifierIndex(1), "MX", None, 700).unwrap()),
            (ConditionIndex(1), Condition::new(QualifierIndex(0), "en", None, 900).unwrap()),
        ];
        let qs = qualifiers();
        let order = canonical_order(&conds, qualifier_lookup(&qs)).unwrap();
        // language has higher default priority (900 > 700), sorts first.
        assert_eq!(order, vec![ConditionIndex(1), ConditionIndex(0)]);
    }

    #[test]
    fn order_independent_of_declaration_order() {
        let qs = qualifiers();
        let a = vec![
            (ConditionIndex(0), Condition::new(QualifierIndex(1), "MX", None, 700).unwrap()),
            (ConditionIndex(1), Condition::new(QualifierIndex(0), "en", None, 900).unwrap()),
        ];
        let b = vec![
            (ConditionIndex(1), Condition::new(QualifierIndex(0), "en", None, 900).unwrap()),
            (ConditionIndex(0), Condition::new(QualifierIndex(1), "MX", None, 700).unwrap()),
        ];
        assert_eq!(
            canonical_order(&a, qualifier_lookup(&qs)).unwrap(),
            canonical_order(&b, qualifier_lookup(&qs)).unwrap()
        );
    }

    #[test]
    fn specificity_sorts_priorities_descending() {
        let set = ConditionSet {
            condition_indices: vec![ConditionIndex(0), ConditionIndex(1)],
        };
        let conditions = vec![
            Condition::new(QualifierIndex(0), "en", None, 300).unwrap(),
            Condition::new(QualifierIndex(1), "MX", None, 900).unwrap(),
        ];
        assert_eq!(set.specificity(&conditions), vec![900, 300]);
    }
}
