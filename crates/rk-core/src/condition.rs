//! A condition is a `(qualifier, value, operator, priority)` predicate.

use crate::hash::default_hash_bytes;
use crate::ids::{ContentKey, QualifierIndex};
use crate::qualifier::OP_MATCHES;
use crate::qualifiers::MAX_PRIORITY;
use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single `(qualifier, value, operator, priority)` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// The qualifier this condition is evaluated against.
    pub qualifier_index: QualifierIndex,
    /// The condition's declared value, already validated by the qualifier's type.
    pub value: String,
    /// The operator this condition is evaluated under.
    pub operator: String,
    /// Tie-breaking priority in `[0, 1000]`.
    pub priority: u32,
}

impl Condition {
    /// Construct a condition, validating the priority range. Does not
    /// validate `value` against the qualifier type — callers intern
    /// through [`crate::collector::ConditionCollector`], which does.
    pub fn new(
        qualifier_index: QualifierIndex,
        value: impl Into<String>,
        operator: Option<String>,
        priority: u32,
    ) -> Result<Self> {
        if priority > MAX_PRIORITY {
            return Err(ResError::new(
                ErrorCode::PriorityOutOfRange,
                format!("condition priority {priority} exceeds {MAX_PRIORITY}"),
            ));
        }
        Ok(Self {
            qualifier_index,
            value: value.into(),
            operator: operator.unwrap_or_else(|| OP_MATCHES.to_string()),
            priority,
        })
    }

    /// Canonical token used to compute the condition's content key:
    /// `<qualifierIndex>=<value>:<operator>:<priority>`.
    #[must_use]
    pub fn canonical_token(&self) -> String {
        format!(
            "{}={}:{}:{}",
            self.qualifier_index, self.value, self.operator, self.priority
        )
    }

    /// Content key used for interning. Equal conditions (same qualifier,
    /// value, operator, priority) always hash to the same key.
    #[must_use]
    pub fn content_key(&self) -> ContentKey {
        default_hash_bytes(self.canonical_token().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_priority_above_max() {
        assert!(Condition::new(QualifierIndex(0), "en", None, 1001).is_err());
    }

    #[test]
    fn defaults_operator_to_matches() {
        let c = Condition::new(QualifierIndex(0), "en", None, 500).unwrap();
        assert_eq!(c.operator, OP_MATCHES);
    }

    #[test]
    fn equal_conditions_share_content_key() {
        let a = Condition::new(QualifierIndex(1), "en", None, 500).unwrap();
        let b = Condition::new(QualifierIndex(1), "en", Some("matches".into()), 500).unwrap();
        assert_eq!(a.content_key(), b.content_key());
    }

    #[test]
    fn differing_priority_changes_content_key() {
        let a = Condition::new(QualifierIndex(1), "en", None, 500).unwrap();
        let b = Condition::new(QualifierIndex(1), "en", None, 800).unwrap();
        assert_ne!(a.content_key(), b.content_key());
    }
}
