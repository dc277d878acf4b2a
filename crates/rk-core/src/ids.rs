//! Typed index and key newtypes used as stable handles between interned
//! entities, in place of raw pointers — every cross-reference in a
//! compiled collection is by position, so bundles serialize trivially.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! index_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// The raw positional index.
            #[must_use]
            pub fn get(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self(v)
            }
        }
    };
}

index_newtype!(QualifierIndex, "Stable index of a [`Qualifier`](crate::qualifiers::Qualifier) within a system configuration.");
index_newtype!(QualifierTypeIndex, "Stable index of a [`QualifierType`](crate::qualifier::QualifierType) within a system configuration.");
index_newtype!(ResourceTypeIndex, "Stable index of a resource type name within a system configuration.");
index_newtype!(ConditionIndex, "Stable index of an interned [`Condition`](crate::condition::Condition).");
index_newtype!(ConditionSetIndex, "Stable index of an interned [`ConditionSet`](crate::condition_set::ConditionSet).");
index_newtype!(CandidateValueIndex, "Stable index of an interned candidate value.");
index_newtype!(AbstractDecisionIndex, "Stable index of an interned abstract decision.");
index_newtype!(DecisionIndex, "Stable index of an interned concrete decision.");
index_newtype!(ResourceIndex, "Stable index of a resource within a compiled collection.");

/// A content-addressed key: a lowercase hex hash string.
pub type ContentKey = String;
