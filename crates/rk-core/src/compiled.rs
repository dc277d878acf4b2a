//! The compiled collection: dense, index-aligned arrays of every interned
//! entity produced by a build, ready to serialize into a bundle.

use crate::candidate::CandidateValue;
use crate::condition::Condition;
use crate::condition_set::ConditionSet;
use crate::config::ResourceType;
use crate::decision::ConcreteDecision;
use crate::qualifier::QualifierType;
use crate::qualifiers::Qualifier;
use crate::resource::Resource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A frozen snapshot of every interned entity from a single build, with
/// all cross-references expressed as dense array indices.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompiledCollection {
    /// Registered qualifier types, index-aligned with qualifier `typeName` lookups.
    pub qualifier_types: Vec<QualifierType>,
    /// Registered qualifiers.
    pub qualifiers: Vec<Qualifier>,
    /// Registered resource types.
    pub resource_types: Vec<ResourceType>,
    /// Interned conditions.
    pub conditions: Vec<Condition>,
    /// Interned condition sets.
    pub condition_sets: Vec<ConditionSet>,
    /// Interned concrete decisions.
    pub decisions: Vec<ConcreteDecision>,
    /// Registered resources.
    pub resources: Vec<Resource>,
    /// Interned candidate values.
    pub candidate_values: Vec<CandidateValue>,
}

impl CompiledCollection {
    /// An empty compiled collection.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            qualifier_types: Vec::new(),
            qualifiers: Vec::new(),
            resource_types: Vec::new(),
            conditions: Vec::new(),
            condition_sets: Vec::new(),
            decisions: Vec::new(),
            resources: Vec::new(),
            candidate_values: Vec::new(),
        }
    }

    /// Total number of interned entities across every array, used for
    /// quick size reporting and in tests.
    #[must_use]
    pub fn total_entity_count(&self) -> usize {
        self.qualifier_types.len()
            + self.qualifiers.len()
            + self.resource_types.len()
            + self.conditions.len()
            + self.condition_sets.len()
            + self.decisions.len()
            + self.resources.len()
            + self.candidate_values.len()
    }
}
