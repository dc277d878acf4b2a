//! Resources: globally unique identifiers that resolve through a decision.

use crate::ids::{DecisionIndex, ResourceTypeIndex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A resource identifier that resolves through a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Globally unique resource id.
    pub id: String,
    /// The resource type this resource belongs to.
    pub resource_type_index: ResourceTypeIndex,
    /// The decision that resolves this resource's candidates.
    pub decision_index: DecisionIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_carries_its_type_and_decision() {
        let r = Resource {
            id: "app.title".into(),
            resource_type_index: ResourceTypeIndex(0),
            decision_index: DecisionIndex(3),
        };
        assert_eq!(r.id, "app.title");
        assert_eq!(r.decision_index.get(), 3);
    }
}
