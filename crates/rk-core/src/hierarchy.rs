//! Declarative resource hierarchies: nested groups of resource entries where
//! an enclosing group's conditions are contributed as *ambient conditions*
//! to every resource nested beneath it, in addition to the entry's own
//! conditions. Flattening a hierarchy produces the same
//! [`ResourceDeclaration`]s a flat declarative corpus would, so the builder
//! never needs to know hierarchies exist.

use crate::builder::{CandidateDeclaration, ConditionDeclaration, ResourceDeclaration};
use crate::candidate::MergeMethod;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One resource entry inside a [`ResourceGroup`]: a single candidate
/// contribution for a resource id, guarded by its own conditions plus
/// whatever ambient conditions its enclosing groups contribute.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// The resource id this entry contributes a candidate to.
    pub id: String,
    /// The candidate's JSON payload.
    pub json: Value,
    /// This entry's own guarding conditions, by qualifier name.
    #[serde(default)]
    pub conditions: HashMap<String, String>,
    /// Whether this candidate only partially specifies its payload.
    #[serde(default)]
    pub is_partial: bool,
    /// How a partial candidate merges into the next non-partial one.
    #[serde(default)]
    pub merge_method: Option<MergeMethod>,
    /// Resource type name; defaults to the group's inherited default if omitted.
    #[serde(default)]
    pub resource_type_name: Option<String>,
}

/// A node in a declarative resource hierarchy: ambient conditions that
/// apply to every entry and nested group beneath it, plus entries and
/// child groups of its own.
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    /// Conditions contributed to every resource entry nested under this group.
    #[serde(default)]
    pub ambient_conditions: HashMap<String, String>,
    /// Default resource type name for entries in this group that omit one.
    #[serde(default)]
    pub default_resource_type_name: Option<String>,
    /// Resource entries directly in this group.
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    /// Nested child groups.
    #[serde(default)]
    pub groups: Vec<ResourceGroup>,
}

fn conditions_to_declarations(conditions: &HashMap<String, String>) -> Vec<ConditionDeclaration> {
    let mut names: Vec<&String> = conditions.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| ConditionDeclaration {
            qualifier_name: name.clone(),
            value: conditions[name].clone(),
            operator: None,
            priority: None,
        })
        .collect()
}

/// Flatten a [`ResourceGroup`] tree into [`ResourceDeclaration`]s, combining
/// each ancestor's ambient conditions with every nested entry's own
/// conditions, and merging entries that share a resource id into one
/// declaration's candidate list (declaration order is a depth-first walk).
#[must_use]
pub fn flatten(root: &ResourceGroup, fallback_resource_type: &str) -> Vec<ResourceDeclaration> {
    let mut order: Vec<String> = Vec::new();
    let mut candidates: HashMap<String, (String, Vec<CandidateDeclaration>)> = HashMap::new();
    walk(root, &HashMap::new(), fallback_resource_type, &mut order, &mut candidates);
    order
        .into_iter()
        .map(|id| {
            let (resource_type_name, cands) = candidates.remove(&id).expect("tracked in order");
            ResourceDeclaration {
                id,
                resource_type_name,
                candidates: cands,
            }
        })
        .collect()
}

fn walk(
    group: &ResourceGroup,
    inherited: &HashMap<String, String>,
    fallback_resource_type: &str,
    order: &mut Vec<String>,
    candidates: &mut HashMap<String, (String, Vec<CandidateDeclaration>)>,
) {
    let mut ambient = inherited.clone();
    for (k, v) in &group.ambient_conditions {
        ambient.insert(k.clone(), v.clone());
    }
    let resource_type = group
        .default_resource_type_name
        .clone()
        .unwrap_or_else(|| fallback_resource_type.to_string());

    for entry in &group.resources {
        let mut merged_conditions = ambient.clone();
        for (k, v) in &entry.conditions {
            merged_conditions.insert(k.clone(), v.clone());
        }
        let declaration = CandidateDeclaration {
            json: entry.json.clone(),
            conditions: conditions_to_declarations(&merged_conditions),
            is_partial: entry.is_partial,
            merge_method: entry.merge_method,
        };
        let entry_type = entry.resource_type_name.clone().unwrap_or_else(|| resource_type.clone());
        let slot = candidates.entry(entry.id.clone()).or_insert_with(|| {
            order.push(entry.id.clone());
            (entry_type.clone(), Vec::new())
        });
        slot.1.push(declaration);
    }

    for child in &group.groups {
        walk(child, &ambient, fallback_resource_type, order, candidates);
    }
}
