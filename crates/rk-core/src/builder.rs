//! Resource manager builder: ingests declarations, interns them into the
//! collectors, and freezes a [`CompiledCollection`].

use crate::candidate::{Candidate, CandidateValue, MergeMethod};
use crate::collector::Collector;
use crate::compiled::CompiledCollection;
use crate::condition::Condition;
use crate::condition_set::{self, ConditionSet};
use crate::config::SystemConfiguration;
use crate::decision::{order_by_specificity, AbstractDecision, ConcreteDecision};
use crate::ids::{CandidateValueIndex, ConditionIndex, ConditionSetIndex};
use crate::qualifier::{QualifierTypeBehavior, OP_MATCHES};
use crate::resource::Resource;
use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A declarative condition entry: `{qualifierName, value, operator?, priority?}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDeclaration {
    /// Name of the qualifier this condition constrains.
    pub qualifier_name: String,
    /// The condition's value, validated against the qualifier's type.
    pub value: String,
    /// Operator; defaults to `matches`.
    #[serde(default)]
    pub operator: Option<String>,
    /// Priority; defaults to the qualifier's `defaultPriority`.
    #[serde(default)]
    pub priority: Option<u32>,
}

/// A declarative candidate entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDeclaration {
    /// The candidate's JSON payload.
    pub json: Value,
    /// The guarding conditions.
    #[serde(default)]
    pub conditions: Vec<ConditionDeclaration>,
    /// Whether this candidate only partially specifies its payload.
    #[serde(default)]
    pub is_partial: bool,
    /// How a partial candidate merges into the next non-partial candidate.
    #[serde(default)]
    pub merge_method: Option<MergeMethod>,
}

/// A declarative resource entry, as accepted by [`ResourceManagerBuilder::add_resource`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDeclaration {
    /// Globally unique resource id.
    pub id: String,
    /// Name of the resource type this resource belongs to.
    pub resource_type_name: String,
    /// The resource's candidates.
    pub candidates: Vec<CandidateDeclaration>,
}

/// Ingests [`ResourceDeclaration`]s into interning collectors and freezes a
/// [`CompiledCollection`] on [`ResourceManagerBuilder::compile`].
pub struct ResourceManagerBuilder {
    config: SystemConfiguration,
    conditions: Collector<Condition>,
    condition_sets: Collector<ConditionSet>,
    candidate_values: Collector<CandidateValue>,
    abstract_decisions: Collector<AbstractDecision>,
    decisions: Collector<ConcreteDecision>,
    resources: Vec<Resource>,
    resource_ids: HashSet<String>,
    declaration_counter: usize,
}

impl ResourceManagerBuilder {
    /// Start a new builder bound to a system configuration.
    #[must_use]
    pub fn new(config: SystemConfiguration) -> Self {
        Self {
            config,
            conditions: Collector::new(),
            condition_sets: Collector::new(),
            candidate_values: Collector::new(),
            abstract_decisions: Collector::new(),
            decisions: Collector::new(),
            resources: Vec::new(),
            resource_ids: HashSet::new(),
            declaration_counter: 0,
        }
    }

    fn intern_condition(&mut self, decl: &ConditionDeclaration) -> Result<ConditionIndex> {
        let (qualifier_index, qualifier) = self
            .config
            .qualifier_with_index(&decl.qualifier_name)
            .ok_or_else(|| {
                ResError::new(
                    ErrorCode::UnknownQualifier,
                    format!("unknown qualifier '{}'", decl.qualifier_name),
                )
            })?
            .clone_tuple();
        let qualifier_type = self.config.qualifier_type_for(&decl.qualifier_name)?;
        let operator = decl.operator.clone().unwrap_or_else(|| OP_MATCHES.to_string());
        qualifier_type.kind.validate_condition(&decl.value, &operator)?;
        let priority = decl.priority.unwrap_or(qualifier.default_priority);

        let condition = Condition::new(qualifier_index, decl.value.clone(), Some(operator), priority)?;
        let key = condition.content_key();
        let idx = self.conditions.add(&key, condition)?;
        Ok(ConditionIndex(idx))
    }

    fn intern_condition_set(&mut self, decls: &[ConditionDeclaration]) -> Result<ConditionSetIndex> {
        let mut indexed = Vec::with_capacity(decls.len());
        for decl in decls {
            let idx = self.intern_condition(decl)?;
            let cond = self.conditions.get_at(idx.get()).expect("just interned").clone();
            indexed.push((idx, cond));
        }
        let lookup = condition_set::qualifier_lookup(&self.config.qualifiers);
        let ordered = condition_set::canonical_order(&indexed, lookup)?;
        let set = ConditionSet { condition_indices: ordered };
        let key = set.content_key(self.conditions.entries());
        let idx = self.condition_sets.add(&key, set)?;
        Ok(ConditionSetIndex(idx))
    }

    fn intern_candidate_value(&mut self, json: &Value) -> Result<CandidateValueIndex> {
        let value = CandidateValue(json.clone());
        let key = value.content_key();
        let idx = self.candidate_values.add(&key, value)?;
        Ok(CandidateValueIndex(idx))
    }

    /// Ingest one resource declaration: intern its conditions, condition
    /// sets, and candidate values, construct its decision, and register
    /// the resource. Fails fast on the first invalid entity; never
    /// partially applies a declaration.
    pub fn add_resource(&mut self, decl: ResourceDeclaration) -> Result<()> {
        if self.resource_ids.contains(&decl.id) {
            return Err(ResError::new(
                ErrorCode::DuplicateResourceId,
                format!("resource id '{}' already registered", decl.id),
            ));
        }
        let (resource_type_index, _) = self
            .config
            .resource_type_with_index(&decl.resource_type_name)
            .ok_or_else(|| {
                ResError::new(
                    ErrorCode::UnknownResourceType,
                    format!("unknown resource type '{}'", decl.resource_type_name),
                )
            })?;

        let mut candidates = Vec::with_capacity(decl.candidates.len());
        for candidate_decl in &decl.candidates {
            let condition_set_index = self.intern_condition_set(&candidate_decl.conditions)?;
            let value_index = self.intern_candidate_value(&candidate_decl.json)?;
            let declaration_index = self.declaration_counter;
            self.declaration_counter += 1;
            candidates.push(Candidate {
                condition_set_index,
                value_index,
                is_partial: candidate_decl.is_partial,
                merge_method: candidate_decl.merge_method,
                declaration_index,
            });
        }

        order_by_specificity(&mut candidates, self.condition_sets.entries(), self.conditions.entries());

        let concrete = ConcreteDecision { candidates };
        let abstract_shape = concrete.abstract_shape();
        let abstract_key = abstract_shape.content_key(self.condition_sets.entries(), self.conditions.entries());
        self.abstract_decisions.add(&abstract_key, abstract_shape)?;

        let decision_key = concrete.content_key(&abstract_key);
        let decision_idx = self.decisions.add(&decision_key, concrete)?;

        self.resource_ids.insert(decl.id.clone());
        self.resources.push(Resource {
            id: decl.id,
            resource_type_index,
            decision_index: crate::ids::DecisionIndex(decision_idx),
        });

        Ok(())
    }

    /// Freeze all collectors and emit an index-aligned [`CompiledCollection`].
    #[must_use]
    pub fn compile(self) -> CompiledCollection {
        CompiledCollection {
            qualifier_types: self.config.qualifier_types,
            qualifiers: self.config.qualifiers,
            resource_types: self.config.resource_types,
            conditions: self.conditions.into_entries(),
            condition_sets: self.condition_sets.into_entries(),
            decisions: self.decisions.into_entries(),
            resources: self.resources,
            candidate_values: self.candidate_values.into_entries(),
        }
    }
}

trait QualifierLookupExt<'a> {
    fn clone_tuple(self) -> (crate::ids::QualifierIndex, crate::qualifiers::Qualifier);
}

impl<'a> QualifierLookupExt<'a> for (crate::ids::QualifierIndex, &'a crate::qualifiers::Qualifier) {
    fn clone_tuple(self) -> (crate::ids::QualifierIndex, crate::qualifiers::Qualifier) {
        (self.0, self.1.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decl(id: &str, lang: &str, priority: Option<u32>, json_val: Value) -> ResourceDeclaration {
        ResourceDeclaration {
            id: id.into(),
            resource_type_name: "string".into(),
            candidates: vec![CandidateDeclaration {
                json: json_val,
                conditions: vec![ConditionDeclaration {
                    qualifier_name: "language".into(),
                    value: lang.into(),
                    operator: None,
                    priority,
                }],
                is_partial: false,
                merge_method: None,
            }],
        }
    }

    #[test]
    fn add_resource_interns_entities() {
        let mut builder = ResourceManagerBuilder::new(SystemConfiguration::default_profile());
        builder
            .add_resource(decl("app.title", "en", None, json!({"text": "Hello"})))
            .unwrap();
        let compiled = builder.compile();
        assert_eq!(compiled.resources.len(), 1);
        assert_eq!(compiled.conditions.len(), 1);
        assert_eq!(compiled.condition_sets.len(), 1);
        assert_eq!(compiled.candidate_values.len(), 1);
        assert_eq!(compiled.decisions.len(), 1);
    }

    #[test]
    fn duplicate_resource_id_rejected() {
        let mut builder = ResourceManagerBuilder::new(SystemConfiguration::default_profile());
        builder
            .add_resource(decl("app.title", "en", None, json!({"text": "Hello"})))
            .unwrap();
        let err = builder
            .add_resource(decl("app.title", "fr", None, json!({"text": "Bonjour"})))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateResourceId);
    }

    #[test]
    fn unknown_qualifier_rejected() {
        let mut builder = ResourceManagerBuilder::new(SystemConfiguration::default_profile());
        let bad = ResourceDeclaration {
            id: "x".into(),
            resource_type_name: "string".into(),
            candidates: vec![CandidateDeclaration {
                json: json!({}),
                conditions: vec![ConditionDeclaration {
                    qualifier_name: "nope".into(),
                    value: "v".into(),
                    operator: None,
                    priority: None,
                }],
                is_partial: false,
                merge_method: None,
            }],
        };
        let err = builder.add_resource(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownQualifier);
    }

    #[test]
    fn identical_candidate_values_are_deduplicated() {
        let mut builder = ResourceManagerBuilder::new(SystemConfiguration::default_profile());
        builder
            .add_resource(decl("a", "en", None, json!({"text": "Hello"})))
            .unwrap();
        builder
            .add_resource(decl("b", "fr", None, json!({"text": "Hello"})))
            .unwrap();
        let compiled = builder.compile();
        assert_eq!(compiled.candidate_values.len(), 1);
    }
}
