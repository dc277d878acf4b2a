//! The resolver: given a context and a resource id, selects the
//! highest-scoring candidate per the scoring and tie-break rules.

use crate::candidate::apply_merge;
use crate::compiled::CompiledCollection;
use crate::config::SystemConfiguration;
use crate::qualifier::QualifierTypeBehavior;
use rk_error::{ErrorCode, ResError, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A concrete context: qualifier name to supplied value (possibly a
/// comma-separated list when the qualifier's type allows it).
pub type Context = HashMap<String, String>;

/// Validate that every context key is a known qualifier and every value is
/// valid for that qualifier's type.
pub fn validate_context(config: &SystemConfiguration, context: &Context) -> Result<()> {
    for (qualifier_name, value) in context {
        let qualifier_type = config.qualifier_type_for(qualifier_name).map_err(|_| {
            ResError::new(
                ErrorCode::InvalidContext,
                format!("{qualifier_name}={value}: unknown qualifier"),
            )
        })?;
        qualifier_type
            .kind
            .validate_context_value(value)
            .map_err(|_| {
                ResError::new(
                    ErrorCode::InvalidContext,
                    format!("{qualifier_name}={value}: invalid context value"),
                )
            })?;
    }
    Ok(())
}

/// A candidate's per-condition `(priority, score)` pairs, sorted by
/// priority descending, used to compare specificity of an actual match.
fn score_vector(
    compiled: &CompiledCollection,
    condition_set_index: usize,
    context: &Context,
) -> Option<Vec<(u32, u32)>> {
    let set = &compiled.condition_sets[condition_set_index];
    let mut pairs = Vec::with_capacity(set.condition_indices.len());
    for idx in &set.condition_indices {
        let cond = &compiled.conditions[idx.get()];
        let qualifier = &compiled.qualifiers[cond.qualifier_index.get()];
        let qualifier_type = compiled
            .qualifier_types
            .iter()
            .find(|t| t.name == qualifier.type_name)?;
        let context_value = context.get(&qualifier.name)?;
        let score = qualifier_type
            .kind
            .match_one(&cond.value, context_value, &cond.operator);
        if score == 0 {
            return None;
        }
        pairs.push((cond.priority, score));
    }
    pairs.sort_by(|a, b| b.0.cmp(&a.0));
    Some(pairs)
}

/// Compare two score vectors for rank order: elementwise by descending
/// score, then descending priority, at each aligned position; if one
/// vector is a strict prefix of the other, the longer (more constrained)
/// vector ranks better.
fn compare_vectors(a: &[(u32, u32)], b: &[(u32, u32)]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.1.cmp(&y.1).then_with(|| x.0.cmp(&y.0)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

struct RankedCandidate<'a> {
    candidate: &'a crate::candidate::Candidate,
    vector: Vec<(u32, u32)>,
}

/// Rank matching candidates best-first: by score vector descending, tied
/// by original declaration index ascending.
fn rank_candidates<'a>(
    compiled: &'a CompiledCollection,
    decision: &'a crate::decision::ConcreteDecision,
    context: &Context,
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate> = decision
        .candidates
        .iter()
        .filter_map(|candidate| {
            score_vector(compiled, candidate.condition_set_index.get(), context)
                .map(|vector| RankedCandidate { candidate, vector })
        })
        .collect();

    ranked.sort_by(|a, b| {
        compare_vectors(&b.vector, &a.vector)
            .then_with(|| a.candidate.declaration_index.cmp(&b.candidate.declaration_index))
    });
    ranked
}

/// Fold leading partial candidates onto the first non-partial candidate
/// encountered in rank order, then return the resulting payload. Fails
/// with `no matching candidate` if every ranked candidate is partial (no
/// base to merge onto) or the ranked list is empty.
fn resolve_payload(
    compiled: &CompiledCollection,
    ranked: &[RankedCandidate<'_>],
) -> Result<Value> {
    let base_pos = ranked
        .iter()
        .position(|r| !r.candidate.is_partial)
        .ok_or_else(|| ResError::new(ErrorCode::NoMatchingCandidate, "no matching candidate"))?;

    let base = &ranked[base_pos];
    let base_value = compiled.candidate_values[base.candidate.value_index.get()].0.clone();

    let partials = &ranked[..base_pos];
    let merged = partials.iter().rev().fold(base_value, |acc, p| {
        let method = p.candidate.merge_method.unwrap_or(crate::candidate::MergeMethod::Augment);
        let patch = &compiled.candidate_values[p.candidate.value_index.get()].0;
        apply_merge(method, &acc, patch)
    });

    Ok(merged)
}

/// Resolve `resource_id` against `context`: validate the context, find the
/// resource's decision, rank and filter candidates, fold partials, and
/// return the resolved payload.
pub fn resolve(
    config: &SystemConfiguration,
    compiled: &CompiledCollection,
    resource_id: &str,
    context: &Context,
) -> Result<Value> {
    validate_context(config, context)?;

    let resource = compiled
        .resources
        .iter()
        .find(|r| r.id == resource_id)
        .ok_or_else(|| {
            ResError::new(
                ErrorCode::ResourceNotFound,
                format!("resource '{resource_id}' not found"),
            )
        })?;

    let decision = &compiled.decisions[resource.decision_index.get()];
    let ranked = rank_candidates(compiled, decision, context);
    resolve_payload(compiled, &ranked)
}
