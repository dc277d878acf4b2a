//! Qualifier types: pluggable kinds that validate condition/context values
//! and score matches between them.
//!
//! The engine dispatches over qualifier type kind with a tagged enum
//! ([`QualifierTypeKind`]) rather than trait objects with inheritance —
//! each variant implements the same fixed method set via [`QualifierTypeBehavior`].
//! User-defined kinds register through [`QualifierTypeRegistry`].

use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Maximum match score: a perfect match.
pub const SCORE_PERFECT: u32 = 1000;
/// Minimum match score: no match at all.
pub const SCORE_NONE: u32 = 0;

/// The default, and currently only built-in, condition operator.
pub const OP_MATCHES: &str = "matches";

/// A condition operator token. `matches` is the universal default; other
/// operators are type-specific and must be advertised by the qualifier
/// type's `supported_operators`.
pub type ConditionOperator = String;

/// Behavior every qualifier type kind must implement.
pub trait QualifierTypeBehavior {
    /// Validate a condition value/operator pair at declaration time.
    fn validate_condition(&self, value: &str, operator: &str) -> Result<()>;

    /// Validate a context value supplied at resolution time. If
    /// `allow_context_list` is set, a comma-separated list is accepted iff
    /// every member validates individually.
    fn validate_context_value(&self, value: &str) -> Result<()>;

    /// Score a single condition against a context value under `operator`.
    /// Returns a value in `[SCORE_NONE, SCORE_PERFECT]`.
    fn match_one(&self, condition_value: &str, context_value: &str, operator: &str) -> u32;

    /// Whether this condition could ever match this context (`match_one` >
    /// `SCORE_NONE`), without actually invalid values scoring positive.
    fn is_potential_match(&self, condition_value: &str, context_value: &str, operator: &str) -> bool {
        if self.validate_condition(condition_value, operator).is_err() {
            return false;
        }
        if self.validate_context_value(context_value).is_err() {
            return false;
        }
        self.match_one(condition_value, context_value, operator) > SCORE_NONE
    }

    /// Whether a comma-separated context value list is accepted for this type.
    fn allow_context_list(&self) -> bool;

    /// The `systemType` tag recorded in bundle configuration.
    fn system_type(&self) -> &'static str;

    /// Opaque configuration blob round-tripped through bundle config.
    fn configuration_json(&self) -> Value;
}

/// Case-insensitive, whitespace-trimmed equality qualifier type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiteralQualifierType {
    /// Optional fixed set of allowed values; empty means any value is valid.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Whether a comma-separated context value list is accepted.
    #[serde(default)]
    pub allow_context_list: bool,
}

fn normalize_literal(s: &str) -> String {
    s.trim().to_lowercase()
}

impl QualifierTypeBehavior for LiteralQualifierType {
    fn validate_condition(&self, value: &str, operator: &str) -> Result<()> {
        if operator != OP_MATCHES {
            return Err(ResError::new(
                ErrorCode::InvalidConditionOperator,
                format!("literal qualifier type does not support operator '{operator}'"),
            ));
        }
        if value.trim().is_empty() {
            return Err(ResError::new(
                ErrorCode::InvalidConditionValue,
                "literal condition value must not be empty",
            ));
        }
        if !self.allowed_values.is_empty() {
            let norm = normalize_literal(value);
            if !self.allowed_values.iter().any(|v| normalize_literal(v) == norm) {
                return Err(ResError::new(
                    ErrorCode::InvalidConditionValue,
                    format!("'{value}' is not among the allowed literal values"),
                ));
            }
        }
        Ok(())
    }

    fn validate_context_value(&self, value: &str) -> Result<()> {
        if self.allow_context_list {
            for part in value.split(',') {
                if part.trim().is_empty() {
                    return Err(ResError::new(
                        ErrorCode::InvalidContextValue,
                        "empty member in literal context list",
                    ));
                }
            }
            Ok(())
        } else if value.trim().is_empty() {
            Err(ResError::new(
                ErrorCode::InvalidContextValue,
                "literal context value must not be empty",
            ))
        } else {
            Ok(())
        }
    }

    fn match_one(&self, condition_value: &str, context_value: &str, operator: &str) -> u32 {
        if operator != OP_MATCHES {
            return SCORE_NONE;
        }
        let cond = normalize_literal(condition_value);
        let members: Vec<String> = if self.allow_context_list {
            context_value.split(',').map(normalize_literal).collect()
        } else {
            vec![normalize_literal(context_value)]
        };
        if members.iter().any(|m| *m == cond) {
            SCORE_PERFECT
        } else {
            SCORE_NONE
        }
    }

    fn allow_context_list(&self) -> bool {
        self.allow_context_list
    }

    fn system_type(&self) -> &'static str {
        "literal"
    }

    fn configuration_json(&self) -> Value {
        serde_json::json!({
            "allowedValues": self.allowed_values,
            "allowContextList": self.allow_context_list,
        })
    }
}

/// Coarse-grained BCP-47 similarity tier, fixed by the engine and mapped
/// to the score curve documented on [`LanguageSimilarityProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityTier {
    /// Identical tags.
    Exact,
    /// One side's region is unspecified relative to the other (a neutral fallback).
    NeutralRegion,
    /// Same macro-region grouping of the language's scripts/regions.
    MacroRegion,
    /// Context region is explicitly preferred for the condition's language.
    PreferredRegion,
    /// Related but distinct language variants (e.g. dialects of a macrolanguage).
    Sibling,
    /// Similarity could not be determined from available data.
    Undetermined,
    /// Unrelated languages.
    Mismatch,
}

impl SimilarityTier {
    /// Fixed engine score curve: 1.0→1000, undetermined→750, neutral-region→900,
    /// macro-region→650, preferred-region→500, sibling→300, mismatch→0.
    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            Self::Exact => 1000,
            Self::Undetermined => 750,
            Self::NeutralRegion => 900,
            Self::MacroRegion => 650,
            Self::PreferredRegion => 500,
            Self::Sibling => 300,
            Self::Mismatch => 0,
        }
    }
}

/// External collaborator: BCP-47 language similarity scoring.
///
/// Out of scope per the engine's own spec — a real deployment would plug in
/// a full BCP-47-aware implementation. The naive default here is enough to
/// exercise the scoring curve and passes the documented scenarios.
pub trait LanguageSimilarityProvider {
    /// Classify the similarity between a condition's declared language tag
    /// and a context's supplied language tag.
    fn classify(&self, condition_tag: &str, context_tag: &str) -> SimilarityTier;
}

/// Naive tag-prefix similarity provider used when no richer collaborator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveLanguageSimilarity;

impl LanguageSimilarityProvider for NaiveLanguageSimilarity {
    fn classify(&self, condition_tag: &str, context_tag: &str) -> SimilarityTier {
        let cond = condition_tag.trim().to_lowercase();
        let ctx = context_tag.trim().to_lowercase();
        if cond.is_empty() || ctx.is_empty() {
            return SimilarityTier::Mismatch;
        }
        if cond == ctx {
            return SimilarityTier::Exact;
        }
        let cond_primary = cond.split(['-', '_']).next().unwrap_or(&cond);
        let ctx_primary = ctx.split(['-', '_']).next().unwrap_or(&ctx);
        if cond_primary != ctx_primary {
            return SimilarityTier::Mismatch;
        }
        // Same primary language, differing region/script subtags.
        let cond_has_region = cond.contains(['-', '_']);
        let ctx_has_region = ctx.contains(['-', '_']);
        if !cond_has_region || !ctx_has_region {
            SimilarityTier::NeutralRegion
        } else {
            SimilarityTier::Sibling
        }
    }
}

/// Language qualifier type, delegating to a [`LanguageSimilarityProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageQualifierType {
    #[serde(default)]
    allow_context_list: bool,
}

impl LanguageQualifierType {
    fn provider(&self) -> NaiveLanguageSimilarity {
        NaiveLanguageSimilarity
    }
}

impl QualifierTypeBehavior for LanguageQualifierType {
    fn validate_condition(&self, value: &str, operator: &str) -> Result<()> {
        if operator != OP_MATCHES {
            return Err(ResError::new(
                ErrorCode::InvalidConditionOperator,
                format!("language qualifier type does not support operator '{operator}'"),
            ));
        }
        if value.trim().is_empty() {
            return Err(ResError::new(
                ErrorCode::InvalidConditionValue,
                "language condition value must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_context_value(&self, value: &str) -> Result<()> {
        let members: Vec<&str> = if self.allow_context_list {
            value.split(',').collect()
        } else {
            vec![value]
        };
        for m in members {
            if m.trim().is_empty() {
                return Err(ResError::new(
                    ErrorCode::InvalidContextValue,
                    "language context value must not be empty",
                ));
            }
        }
        Ok(())
    }

    fn match_one(&self, condition_value: &str, context_value: &str, operator: &str) -> u32 {
        if operator != OP_MATCHES {
            return SCORE_NONE;
        }
        let provider = self.provider();
        let members: Vec<&str> = if self.allow_context_list {
            context_value.split(',').collect()
        } else {
            vec![context_value]
        };
        members
            .iter()
            .map(|m| provider.classify(condition_value, m).score())
            .max()
            .unwrap_or(SCORE_NONE)
    }

    fn allow_context_list(&self) -> bool {
        self.allow_context_list
    }

    fn system_type(&self) -> &'static str {
        "language"
    }

    fn configuration_json(&self) -> Value {
        serde_json::json!({ "allowContextList": self.allow_context_list })
    }
}

/// External collaborator: UN M.49 / CLDR-style region containment.
pub trait RegionContainmentProvider {
    /// Classify the containment relationship of `context_region` within
    /// `condition_region` (a macro-region code or a territory code).
    fn classify(&self, condition_region: &str, context_region: &str) -> ContainmentTier;
}

/// Containment tier for the territory qualifier type's score curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentTier {
    /// Identical region codes.
    Exact,
    /// Context region is a member of the condition's macro-region grouping.
    Contained,
    /// Context and condition share an immediate parent region but are not equal.
    SameParent,
    /// No containment relationship.
    None,
}

impl ContainmentTier {
    /// Fixed engine score curve: exact 1000, contained 650, same-parent 300, else 0.
    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            Self::Exact => 1000,
            Self::Contained => 650,
            Self::SameParent => 300,
            Self::None => 0,
        }
    }
}

/// A small, illustrative UN M.49 macro-region membership table. Region
/// `419` is "Latin America and the Caribbean"; membership here is enough
/// to exercise the containment scoring curve, not an exhaustive dataset.
const MACRO_REGION_419: &[&str] = &[
    "MX", "BR", "AR", "CO", "CL", "PE", "VE", "EC", "GT", "CU", "BO", "DO", "HN", "PY", "SV",
    "NI", "CR", "PA", "UY", "PR", "JM", "TT", "GY", "SR", "BZ", "HT",
];

/// Naive region containment provider covering the macro-regions the
/// built-in system configuration profiles exercise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveRegionContainment;

impl RegionContainmentProvider for NaiveRegionContainment {
    fn classify(&self, condition_region: &str, context_region: &str) -> ContainmentTier {
        let cond = condition_region.trim().to_uppercase();
        let ctx = context_region.trim().to_uppercase();
        if cond == ctx {
            return ContainmentTier::Exact;
        }
        if cond == "419" && MACRO_REGION_419.contains(&ctx.as_str()) {
            return ContainmentTier::Contained;
        }
        ContainmentTier::None
    }
}

/// Territory qualifier type, delegating to a [`RegionContainmentProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryQualifierType {
    #[serde(default)]
    allow_context_list: bool,
}

impl QualifierTypeBehavior for TerritoryQualifierType {
    fn validate_condition(&self, value: &str, operator: &str) -> Result<()> {
        if operator != OP_MATCHES {
            return Err(ResError::new(
                ErrorCode::InvalidConditionOperator,
                format!("territory qualifier type does not support operator '{operator}'"),
            ));
        }
        if value.trim().is_empty() {
            return Err(ResError::new(
                ErrorCode::InvalidConditionValue,
                "territory condition value must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_context_value(&self, value: &str) -> Result<()> {
        let members: Vec<&str> = if self.allow_context_list {
            value.split(',').collect()
        } else {
            vec![value]
        };
        for m in members {
            if m.trim().is_empty() {
                return Err(ResError::new(
                    ErrorCode::InvalidContextValue,
                    "territory context value must not be empty",
                ));
            }
        }
        Ok(())
    }

    fn match_one(&self, condition_value: &str, context_value: &str, operator: &str) -> u32 {
        if operator != OP_MATCHES {
            return SCORE_NONE;
        }
        let provider = NaiveRegionContainment;
        let members: Vec<&str> = if self.allow_context_list {
            context_value.split(',').collect()
        } else {
            vec![context_value]
        };
        members
            .iter()
            .map(|m| provider.classify(condition_value, m).score())
            .max()
            .unwrap_or(SCORE_NONE)
    }

    fn allow_context_list(&self) -> bool {
        self.allow_context_list
    }

    fn system_type(&self) -> &'static str {
        "territory"
    }

    fn configuration_json(&self) -> Value {
        serde_json::json!({ "allowContextList": self.allow_context_list })
    }
}

/// Tagged variant over the kinds of qualifier type the engine knows how to
/// dispatch, replacing the source's class-inheritance hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "systemType", rename_all = "camelCase")]
pub enum QualifierTypeKind {
    /// Case-insensitive equality matching.
    Literal(LiteralQualifierType),
    /// BCP-47-style language tag matching.
    Language(LanguageQualifierType),
    /// UN M.49 / CLDR-style territory matching.
    Territory(TerritoryQualifierType),
    /// A user-defined kind identified by name, carrying an opaque config blob.
    Custom {
        /// The registered system type name.
        name: String,
        /// Opaque configuration, round-tripped verbatim.
        configuration: Value,
    },
}

impl QualifierTypeBehavior for QualifierTypeKind {
    fn validate_condition(&self, value: &str, operator: &str) -> Result<()> {
        match self {
            Self::Literal(t) => t.validate_condition(value, operator),
            Self::Language(t) => t.validate_condition(value, operator),
            Self::Territory(t) => t.validate_condition(value, operator),
            Self::Custom { name, .. } => Err(ResError::new(
                ErrorCode::UnknownQualifierType,
                format!("custom qualifier type '{name}' has no registered behavior"),
            )),
        }
    }

    fn validate_context_value(&self, value: &str) -> Result<()> {
        match self {
            Self::Literal(t) => t.validate_context_value(value),
            Self::Language(t) => t.validate_context_value(value),
            Self::Territory(t) => t.validate_context_value(value),
            Self::Custom { name, .. } => Err(ResError::new(
                ErrorCode::UnknownQualifierType,
                format!("custom qualifier type '{name}' has no registered behavior"),
            )),
        }
    }

    fn match_one(&self, condition_value: &str, context_value: &str, operator: &str) -> u32 {
        match self {
            Self::Literal(t) => t.match_one(condition_value, context_value, operator),
            Self::Language(t) => t.match_one(condition_value, context_value, operator),
            Self::Territory(t) => t.match_one(condition_value, context_value, operator),
            Self::Custom { .. } => SCORE_NONE,
        }
    }

    fn allow_context_list(&self) -> bool {
        match self {
            Self::Literal(t) => t.allow_context_list(),
            Self::Language(t) => t.allow_context_list(),
            Self::Territory(t) => t.allow_context_list(),
            Self::Custom { .. } => false,
        }
    }

    fn system_type(&self) -> &'static str {
        match self {
            Self::Literal(t) => t.system_type(),
            Self::Language(t) => t.system_type(),
            Self::Territory(t) => t.system_type(),
            Self::Custom { .. } => "custom",
        }
    }

    fn configuration_json(&self) -> Value {
        match self {
            Self::Literal(t) => t.configuration_json(),
            Self::Language(t) => t.configuration_json(),
            Self::Territory(t) => t.configuration_json(),
            Self::Custom { configuration, .. } => configuration.clone(),
        }
    }
}

/// Maps a custom `systemType` tag to a constructor that builds live
/// behavior from the opaque configuration blob a [`QualifierTypeKind::Custom`]
/// carries. The built-in kinds (`literal`, `language`, `territory`) never go
/// through this registry; it exists solely so callers can plug in their own
/// kinds without the engine needing to know about them ahead of time.
#[derive(Default)]
pub struct QualifierTypeRegistry {
    constructors: HashMap<String, Box<dyn Fn(&Value) -> Result<Box<dyn QualifierTypeBehavior>> + Send + Sync>>,
}

impl QualifierTypeRegistry {
    /// An empty registry with no custom kinds registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a custom `systemType` name. Registering
    /// the same name twice replaces the previous constructor.
    pub fn register<F>(&mut self, system_type: impl Into<String>, constructor: F)
    where
        F: Fn(&Value) -> Result<Box<dyn QualifierTypeBehavior>> + Send + Sync + 'static,
    {
        self.constructors.insert(system_type.into(), Box::new(constructor));
    }

    /// Build the live behavior for a [`QualifierTypeKind::Custom`] tag,
    /// failing with [`ErrorCode::UnknownQualifierType`] if no constructor was
    /// registered under that name.
    pub fn construct(&self, system_type: &str, configuration: &Value) -> Result<Box<dyn QualifierTypeBehavior>> {
        let ctor = self.constructors.get(system_type).ok_or_else(|| {
            ResError::new(
                ErrorCode::UnknownQualifierType,
                format!("no constructor registered for custom qualifier type '{system_type}'"),
            )
        })?;
        ctor(configuration)
    }
}

/// A named qualifier type registered in a system configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QualifierType {
    /// Unique name within the owning system configuration.
    pub name: String,
    /// The behavior kind.
    pub kind: QualifierTypeKind,
}

impl QualifierType {
    /// Construct a named qualifier type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: QualifierTypeKind) -> Self {
        Self { name: name.into(), kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matches_case_insensitively() {
        let t = LiteralQualifierType::default();
        assert_eq!(t.match_one("Editor", "editor", OP_MATCHES), SCORE_PERFECT);
        assert_eq!(t.match_one("editor", "admin", OP_MATCHES), SCORE_NONE);
    }

    #[test]
    fn literal_context_list_matches_any_member() {
        let t = LiteralQualifierType {
            allow_context_list: true,
            ..Default::default()
        };
        assert_eq!(t.match_one("editor", "admin,editor", OP_MATCHES), SCORE_PERFECT);
        assert_eq!(t.match_one("viewer", "admin,editor", OP_MATCHES), SCORE_NONE);
    }

    #[test]
    fn language_exact_match_is_perfect() {
        let t = LanguageQualifierType::default();
        assert_eq!(t.match_one("en", "en", OP_MATCHES), 1000);
    }

    #[test]
    fn language_region_fallback_scores_positive() {
        let t = LanguageQualifierType::default();
        let score = t.match_one("en", "en-US", OP_MATCHES);
        assert!(score > 0, "expected positive fallback score, got {score}");
    }

    #[test]
    fn language_mismatch_scores_zero() {
        let t = LanguageQualifierType::default();
        assert_eq!(t.match_one("en", "de", OP_MATCHES), 0);
    }

    #[test]
    fn territory_macro_region_scores_650() {
        let t = TerritoryQualifierType::default();
        assert_eq!(t.match_one("419", "MX", OP_MATCHES), 650);
    }

    #[test]
    fn territory_outside_macro_region_scores_zero() {
        let t = TerritoryQualifierType::default();
        assert_eq!(t.match_one("419", "ES", OP_MATCHES), 0);
    }

    #[test]
    fn territory_exact_match_is_perfect() {
        let t = TerritoryQualifierType::default();
        assert_eq!(t.match_one("MX", "MX", OP_MATCHES), 1000);
    }

    #[test]
    fn is_potential_match_false_for_invalid_context() {
        let t = LiteralQualifierType::default();
        assert!(!t.is_potential_match("editor", "", OP_MATCHES));
    }

    #[test]
    fn unsupported_operator_rejected() {
        let t = LiteralQualifierType::default();
        assert!(t.validate_condition("editor", "contains").is_err());
    }

    #[test]
    fn custom_kind_reports_its_system_type_name() {
        let kind = QualifierTypeKind::Custom {
            name: "semver".into(),
            configuration: serde_json::json!({}),
        };
        assert_eq!(kind.system_type(), "custom");
    }

    #[test]
    fn registry_constructs_registered_custom_kind() {
        let mut registry = QualifierTypeRegistry::new();
        registry.register("semver", |_config| Ok(Box::new(LiteralQualifierType::default())));
        let behavior = registry.construct("semver", &serde_json::json!({})).unwrap();
        assert_eq!(behavior.system_type(), "literal");
    }

    #[test]
    fn registry_rejects_unregistered_custom_kind() {
        let registry = QualifierTypeRegistry::new();
        let err = registry.construct("semver", &serde_json::json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownQualifierType);
    }
}
