//! System configuration: the set of qualifier types, qualifiers, and
//! resource types an engine instance recognizes, plus built-in profiles.

use crate::qualifier::{
    LanguageQualifierType, LiteralQualifierType, QualifierType, QualifierTypeKind,
    TerritoryQualifierType,
};
use crate::qualifiers::Qualifier;
use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A resource type recognized by a system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceType {
    /// Unique key identifying this resource type.
    pub key: String,
}

/// Enumerates the qualifier types, qualifiers, and resource types an engine
/// instance recognizes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfiguration {
    /// Registered qualifier types, by declaration order.
    pub qualifier_types: Vec<QualifierType>,
    /// Registered qualifiers, by declaration order.
    pub qualifiers: Vec<Qualifier>,
    /// Registered resource types, by declaration order.
    pub resource_types: Vec<ResourceType>,
}

impl SystemConfiguration {
    /// An empty configuration with no registered entities.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            qualifier_types: Vec::new(),
            qualifiers: Vec::new(),
            resource_types: Vec::new(),
        }
    }

    /// Find a qualifier type by name.
    #[must_use]
    pub fn qualifier_type(&self, name: &str) -> Option<&QualifierType> {
        self.qualifier_types.iter().find(|t| t.name == name)
    }

    /// Find a qualifier by name along with its dense index.
    #[must_use]
    pub fn qualifier_with_index(&self, name: &str) -> Option<(crate::ids::QualifierIndex, &Qualifier)> {
        self.qualifiers
            .iter()
            .enumerate()
            .find(|(_, q)| q.name == name)
            .map(|(i, q)| (crate::ids::QualifierIndex(i), q))
    }

    /// Find a resource type by key along with its dense index.
    #[must_use]
    pub fn resource_type_with_index(&self, key: &str) -> Option<(crate::ids::ResourceTypeIndex, &ResourceType)> {
        self.resource_types
            .iter()
            .enumerate()
            .find(|(_, t)| t.key == key)
            .map(|(i, t)| (crate::ids::ResourceTypeIndex(i), t))
    }

    /// Resolve the [`QualifierType`] a given qualifier name is bound to.
    pub fn qualifier_type_for(&self, qualifier_name: &str) -> Result<&QualifierType> {
        let (_, qualifier) = self.qualifier_with_index(qualifier_name).ok_or_else(|| {
            ResError::new(
                ErrorCode::UnknownQualifier,
                format!("unknown qualifier '{qualifier_name}'"),
            )
        })?;
        self.qualifier_type(&qualifier.type_name).ok_or_else(|| {
            ResError::new(
                ErrorCode::UnknownQualifierType,
                format!("unknown qualifier type '{}'", qualifier.type_name),
            )
        })
    }

    /// Override a qualifier's default priority by name, used when
    /// instantiating a built-in profile with caller-supplied overrides.
    pub fn with_default_priority(mut self, qualifier_name: &str, priority: u32) -> Result<Self> {
        let q = self
            .qualifiers
            .iter_mut()
            .find(|q| q.name == qualifier_name)
            .ok_or_else(|| {
                ResError::new(
                    ErrorCode::UnknownQualifier,
                    format!("unknown qualifier '{qualifier_name}'"),
                )
            })?;
        if priority > crate::qualifiers::MAX_PRIORITY {
            return Err(ResError::new(
                ErrorCode::PriorityOutOfRange,
                format!("priority {priority} exceeds {}", crate::qualifiers::MAX_PRIORITY),
            ));
        }
        q.default_priority = priority;
        Ok(self)
    }

    /// The `default` built-in profile: `language` and `currentTerritory`
    /// qualifiers over a single generic `string` resource type.
    #[must_use]
    pub fn default_profile() -> Self {
        Self {
            qualifier_types: vec![
                QualifierType::new("language", QualifierTypeKind::Language(LanguageQualifierType::default())),
                QualifierType::new(
                    "territory",
                    QualifierTypeKind::Territory(TerritoryQualifierType::default()),
                ),
                QualifierType::new("literal", QualifierTypeKind::Literal(LiteralQualifierType::default())),
            ],
            qualifiers: vec![
                Qualifier::new("language", "language", 900).expect("valid priority"),
                Qualifier::new("currentTerritory", "territory", 700).expect("valid priority"),
            ],
            resource_types: vec![ResourceType { key: "string".into() }],
        }
    }

    /// `language-priority`: like `default`, but `language` outranks `currentTerritory`
    /// by a wider margin, favoring language fallback over territory fallback.
    #[must_use]
    pub fn language_priority_profile() -> Self {
        let mut cfg = Self::default_profile();
        cfg = cfg
            .with_default_priority("language", 1000)
            .expect("built-in qualifier");
        cfg = cfg
            .with_default_priority("currentTerritory", 400)
            .expect("built-in qualifier");
        cfg
    }

    /// `territory-priority`: territory outranks language.
    #[must_use]
    pub fn territory_priority_profile() -> Self {
        let mut cfg = Self::default_profile();
        cfg = cfg
            .with_default_priority("language", 400)
            .expect("built-in qualifier");
        cfg = cfg
            .with_default_priority("currentTerritory", 1000)
            .expect("built-in qualifier");
        cfg
    }

    /// `extended-example`: adds a list-capable `role` literal qualifier and
    /// a second resource type, to exercise context-list matching.
    #[must_use]
    pub fn extended_example_profile() -> Self {
        let mut cfg = Self::default_profile();
        cfg.qualifier_types.push(QualifierType::new(
            "role",
            QualifierTypeKind::Literal(LiteralQualifierType {
                allowed_values: Vec::new(),
                allow_context_list: true,
            }),
        ));
        cfg.qualifiers
            .push(Qualifier::new("role", "role", 500).expect("valid priority"));
        cfg.resource_types.push(ResourceType { key: "asset".into() });
        cfg
    }

    /// Instantiate a built-in profile by name.
    pub fn profile(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default_profile()),
            "language-priority" => Ok(Self::language_priority_profile()),
            "territory-priority" => Ok(Self::territory_priority_profile()),
            "extended-example" => Ok(Self::extended_example_profile()),
            other => Err(ResError::new(
                ErrorCode::UnknownResourceType,
                format!("unknown system configuration profile '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_language_and_territory() {
        let cfg = SystemConfiguration::default_profile();
        assert!(cfg.qualifier_with_index("language").is_some());
        assert!(cfg.qualifier_with_index("currentTerritory").is_some());
    }

    #[test]
    fn language_priority_profile_outranks_territory() {
        let cfg = SystemConfiguration::language_priority_profile();
        let (_, lang) = cfg.qualifier_with_index("language").unwrap();
        let (_, terr) = cfg.qualifier_with_index("currentTerritory").unwrap();
        assert!(lang.default_priority > terr.default_priority);
    }

    #[test]
    fn territory_priority_profile_outranks_language() {
        let cfg = SystemConfiguration::territory_priority_profile();
        let (_, lang) = cfg.qualifier_with_index("language").unwrap();
        let (_, terr) = cfg.qualifier_with_index("currentTerritory").unwrap();
        assert!(terr.default_priority > lang.default_priority);
    }

    #[test]
    fn extended_example_adds_role_qualifier_with_context_list() {
        use crate::qualifier::QualifierTypeBehavior;
        let cfg = SystemConfiguration::extended_example_profile();
        let qt = cfg.qualifier_type("role").unwrap();
        assert!(qt.kind.allow_context_list());
    }

    #[test]
    fn unknown_profile_name_errors() {
        assert!(SystemConfiguration::profile("nonexistent").is_err());
    }

    #[test]
    fn override_rejects_out_of_range_priority() {
        let cfg = SystemConfiguration::default_profile();
        assert!(cfg.with_default_priority("language", 1001).is_err());
    }
}
