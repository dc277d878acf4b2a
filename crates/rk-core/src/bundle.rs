//! Bundle builder and loader: serializes a compiled collection plus its
//! configuration and a checksum into a portable, verifiable bundle.

use crate::compiled::CompiledCollection;
use crate::config::SystemConfiguration;
use crate::hash::default_hash;
use crate::manager::ResourceManager;
use crate::normalize::normalize;
use chrono::{DateTime, Utc};
use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bundle metadata: build timestamp, integrity checksum, and optional
/// caller-supplied version/description tags.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// UTC timestamp the bundle was built.
    pub date_built: DateTime<Utc>,
    /// Hex checksum of `compiledCollection` under the declared normalizer.
    pub checksum: String,
    /// Optional caller-supplied version tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional caller-supplied description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A serialized, checksummed, portable compiled collection plus configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Build metadata and integrity checksum.
    pub metadata: BundleMetadata,
    /// The system configuration the compiled collection was built against.
    pub config: SystemConfiguration,
    /// The frozen compiled collection.
    pub compiled_collection: CompiledCollection,
}

/// Options controlling how a bundle is built.
#[derive(Debug, Clone, Default)]
pub struct BundleBuildOptions {
    /// Whether to run the normalization pass before checksumming, making
    /// the checksum insensitive to the order source declarations were built in.
    pub normalize: bool,
    /// Optional version tag recorded in metadata.
    pub version: Option<String>,
    /// Optional description recorded in metadata.
    pub description: Option<String>,
}

/// Builds a [`Bundle`] from a compiled collection and its configuration.
pub struct BundleBuilder;

impl BundleBuilder {
    /// Build a bundle, computing `checksum = hash(compiledCollection)` over
    /// the (optionally normalized) collection, stamped with `date_built`.
    #[must_use]
    pub fn build(
        config: SystemConfiguration,
        compiled: CompiledCollection,
        options: BundleBuildOptions,
        date_built: DateTime<Utc>,
    ) -> Bundle {
        let compiled = if options.normalize {
            normalize(compiled)
        } else {
            compiled
        };
        let checksum = checksum_of(&compiled);
        Bundle {
            metadata: BundleMetadata {
                date_built,
                checksum,
                version: options.version,
                description: options.description,
            },
            config,
            compiled_collection: compiled,
        }
    }
}

/// Compute the content hash of a compiled collection's canonical JSON form.
#[must_use]
pub fn checksum_of(compiled: &CompiledCollection) -> String {
    let value = serde_json::to_value(compiled).expect("compiled collection always serializes");
    default_hash(&value)
}

/// Options controlling bundle load-time integrity verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleLoadOptions {
    /// Skip recomputing and comparing the checksum. Use only for
    /// diagnostics — never for bundles from an untrusted source.
    pub skip_checksum_verification: bool,
}

/// Loads bundles into read-only [`ResourceManager`]s, verifying integrity.
pub struct BundleLoader;

impl BundleLoader {
    /// Parse, verify, and instantiate a resource manager from a bundle.
    ///
    /// Recomputes the checksum over `compiledCollection`; if it disagrees
    /// with `metadata.checksum`, fails with
    /// [`ErrorCode::ChecksumMismatch`] unless `skip_checksum_verification`
    /// is set.
    pub fn load(bundle: Bundle, options: BundleLoadOptions) -> Result<ResourceManager> {
        if !options.skip_checksum_verification {
            let recomputed = checksum_of(&bundle.compiled_collection);
            if recomputed != bundle.metadata.checksum {
                return Err(ResError::new(
                    ErrorCode::ChecksumMismatch,
                    "integrity verification failed",
                )
                .with_context("expected", bundle.metadata.checksum.clone())
                .with_context("actual", recomputed));
            }
        }

        validate_config_matches_collection(&bundle.config, &bundle.compiled_collection)?;

        Ok(ResourceManager::new(bundle.config, bundle.compiled_collection))
    }

    /// Parse a bundle from its JSON wire form, then load it.
    pub fn load_json(json: &serde_json::Value, options: BundleLoadOptions) -> Result<ResourceManager> {
        let bundle: Bundle = serde_json::from_value(json.clone()).map_err(|e| {
            ResError::new(ErrorCode::MalformedBundle, format!("malformed bundle: {e}")).with_source(e)
        })?;
        Self::load(bundle, options)
    }
}

/// Structural cross-check between `config` and `compiledCollection`: every
/// qualifier/qualifier-type/resource-type name the collection references
/// by index must exist in `config`, and the two must agree on counts.
fn validate_config_matches_collection(
    config: &SystemConfiguration,
    compiled: &CompiledCollection,
) -> Result<()> {
    if config.qualifier_types.len() != compiled.qualifier_types.len()
        || config.qualifiers.len() != compiled.qualifiers.len()
        || config.resource_types.len() != compiled.resource_types.len()
    {
        return Err(ResError::new(
            ErrorCode::ConfigCollectionMismatch,
            "config and compiledCollection disagree on entity counts",
        ));
    }
    for condition in &compiled.conditions {
        if condition.qualifier_index.get() >= compiled.qualifiers.len() {
            return Err(ResError::new(
                ErrorCode::ConfigCollectionMismatch,
                "condition references an out-of-range qualifier index",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CandidateDeclaration, ConditionDeclaration, ResourceDeclaration, ResourceManagerBuilder};
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_bundle(normalize: bool) -> Bundle {
        let config = SystemConfiguration::default_profile();
        let mut builder = ResourceManagerBuilder::new(config.clone());
        builder
            .add_resource(ResourceDeclaration {
                id: "app.title".into(),
                resource_type_name: "string".into(),
                candidates: vec![CandidateDeclaration {
                    json: json!({"text": "Hello"}),
                    conditions: vec![ConditionDeclaration {
                        qualifier_name: "language".into(),
                        value: "en".into(),
                        operator: None,
                        priority: None,
                    }],
                    is_partial: false,
                    merge_method: None,
                }],
            })
            .unwrap();
        let compiled = builder.compile();
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        BundleBuilder::build(
            config,
            compiled,
            BundleBuildOptions {
                normalize,
                version: Some("1.0.0".into()),
                description: None,
            },
            date,
        )
    }

    #[test]
    fn roundtrip_load_resolves_same_as_build() {
        let bundle = sample_bundle(true);
        let manager = BundleLoader::load(bundle, BundleLoadOptions::default()).unwrap();
        let mut ctx = std::collections::HashMap::new();
        ctx.insert("language".to_string(), "en".to_string());
        assert_eq!(manager.resolve("app.title", &ctx).unwrap(), json!({"text": "Hello"}));
    }

    #[test]
    fn s5_mutated_bundle_fails_checksum_unless_skipped() {
        let mut bundle = sample_bundle(true);
        bundle.compiled_collection.resources[0].id = "tampered".into();

        let err = BundleLoader::load(bundle.clone(), BundleLoadOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChecksumMismatch);

        let manager = BundleLoader::load(
            bundle,
            BundleLoadOptions {
                skip_checksum_verification: true,
            },
        )
        .unwrap();
        assert!(manager.has_resource("tampered"));
    }

    #[test]
    fn determinism_same_declarations_normalized_twice_match() {
        let a = sample_bundle(true);
        let b = sample_bundle(true);
        assert_eq!(a.metadata.checksum, b.metadata.checksum);
    }

    #[test]
    fn json_roundtrip_preserves_checksum() {
        let bundle = sample_bundle(true);
        let json = serde_json::to_value(&bundle).unwrap();
        let manager = BundleLoader::load_json(&json, BundleLoadOptions::default()).unwrap();
        assert!(manager.has_resource("app.title"));
    }
}
