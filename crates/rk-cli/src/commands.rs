//! Shared command implementations for the Resolute CLI.
//!
//! These functions are library-level so they can be tested without
//! spawning the binary.

use crate::format::Style;
use anyhow::{Context, Result};
use chrono::Utc;
use rk_core::builder::{ResourceDeclaration, ResourceManagerBuilder};
use rk_core::bundle::{Bundle, BundleBuildOptions, BundleBuilder, BundleLoadOptions, BundleLoader};
use rk_core::config::SystemConfiguration;
use rk_core::resolver::Context as ResolveContext;
use std::path::Path;

/// Compile a declarative resource corpus into a checksum-sealed bundle and
/// write it to `output`.
#[allow(clippy::too_many_arguments)]
pub fn build(
    config: &str,
    input: &str,
    output: &str,
    normalize: bool,
    version: Option<String>,
    description: Option<String>,
    style: Style,
) -> Result<()> {
    let system_config =
        SystemConfiguration::profile(config).with_context(|| format!("load profile '{config}'"))?;

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("read resource declarations from '{input}'"))?;
    let declarations: Vec<ResourceDeclaration> = serde_json::from_str(&content)
        .with_context(|| format!("parse resource declarations from '{input}'"))?;

    let mut builder = ResourceManagerBuilder::new(system_config.clone());
    for decl in declarations {
        let id = decl.id.clone();
        builder
            .add_resource(decl)
            .with_context(|| format!("add resource '{id}'"))?;
    }
    let compiled = builder.compile();

    let bundle = BundleBuilder::build(
        system_config,
        compiled,
        BundleBuildOptions {
            normalize,
            version,
            description,
        },
        Utc::now(),
    );

    let rendered = style.render(&bundle)?;
    std::fs::write(output, rendered).with_context(|| format!("write bundle to '{output}'"))?;

    println!("{}", style.render(&serde_json::json!({
        "resourceCount": bundle.compiled_collection.resources.len(),
        "checksum": bundle.metadata.checksum,
    }))?);
    Ok(())
}

/// Parse `qualifier=value` context entries into a resolver [`ResolveContext`].
pub fn parse_context(entries: &[String]) -> Result<ResolveContext> {
    let mut context = ResolveContext::new();
    for entry in entries {
        let (qualifier, value) = entry
            .split_once('=')
            .with_context(|| format!("malformed context entry '{entry}' (expected qualifier=value)"))?;
        context.insert(qualifier.to_string(), value.to_string());
    }
    Ok(context)
}

fn load_bundle_file(path: &str) -> Result<Bundle> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read bundle from '{path}'"))?;
    serde_json::from_str(&content).with_context(|| format!("parse bundle from '{path}'"))
}

/// Resolve a resource id against a context, reading a previously built bundle.
pub fn resolve(
    bundle: &str,
    resource: &str,
    context: &[String],
    skip_checksum_verification: bool,
    style: Style,
) -> Result<()> {
    let bundle = load_bundle_file(bundle)?;
    let manager = BundleLoader::load(
        bundle,
        BundleLoadOptions {
            skip_checksum_verification,
        },
    )
    .map_err(|e| anyhow::anyhow!(e))
    .context("load bundle")?;

    let ctx = parse_context(context)?;
    let value = manager
        .resolve(resource, &ctx)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("resolve '{resource}'"))?;

    println!("{}", style.render(&value)?);
    Ok(())
}

/// Verify a bundle's integrity without resolving anything.
pub fn verify(bundle: &str, style: Style) -> Result<()> {
    let parsed = load_bundle_file(bundle)?;
    let checksum = parsed.metadata.checksum.clone();
    BundleLoader::load(parsed, BundleLoadOptions::default())
        .map_err(|e| anyhow::anyhow!(e))
        .context("verify bundle")?;

    println!(
        "{}",
        style.render(&serde_json::json!({
            "status": "ok",
            "checksum": checksum,
        }))?
    );
    Ok(())
}

/// Validate that a file at `path` contains a well-formed bundle (parses and
/// passes checksum verification), without requiring a resource id.
pub fn validate_bundle_file(path: &Path) -> Result<Bundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read bundle file '{}'", path.display()))?;
    let bundle: Bundle = serde_json::from_str(&content)
        .with_context(|| format!("parse bundle from '{}'", path.display()))?;
    BundleLoader::load(bundle.clone(), BundleLoadOptions::default())
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("verify bundle '{}'", path.display()))?;
    Ok(bundle)
}
