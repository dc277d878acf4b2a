//! Read-only resource manager produced by the builder (via [`crate::builder::ResourceManagerBuilder::compile`])
//! or the bundle loader (via [`crate::bundle::BundleLoader::load`]).

use crate::compiled::CompiledCollection;
use crate::config::SystemConfiguration;
use crate::resolver::{self, Context};
use rk_error::Result;
use serde_json::Value;

/// An immutable, freely shareable compiled resource collection plus its
/// configuration. All resolver operations are pure functions over this
/// state and may be called concurrently without locking.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    config: SystemConfiguration,
    compiled: CompiledCollection,
}

impl ResourceManager {
    /// Wrap a compiled collection and its configuration.
    #[must_use]
    pub fn new(config: SystemConfiguration, compiled: CompiledCollection) -> Self {
        Self { config, compiled }
    }

    /// The system configuration this manager was built with.
    #[must_use]
    pub fn config(&self) -> &SystemConfiguration {
        &self.config
    }

    /// The compiled collection this manager serves.
    #[must_use]
    pub fn compiled(&self) -> &CompiledCollection {
        &self.compiled
    }

    /// Whether a resource with this id is registered.
    #[must_use]
    pub fn has_resource(&self, resource_id: &str) -> bool {
        self.compiled.resources.iter().any(|r| r.id == resource_id)
    }

    /// Resolve `resource_id` against `context`.
    pub fn resolve(&self, resource_id: &str, context: &Context) -> Result<Value> {
        resolver::resolve(&self.config, &self.compiled, resource_id, context)
    }
}
