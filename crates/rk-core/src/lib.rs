//! A conditional resource resolution engine with compiled,
//! content-addressed bundles.
//!
//! Applications declare many candidate values for a logical resource, each
//! guarded by a *condition set* over named *qualifiers* (language,
//! territory, arbitrary literals). At build time, [`builder`] compiles a
//! declarative corpus into a normalized, deduplicated, checksum-sealed
//! [`bundle`]. At run time, [`resolver`] selects the best candidate per
//! resource for a given *context* using a scored matching protocol with
//! deterministic tie-breaking.
//!
//! # Example
//!
//! ```
//! use rk_core::builder::{CandidateDeclaration, ConditionDeclaration, ResourceDeclaration, ResourceManagerBuilder};
//! use rk_core::config::SystemConfiguration;
//! use rk_core::manager::ResourceManager;
//! use std::collections::HashMap;
//!
//! let config = SystemConfiguration::default_profile();
//! let mut builder = ResourceManagerBuilder::new(config.clone());
//! builder
//!     .add_resource(ResourceDeclaration {
//!         id: "app.title".into(),
//!         resource_type_name: "string".into(),
//!         candidates: vec![CandidateDeclaration {
//!             json: serde_json::json!({"text": "Hello"}),
//!             conditions: vec![ConditionDeclaration {
//!                 qualifier_name: "language".into(),
//!                 value: "en".into(),
//!                 operator: None,
//!                 priority: None,
//!             }],
//!             is_partial: false,
//!             merge_method: None,
//!         }],
//!     })
//!     .unwrap();
//!
//! let manager = ResourceManager::new(config, builder.compile());
//! let mut ctx = HashMap::new();
//! ctx.insert("language".to_string(), "en".to_string());
//! assert_eq!(manager.resolve("app.title", &ctx).unwrap(), serde_json::json!({"text": "Hello"}));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod bundle;
pub mod candidate;
pub mod collector;
pub mod compiled;
pub mod condition;
pub mod condition_set;
pub mod config;
pub mod decision;
pub mod hash;
pub mod hierarchy;
pub mod ids;
pub mod manager;
pub mod normalize;
pub mod qualifier;
pub mod qualifiers;
pub mod resolver;
pub mod resource;
pub mod token;
