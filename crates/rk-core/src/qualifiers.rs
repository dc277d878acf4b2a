//! Named qualifier instances bound to a [`QualifierType`](crate::qualifier::QualifierType).

use rk_error::{ErrorCode, ResError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum allowed priority value.
pub const MAX_PRIORITY: u32 = 1000;

/// A named axis of variation (e.g. `language`, `currentTerritory`), bound to
/// a qualifier type and carrying a default priority used for tie-breaking.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Qualifier {
    /// Unique name within the owning system configuration.
    pub name: String,
    /// Name of the [`QualifierType`](crate::qualifier::QualifierType) this qualifier is bound to.
    pub type_name: String,
    /// Default priority used when a condition omits an explicit one, in `[0, 1000]`.
    pub default_priority: u32,
    /// Optional short alias used in declarative token grammars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Whether `token` may be omitted in a token even when declared.
    #[serde(default)]
    pub token_is_optional: bool,
}

impl Qualifier {
    /// Construct a qualifier, validating the default priority range.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        default_priority: u32,
    ) -> Result<Self> {
        if default_priority > MAX_PRIORITY {
            return Err(ResError::new(
                ErrorCode::PriorityOutOfRange,
                format!("default priority {default_priority} exceeds {MAX_PRIORITY}"),
            ));
        }
        Ok(Self {
            name: name.into(),
            type_name: type_name.into(),
            default_priority,
            token: None,
            token_is_optional: false,
        })
    }

    /// Attach a token alias.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, optional: bool) -> Self {
        self.token = Some(token.into());
        self.token_is_optional = optional;
        self
    }
}
