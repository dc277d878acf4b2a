//! Unified error taxonomy with stable error codes for the Resolute resource
//! resolution engine.
//!
//! Every Resolute error carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause chain, and
//! arbitrary key-value context. Use the builder returned by [`ResError::new`]
//! to construct errors fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
///
/// These map directly onto the failure classes the resolution engine
/// distinguishes: malformed input, interning conflicts, tampered bundles, and
/// failed lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed tokens, unknown qualifiers/types, invalid values, out-of-range priorities.
    Validation,
    /// Key collisions with differing shape (re-adding an entity under the same key).
    Structural,
    /// Bundle checksum mismatch or config/compiled-collection mismatch.
    Integrity,
    /// Resource not found, or no candidate matched the context.
    Resolution,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Structural => "structural",
            Self::Integrity => "integrity",
            Self::Resolution => "resolution",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Validation --
    /// A declarative token could not be parsed.
    MalformedToken,
    /// The qualifier name is not known to the active system configuration.
    UnknownQualifier,
    /// The qualifier type name is not known to the active system configuration.
    UnknownQualifierType,
    /// The resource type name is not known to the active system configuration.
    UnknownResourceType,
    /// A condition value failed its qualifier type's validation.
    InvalidConditionValue,
    /// A context value failed its qualifier type's validation.
    InvalidContextValue,
    /// The condition operator is not supported by the qualifier type.
    InvalidConditionOperator,
    /// The same qualifier appears more than once in a condition set.
    DuplicateQualifierInSet,
    /// A priority value fell outside `[0, 1000]`.
    PriorityOutOfRange,

    // -- Structural --
    /// An entity was re-added under an existing key with a different shape.
    KeyShapeConflict,
    /// A resource id was registered more than once.
    DuplicateResourceId,

    // -- Integrity --
    /// The bundle's recomputed checksum does not match `metadata.checksum`.
    ChecksumMismatch,
    /// The `config` section and `compiledCollection` section disagree structurally.
    ConfigCollectionMismatch,
    /// The bundle could not be parsed as structurally valid.
    MalformedBundle,

    // -- Resolution --
    /// The requested resource id does not exist.
    ResourceNotFound,
    /// No candidate in the resource's decision matched the supplied context.
    NoMatchingCandidate,
    /// The supplied context failed validation against the system configuration.
    InvalidContext,

    // -- Internal --
    /// Catch-all for unexpected internal errors (e.g. serialization failure).
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedToken
            | Self::UnknownQualifier
            | Self::UnknownQualifierType
            | Self::UnknownResourceType
            | Self::InvalidConditionValue
            | Self::InvalidContextValue
            | Self::InvalidConditionOperator
            | Self::DuplicateQualifierInSet
            | Self::PriorityOutOfRange => ErrorCategory::Validation,

            Self::KeyShapeConflict | Self::DuplicateResourceId => ErrorCategory::Structural,

            Self::ChecksumMismatch | Self::ConfigCollectionMismatch | Self::MalformedBundle => {
                ErrorCategory::Integrity
            }

            Self::ResourceNotFound | Self::NoMatchingCandidate | Self::InvalidContext => {
                ErrorCategory::Resolution
            }

            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation of the code (e.g.
    /// `"RESOURCE_NOT_FOUND"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::UnknownQualifier => "UNKNOWN_QUALIFIER",
            Self::UnknownQualifierType => "UNKNOWN_QUALIFIER_TYPE",
            Self::UnknownResourceType => "UNKNOWN_RESOURCE_TYPE",
            Self::InvalidConditionValue => "INVALID_CONDITION_VALUE",
            Self::InvalidContextValue => "INVALID_CONTEXT_VALUE",
            Self::InvalidConditionOperator => "INVALID_CONDITION_OPERATOR",
            Self::DuplicateQualifierInSet => "DUPLICATE_QUALIFIER_IN_SET",
            Self::PriorityOutOfRange => "PRIORITY_OUT_OF_RANGE",
            Self::KeyShapeConflict => "KEY_SHAPE_CONFLICT",
            Self::DuplicateResourceId => "DUPLICATE_RESOURCE_ID",
            Self::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Self::ConfigCollectionMismatch => "CONFIG_COLLECTION_MISMATCH",
            Self::MalformedBundle => "MALFORMED_BUNDLE",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::NoMatchingCandidate => "NO_MATCHING_CANDIDATE",
            Self::InvalidContext => "INVALID_CONTEXT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResError
// ---------------------------------------------------------------------------

/// Unified Resolute error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use rk_error::{ResError, ErrorCode};
///
/// let err = ResError::new(ErrorCode::InvalidContextValue, "homeTerritory=xx: invalid context value")
///     .with_context("qualifier", "homeTerritory")
///     .with_context("value", "xx");
/// ```
pub struct ResError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl ResError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for ResError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ResError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for ResError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ResError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`ResError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ResErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&ResError> for ResErrorDto {
    fn from(err: &ResError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<ResErrorDto> for ResError {
    fn from(dto: ResErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            source: None,
            context: dto.context,
        }
    }
}

/// Convenience alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, ResError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
