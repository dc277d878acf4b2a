//! Declarative token grammars: compact string forms for conditions,
//! condition sets, and contexts, as an alternative to full JSON declarations.
//!
//! - Condition token: `<qualifier>=<value>` or (anonymous) `<value>`.
//! - Condition set token: conditions joined by `,`.
//! - Context qualifier token: `<qualifier>=<value>` or `<value>`.
//! - Context token: qualifier tokens joined by `|`.
//! - Qualifier default value token: `<qualifier>=<value>`; defaults joined by `|`.
//!
//! All tokens are case-sensitive on qualifier names; values are normalized
//! by the qualifier type, not by the tokenizer.

use rk_error::{ErrorCode, ResError, Result};

/// One parsed `<qualifier>=<value>` or anonymous `<value>` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionToken {
    /// The qualifier name, or `None` for an anonymous token.
    pub qualifier: Option<String>,
    /// The token's value.
    pub value: String,
}

fn parse_single_token(raw: &str) -> Result<ConditionToken> {
    if raw.is_empty() {
        return Err(ResError::new(ErrorCode::MalformedToken, "empty token"));
    }
    match raw.split_once('=') {
        Some((qualifier, value)) => {
            if qualifier.is_empty() || value.is_empty() {
                return Err(ResError::new(
                    ErrorCode::MalformedToken,
                    format!("malformed token '{raw}'"),
                ));
            }
            Ok(ConditionToken {
                qualifier: Some(qualifier.to_string()),
                value: value.to_string(),
            })
        }
        None => Ok(ConditionToken {
            qualifier: None,
            value: raw.to_string(),
        }),
    }
}

/// Resolve an anonymous token's qualifier name against `default_qualifier`,
/// failing if the token is anonymous and no default was supplied.
fn resolve_qualifier(token: ConditionToken, default_qualifier: Option<&str>) -> Result<(String, String)> {
    match token.qualifier {
        Some(q) => Ok((q, token.value)),
        None => default_qualifier
            .map(|q| (q.to_string(), token.value.clone()))
            .ok_or_else(|| {
                ResError::new(
                    ErrorCode::MalformedToken,
                    format!("anonymous token '{}' has no default qualifier", token.value),
                )
            }),
    }
}

/// Parse a condition set token: conditions joined by `,`.
pub fn parse_condition_set_token(
    token: &str,
    default_qualifier: Option<&str>,
) -> Result<Vec<(String, String)>> {
    token
        .split(',')
        .map(|part| parse_single_token(part).and_then(|t| resolve_qualifier(t, default_qualifier)))
        .collect()
}

/// Parse a context token: qualifier tokens joined by `|`.
pub fn parse_context_token(
    token: &str,
    default_qualifier: Option<&str>,
) -> Result<Vec<(String, String)>> {
    token
        .split('|')
        .map(|part| parse_single_token(part).and_then(|t| resolve_qualifier(t, default_qualifier)))
        .collect()
}

/// Parse a qualifier default-value token: `<qualifier>=<value>` entries
/// joined by `|`; anonymous entries are rejected (defaults must name their qualifier).
pub fn parse_qualifier_defaults_token(token: &str) -> Result<Vec<(String, String)>> {
    token
        .split('|')
        .map(|part| {
            let parsed = parse_single_token(part)?;
            resolve_qualifier(parsed, None)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_condition_token() {
        let t = parse_single_token("language=en").unwrap();
        assert_eq!(t.qualifier.as_deref(), Some("language"));
        assert_eq!(t.value, "en");
    }

    #[test]
    fn parses_anonymous_condition_token() {
        let t = parse_single_token("en").unwrap();
        assert_eq!(t.qualifier, None);
        assert_eq!(t.value, "en");
    }

    #[test]
    fn rejects_empty_token() {
        assert!(parse_single_token("").is_err());
    }

    #[test]
    fn rejects_malformed_equals_token() {
        assert!(parse_single_token("=en").is_err());
        assert!(parse_single_token("language=").is_err());
    }

    #[test]
    fn condition_set_token_splits_on_comma() {
        let parsed = parse_condition_set_token("language=en,currentTerritory=US", None).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("language".to_string(), "en".to_string()),
                ("currentTerritory".to_string(), "US".to_string())
            ]
        );
    }

    #[test]
    fn context_token_splits_on_pipe() {
        let parsed = parse_context_token("language=en|currentTerritory=US", None).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn anonymous_token_resolves_against_default_qualifier() {
        let parsed = parse_context_token("en", Some("language")).unwrap();
        assert_eq!(parsed, vec![("language".to_string(), "en".to_string())]);
    }

    #[test]
    fn anonymous_token_without_default_fails() {
        assert!(parse_context_token("en", None).is_err());
    }

    #[test]
    fn qualifier_defaults_token_rejects_anonymous_entries() {
        assert!(parse_qualifier_defaults_token("en").is_err());
        assert!(parse_qualifier_defaults_token("language=en|currentTerritory=US").is_ok());
    }
}
