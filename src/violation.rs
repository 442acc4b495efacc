use std::fmt;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{instrument, trace};

use crate::json_pointer;

/// The rule class a violation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    Required,
    AdditionalProperties,
    MaxLength,
    MinLength,
    Pattern,
    /// The value matched none of the alternatives of a union
    AnyOf,
    /// Any other keyword, named as it appears in the schema
    Other(String),
}

impl ViolationKind {
    /// The schema keyword that produced the violation
    pub fn keyword(&self) -> &str {
        match self {
            ViolationKind::Required => "required",
            ViolationKind::AdditionalProperties => "additionalProperties",
            ViolationKind::MaxLength => "maxLength",
            ViolationKind::MinLength => "minLength",
            ViolationKind::Pattern => "pattern",
            ViolationKind::AnyOf => "anyOf",
            ViolationKind::Other(keyword) => keyword,
        }
    }
}

/// One way a candidate object fails to conform to the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    /// Human-readable description of the broken rule
    pub message: String,
    /// JSON pointer to the offending value in the candidate object
    pub instance_path: String,
    /// Keyword location within the compiled schema
    pub schema_path: String,
    /// Rule-specific detail, always a JSON object
    pub params: Value,
}

impl Violation {
    /// Dotted rendering of `instance_path`, e.g. `contactMechanisms.addresses[0]`
    pub fn location(&self) -> String {
        json_pointer::to_location(&self.instance_path)
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.location(), self.message)
        }
    }
}

/// Translates one engine error into violations.
///
/// A closed object with several undeclared properties yields one violation per property.
#[instrument(level = "trace", skip(error), fields(instance_path = %error.instance_path()))]
pub(crate) fn from_error(error: &jsonschema::ValidationError<'_>) -> Vec<Violation> {
    let instance_path = error.instance_path().as_str().to_string();
    let schema_path = error.schema_path().as_str().to_string();

    let violation = |kind: ViolationKind, message: String, params: Value| Violation {
        kind,
        message,
        instance_path: instance_path.clone(),
        schema_path: schema_path.clone(),
        params,
    };

    let violations = match error.kind() {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| property.to_string());
            vec![violation(
                ViolationKind::Required,
                format!("should have required property '{name}'"),
                json!({ "missingProperty": name }),
            )]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|name| {
                violation(
                    ViolationKind::AdditionalProperties,
                    "should NOT have additional properties".to_string(),
                    json!({ "additionalProperty": name }),
                )
            })
            .collect(),
        ValidationErrorKind::MaxLength { limit } => vec![violation(
            ViolationKind::MaxLength,
            format!("should NOT be longer than {limit} characters"),
            json!({ "limit": limit }),
        )],
        ValidationErrorKind::MinLength { limit } => vec![violation(
            ViolationKind::MinLength,
            format!("should NOT be shorter than {limit} characters"),
            json!({ "limit": limit }),
        )],
        ValidationErrorKind::Pattern { pattern } => vec![violation(
            ViolationKind::Pattern,
            format!("should match pattern \"{pattern}\""),
            json!({ "pattern": pattern }),
        )],
        // the alternatives' own errors stay inside the engine error
        ValidationErrorKind::AnyOf { .. } => vec![violation(
            ViolationKind::AnyOf,
            "should match some schema in anyOf".to_string(),
            json!({}),
        )],
        _ => vec![violation(
            ViolationKind::Other(keyword_of(&schema_path)),
            error.to_string(),
            json!({}),
        )],
    };

    trace!(count = violations.len(), "Translated engine error");
    violations
}

/// Last non-index token of a keyword location.
fn keyword_of(schema_path: &str) -> String {
    json_pointer::tokens(schema_path)
        .filter(|token| !token.bytes().all(|b| b.is_ascii_digit()))
        .last()
        .unwrap_or_default()
}
