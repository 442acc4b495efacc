use thiserror::Error;

use crate::violation::{Violation, ViolationKind};

/// The schema document itself is broken or does not match the configuration.
///
/// These are defects in the schema artifact or in how it was loaded. They are
/// never the caller's input being wrong, so retrying cannot fix them.
#[derive(Error, Debug)]
pub enum SchemaConfigurationError {
    /// The configured root schema is not defined in the document
    #[error("root schema '{0}' is not defined in the schema document")]
    MissingRootSchema(String),

    /// No named-schema map exists at the configured pointer
    #[error("schema document has no schema map at '{0}'")]
    MissingSchemas(String),

    /// A `$ref` points outside the document
    #[error("external reference '{reference}' at {location} is not supported")]
    ExternalReference { reference: String, location: String },

    /// A `$ref` names a location the document does not contain
    #[error("unresolvable reference '{reference}' at {location}")]
    UnresolvedReference { reference: String, location: String },

    /// The validation engine rejected the root schema
    #[error("failed to compile schema '{schema}': {reason}")]
    CompileFailed { schema: String, reason: String },

    /// The document text is not valid YAML or JSON
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    /// The document could not be read from its source
    #[error("failed to load schema document: {0}")]
    LoadFailed(String),

    /// The document exceeds the configured size limit
    #[error("schema document too large ({size} bytes, limit {limit})")]
    DocumentTooLarge { size: u64, limit: usize },
}

impl From<serde_yaml::Error> for SchemaConfigurationError {
    fn from(error: serde_yaml::Error) -> Self {
        SchemaConfigurationError::InvalidDocument(error.to_string())
    }
}

impl From<serde_json::Error> for SchemaConfigurationError {
    fn from(error: serde_json::Error) -> Self {
        SchemaConfigurationError::InvalidDocument(error.to_string())
    }
}

impl From<std::io::Error> for SchemaConfigurationError {
    fn from(error: std::io::Error) -> Self {
        SchemaConfigurationError::LoadFailed(error.to_string())
    }
}

/// A candidate object does not conform to the root schema.
///
/// Always carries every violation found in a single pass, in the order the
/// engine reported them.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationFailed {
    message: String,
    violations: Vec<Violation>,
}

impl ValidationFailed {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        let details = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let message = format!(
            "validation of contact object failed with {} error(s): {details}",
            violations.len()
        );

        Self {
            message,
            violations,
        }
    }

    /// Summary of every violation, for logs and human diagnostics
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Violations of a single rule class
    pub fn find<'a>(&'a self, kind: &'a ViolationKind) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| &v.kind == kind)
    }
}

/// Either tier of failure, for callers that compile and validate in one step.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] SchemaConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationFailed),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Only a validation failure is an expected outcome the caller can act on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Error::Validation(failed) => failed.violations(),
            Error::Configuration(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn violation(kind: ViolationKind, path: &str) -> Violation {
        Violation {
            kind,
            message: "should have required property 'city'".to_string(),
            instance_path: path.to_string(),
            schema_path: "/properties/city".to_string(),
            params: json!({"missingProperty": "city"}),
        }
    }

    #[test]
    fn summary_lists_every_violation() {
        let failed = ValidationFailed::new(vec![
            violation(ViolationKind::Required, "/contactMechanisms/addresses/0"),
            violation(ViolationKind::Pattern, "/contactMechanisms/addresses/0/stateCode"),
        ]);

        assert_eq!(failed.len(), 2);
        assert!(failed.message().starts_with("validation of contact object failed with 2 error(s)"));
        assert!(failed.message().contains("contactMechanisms.addresses[0]"));
        assert!(failed.message().contains("contactMechanisms.addresses[0].stateCode"));
        assert_eq!(failed.to_string(), failed.message());
        assert_eq!(failed.find(&ViolationKind::Pattern).count(), 1);
    }

    #[test]
    fn only_validation_failures_are_recoverable() {
        let validation: Error =
            ValidationFailed::new(vec![violation(ViolationKind::Required, "")]).into();
        let configuration: Error =
            SchemaConfigurationError::MissingRootSchema("Contacts".to_string()).into();

        assert!(validation.is_recoverable());
        assert_eq!(validation.violations().len(), 1);
        assert!(!configuration.is_recoverable());
        assert!(configuration.violations().is_empty());
        assert_eq!(
            configuration.to_string(),
            "root schema 'Contacts' is not defined in the schema document"
        );
    }
}
