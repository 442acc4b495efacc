use std::fmt;

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::ValidatorConfig;
use crate::document::SchemaDocument;
use crate::error::{SchemaConfigurationError, ValidationFailed};
use crate::references;
use crate::violation::{self, Violation};

/// Checks contact objects against the root schema of a schema document.
///
/// The root schema is compiled once, with every named schema of the
/// document registered so references between them resolve. A compiled
/// validator holds no per-call state and can be shared across threads.
pub struct ContactSchemaValidator {
    validator: Validator,
    root_schema: String,
}

impl ContactSchemaValidator {
    /// Compiles `config.root_schema` from `document`.
    ///
    /// Fails without checking anything if the root schema is missing, if any
    /// reference in the document does not resolve, or if the engine rejects
    /// the schema.
    #[instrument(skip(document, config), fields(root = %config.root_schema))]
    pub fn new(
        document: &SchemaDocument,
        config: ValidatorConfig,
    ) -> Result<Self, SchemaConfigurationError> {
        if !document.contains(&config.root_schema) {
            warn!("Root schema missing from schema document");
            return Err(SchemaConfigurationError::MissingRootSchema(config.root_schema));
        }

        let reference_count = references::audit(document)?;
        trace!(reference_count, "Compiling root schema");

        let schema = document.compilation_root(&config.root_schema);
        let validator = jsonschema::options()
            .with_draft(config.draft)
            .build(&schema)
            .map_err(|err| SchemaConfigurationError::CompileFailed {
                schema: config.root_schema.clone(),
                reason: err.to_string(),
            })?;

        debug!("Root schema compiled");

        Ok(Self {
            validator,
            root_schema: config.root_schema,
        })
    }

    /// Compiles the `Contacts` schema with the default config.
    pub fn with_defaults(document: &SchemaDocument) -> Result<Self, SchemaConfigurationError> {
        Self::new(document, ValidatorConfig::default())
    }

    /// Checks `candidate`, reporting every violation found rather than the first.
    #[instrument(skip(self, candidate), fields(root = %self.root_schema))]
    pub fn validate(&self, candidate: &Value) -> Result<(), ValidationFailed> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(candidate)
            .flat_map(|error| violation::from_error(&error))
            .collect();

        if violations.is_empty() {
            info!("Contact object passed validation");
            return Ok(());
        }

        warn!(
            violation_count = violations.len(),
            "Contact object failed validation"
        );
        Err(ValidationFailed::new(violations))
    }

    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.validator.is_valid(candidate)
    }

    pub fn root_schema(&self) -> &str {
        &self.root_schema
    }
}

impl fmt::Debug for ContactSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactSchemaValidator")
            .field("root_schema", &self.root_schema)
            .finish_non_exhaustive()
    }
}
