pub mod config;
pub mod document;
pub mod error;
pub mod json_pointer;
pub mod references;
pub mod validator;
pub mod violation;

use tracing::{debug, instrument};

pub use crate::config::ValidatorConfig;
pub use crate::document::SchemaDocument;
pub use crate::error::{Error, Result, SchemaConfigurationError, ValidationFailed};
pub use crate::validator::ContactSchemaValidator;
pub use crate::violation::{Violation, ViolationKind};

/// Compiles the `Contacts` schema from `document` and checks `candidate` against it.
///
/// Compiles on every call. Callers validating many objects should build a
/// [`ContactSchemaValidator`] once and reuse it; the outcome is the same.
#[instrument(skip(document, candidate), fields(schema_count = document.len()))]
pub fn validate_contact(document: &SchemaDocument, candidate: &serde_json::Value) -> Result<()> {
    debug!("Validating contact with a freshly compiled schema");

    let validator = ContactSchemaValidator::with_defaults(document)?;
    validator.validate(candidate)?;
    Ok(())
}
