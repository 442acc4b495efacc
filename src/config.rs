use jsonschema::Draft;

/// Name of the contact schema inside the bundled document.
pub const DEFAULT_ROOT_SCHEMA: &str = "Contacts";

/// Where an OpenAPI document keeps its named schemas.
pub const DEFAULT_SCHEMAS_POINTER: &str = "/components/schemas";

/// Controls how the schema document is read and compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Named schema that candidate objects are checked against.
    pub root_schema: String,
    /// JSON pointer to the map of named schemas within the document.
    pub schemas_pointer: String,
    /// JSON Schema draft used to interpret schema keywords.
    pub draft: Draft,
    /// Maximum bytes accepted when reading a document from disk.
    pub max_document_size: usize,
}

impl ValidatorConfig {
    /// Default config checking against a different root schema.
    pub fn for_root(root_schema: impl Into<String>) -> Self {
        Self {
            root_schema: root_schema.into(),
            ..Self::default()
        }
    }

    /// Fragment prefix that references to named schemas start with, e.g. `#/components/schemas/`.
    pub fn reference_prefix(&self) -> String {
        format!("#{}/", self.schemas_pointer)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            root_schema: DEFAULT_ROOT_SCHEMA.to_string(),
            schemas_pointer: DEFAULT_SCHEMAS_POINTER.to_string(),
            draft: Draft::Draft7,
            max_document_size: 1024 * 1024,
        }
    }
}
