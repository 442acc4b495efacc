use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value, json};
use tracing::{debug, instrument, trace};

use crate::config::ValidatorConfig;
use crate::error::SchemaConfigurationError;
use crate::json_pointer;

/// The contact API specification shipped with the crate.
pub const BUNDLED_DOCUMENT: &str = include_str!("../schemas/contact-api-spec.yaml");

/// Named schema definitions read from an API specification document.
///
/// Names keep the order they have in the source document. The document is
/// never modified after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    schemas: Map<String, Value>,
    schemas_pointer: String,
}

impl SchemaDocument {
    /// Parses the bundled contact API document with the default config.
    pub fn bundled() -> Result<Self, SchemaConfigurationError> {
        Self::from_yaml_str(BUNDLED_DOCUMENT, &ValidatorConfig::default())
    }

    /// Reads the named schemas found at `config.schemas_pointer`.
    #[instrument(skip(document, config), fields(pointer = %config.schemas_pointer))]
    pub fn from_value(
        document: Value,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaConfigurationError> {
        let schemas = match document.pointer(&config.schemas_pointer) {
            Some(Value::Object(schemas)) => schemas.clone(),
            _ => {
                return Err(SchemaConfigurationError::MissingSchemas(
                    config.schemas_pointer.clone(),
                ));
            }
        };

        debug!(schema_count = schemas.len(), "Loaded schema document");

        Ok(Self {
            schemas,
            schemas_pointer: config.schemas_pointer.clone(),
        })
    }

    pub fn from_yaml_str(
        text: &str,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaConfigurationError> {
        trace!(content_len = text.len(), "Parsing YAML schema document");
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_value(document, config)
    }

    pub fn from_json_str(
        text: &str,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaConfigurationError> {
        trace!(content_len = text.len(), "Parsing JSON schema document");
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(document, config)
    }

    /// Loads a document from disk, as JSON for `.json` files and YAML otherwise.
    #[instrument(skip(path, config), fields(path = %path.display()))]
    pub fn from_path(
        path: &Path,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaConfigurationError> {
        let file = std::fs::File::open(path).map_err(|err| {
            SchemaConfigurationError::LoadFailed(format!("{}: {err}", path.display()))
        })?;

        let size = file.metadata()?.len();
        if size > config.max_document_size as u64 {
            return Err(SchemaConfigurationError::DocumentTooLarge {
                size,
                limit: config.max_document_size,
            });
        }

        let read_limit =
            u64::try_from(config.max_document_size.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                SchemaConfigurationError::LoadFailed(format!("{}: {err}", path.display()))
            })?;
        if content.len() > config.max_document_size {
            return Err(SchemaConfigurationError::DocumentTooLarge {
                size: content.len() as u64,
                limit: config.max_document_size,
            });
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content, config)
        } else {
            Self::from_yaml_str(&content, config)
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schema names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schemas(&self) -> &Map<String, Value> {
        &self.schemas
    }

    pub fn schemas_pointer(&self) -> &str {
        &self.schemas_pointer
    }

    /// Rebuilds the document shape that references are written against: the
    /// named schemas nested back under their pointer.
    pub(crate) fn reference_scope(&self) -> Value {
        let tokens: Vec<String> = json_pointer::tokens(&self.schemas_pointer).collect();

        tokens
            .into_iter()
            .rev()
            .fold(Value::Object(self.schemas.clone()), |nested, token| {
                let mut parent = Map::new();
                parent.insert(token, nested);
                Value::Object(parent)
            })
    }

    /// Schema the engine compiles: the reference scope with a top-level `$ref` to `root`.
    pub(crate) fn compilation_root(&self, root: &str) -> Value {
        let mut scope = self.reference_scope();
        let reference = format!("#{}", json_pointer::child(&self.schemas_pointer, root));

        if let Value::Object(map) = &mut scope {
            map.insert("$ref".to_string(), json!(reference));
        }

        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_JSON: &str = r##"{
        "openapi": "3.0.3",
        "components": {
            "schemas": {
                "Root": { "type": "object", "properties": { "child": { "$ref": "#/components/schemas/Child" } } },
                "Child": { "type": "string" }
            }
        }
    }"##;

    fn temp_file(tag: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "contact-schema-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn bundled_document_keeps_document_order() -> Result<(), Box<dyn std::error::Error>> {
        let document = SchemaDocument::bundled()?;

        assert_eq!(
            document.names().collect::<Vec<_>>(),
            vec!["Contacts", "Name", "ContactMechanisms", "Address", "Email", "Phone"]
        );
        assert!(document.contains("Contacts"));
        assert_eq!(document.schemas_pointer(), "/components/schemas");
        Ok(())
    }

    #[test]
    fn json_and_yaml_parse_to_the_same_schemas() -> Result<(), Box<dyn std::error::Error>> {
        let config = ValidatorConfig::default();
        let from_json = SchemaDocument::from_json_str(MINIMAL_JSON, &config)?;
        // JSON is valid YAML
        let from_yaml = SchemaDocument::from_yaml_str(MINIMAL_JSON, &config)?;

        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_schema_map_is_a_configuration_error() {
        let result =
            SchemaDocument::from_json_str(r#"{"openapi":"3.0.3"}"#, &ValidatorConfig::default());

        assert!(matches!(
            result,
            Err(SchemaConfigurationError::MissingSchemas(pointer)) if pointer == "/components/schemas"
        ));
    }

    #[test]
    fn malformed_text_is_invalid_document() {
        let result = SchemaDocument::from_json_str("{not json", &ValidatorConfig::default());

        assert!(matches!(result, Err(SchemaConfigurationError::InvalidDocument(_))));
    }

    #[test]
    fn from_path_reads_json_by_extension() -> Result<(), Box<dyn std::error::Error>> {
        let base = temp_file("json-doc", MINIMAL_JSON);
        let path = base.with_extension("json");
        std::fs::rename(&base, &path)?;

        let document = SchemaDocument::from_path(&path, &ValidatorConfig::default())?;
        assert!(document.contains("Child"));

        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn from_path_enforces_size_limit() {
        let path = temp_file("too-large", BUNDLED_DOCUMENT);
        let config = ValidatorConfig {
            max_document_size: 16,
            ..ValidatorConfig::default()
        };

        let result = SchemaDocument::from_path(&path, &config);
        assert!(matches!(
            result,
            Err(SchemaConfigurationError::DocumentTooLarge { limit: 16, .. })
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn from_path_missing_file_fails_to_load() {
        let path = std::env::temp_dir().join("contact-schema-does-not-exist.yaml");

        let result = SchemaDocument::from_path(&path, &ValidatorConfig::default());
        assert!(matches!(result, Err(SchemaConfigurationError::LoadFailed(_))));
    }

    #[test]
    fn compilation_root_nests_schemas_under_pointer() -> Result<(), Box<dyn std::error::Error>> {
        let document = SchemaDocument::from_json_str(MINIMAL_JSON, &ValidatorConfig::default())?;

        let root = document.compilation_root("Root");
        assert_eq!(root["$ref"], json!("#/components/schemas/Root"));
        assert_eq!(root["components"]["schemas"]["Child"], json!({"type": "string"}));
        Ok(())
    }
}
