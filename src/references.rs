use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use crate::document::SchemaDocument;
use crate::error::SchemaConfigurationError;
use crate::json_pointer;

/// A `$ref` found in the schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The reference exactly as written
    pub target: String,
    /// JSON pointer of the object holding the `$ref`, relative to the document root
    pub location: String,
}

/// Every `$ref` in the document, in document order.
pub fn collect(document: &SchemaDocument) -> Vec<Reference> {
    let mut found = Vec::new();
    for (name, schema) in document.schemas() {
        let location = json_pointer::child(document.schemas_pointer(), name);
        walk(schema, &location, &mut found);
    }
    found
}

/// Checks that every reference is local and resolves inside the document.
///
/// Returns the number of references checked, or the first one in document
/// order that cannot be resolved.
#[instrument(skip(document), fields(schema_count = document.len()))]
pub fn audit(document: &SchemaDocument) -> Result<usize, SchemaConfigurationError> {
    let scope = document.reference_scope();
    let references = collect(document);

    for reference in &references {
        let Some(pointer) = local_pointer(&reference.target) else {
            warn!(
                reference = %reference.target,
                location = %reference.location,
                "External reference in schema document"
            );
            return Err(SchemaConfigurationError::ExternalReference {
                reference: reference.target.clone(),
                location: reference.location.clone(),
            });
        };

        if scope.pointer(pointer).is_none() {
            warn!(
                reference = %reference.target,
                location = %reference.location,
                "Unresolvable reference in schema document"
            );
            return Err(SchemaConfigurationError::UnresolvedReference {
                reference: reference.target.clone(),
                location: reference.location.clone(),
            });
        }

        trace!(reference = %reference.target, "Reference resolved");
    }

    debug!(reference_count = references.len(), "All schema references resolve");
    Ok(references.len())
}

/// JSON pointer part of a same-document reference such as `#/components/schemas/Name`.
fn local_pointer(target: &str) -> Option<&str> {
    static LOCAL_REFERENCE: OnceLock<Regex> = OnceLock::new();
    let regex = LOCAL_REFERENCE.get_or_init(|| {
        // `#` followed by an optional pointer, nothing before the fragment
        Regex::new(r"^#(?P<pointer>(?:/[^/]*)*)$").expect("Valid regex")
    });

    regex
        .captures(target)
        .and_then(|caps| caps.name("pointer"))
        .map(|m| m.as_str())
}

fn walk(value: &Value, location: &str, found: &mut Vec<Reference>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("$ref") {
                found.push(Reference {
                    target: target.clone(),
                    location: location.to_string(),
                });
            }
            for (key, child) in map {
                walk(child, &json_pointer::child(location, key), found);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &json_pointer::child(location, &index.to_string()), found);
            }
        }
        _ => {}
    }
}
