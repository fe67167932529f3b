//! JSON Schema check for catalog documents.
//!
//! The schema is embedded at build time from `schema/threat_catalog.schema.json`
//! and compiled on demand. Record-level problems are reported earlier as
//! `DefinitionError`s; the schema pass catches what the record reader ignores,
//! such as unknown fields or a foreign `schema_version`.

use crate::error::CatalogError;
use jsonschema::JSONSchema;
use serde_json::Value;

const CATALOG_SCHEMA_JSON: &str = include_str!("../../schema/threat_catalog.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Schema version every catalog built in code carries.
pub const CATALOG_SCHEMA_VERSION: &str = "threat_catalog_v1";

/// Compiled catalog schema plus the version it pins.
pub(crate) struct CatalogSchema {
    pub schema_version: String,
    compiled: JSONSchema,
}

impl CatalogSchema {
    pub fn embedded() -> Result<Self, CatalogError> {
        let raw: Value = serde_json::from_str(CATALOG_SCHEMA_JSON)
            .map_err(|err| CatalogError::InvalidSchema(format!("parsing embedded schema: {err}")))?;
        Self::compile(&raw)
    }

    pub fn compile(raw: &Value) -> Result<Self, CatalogError> {
        let schema_version = extract_schema_version(raw).ok_or_else(|| {
            CatalogError::InvalidSchema(format!("schema missing {SCHEMA_VERSION_POINTER}"))
        })?;
        let compiled = JSONSchema::compile(raw)
            .map_err(|err| CatalogError::InvalidSchema(format!("compiling schema: {err}")))?;
        Ok(Self {
            schema_version,
            compiled,
        })
    }

    /// Validate a whole catalog document, collecting every violation.
    pub fn validate(&self, origin: &str, document: &Value) -> Result<(), CatalogError> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect::<Vec<_>>();
            return Err(CatalogError::Schema {
                origin: origin.to_string(),
                details,
            });
        }
        Ok(())
    }
}

fn extract_schema_version(schema: &Value) -> Option<String> {
    let version = schema.pointer(SCHEMA_VERSION_POINTER).and_then(Value::as_str)?;
    if !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
