//! Loaded and validated device/usecase catalogs.
//!
//! `ThreatCatalog` is the only way the rest of the crate sees catalog data.
//! Loading is fail-fast: the first malformed record aborts with a
//! `DefinitionError`, and nothing partially loaded escapes.

use crate::catalog::ceiling::{self, Lookup};
use crate::catalog::identity::{DeviceName, RecordKind, UsecaseName, VectorName};
use crate::catalog::model::{AttackVector, Device, Usecase};
use crate::catalog::schema::{CATALOG_SCHEMA_VERSION, CatalogSchema};
use crate::error::{CatalogError, DefinitionError, RecordRef};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Immutable device, usecase and attack-vector catalogs plus name indexes.
#[derive(Clone, Debug)]
pub struct ThreatCatalog {
    schema_version: String,
    attack_vectors: Vec<AttackVector>,
    devices: Vec<Device>,
    usecases: Vec<Usecase>,
    device_index: BTreeMap<DeviceName, usize>,
    usecase_index: BTreeMap<UsecaseName, usize>,
}

impl ThreatCatalog {
    /// Read, validate, and index a catalog document on disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data, &path.display().to_string())
    }

    /// Parse a catalog document from a string; `origin` labels errors.
    pub fn from_json_str(data: &str, origin: &str) -> Result<Self, CatalogError> {
        let document: Value =
            serde_json::from_str(data).map_err(|source| CatalogError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        Self::from_document(&document, origin)
    }

    /// Validate records first, then the whole document against the schema.
    pub fn from_document(document: &Value, origin: &str) -> Result<Self, CatalogError> {
        let definition = |source| CatalogError::Definition {
            origin: origin.to_string(),
            source,
        };

        let vectors = match document.get("attack_vectors") {
            None => Vec::new(),
            Some(_) => read_section(document, "attack_vectors", AttackVector::from_value)
                .map_err(definition)?,
        };
        let devices = read_section(document, "devices", Device::from_value).map_err(definition)?;
        let usecases =
            read_section(document, "usecases", Usecase::from_value).map_err(definition)?;
        let mut catalog = Self::from_records(vectors, devices, usecases).map_err(definition)?;

        let schema = CatalogSchema::embedded()?;
        schema.validate(origin, document)?;
        catalog.schema_version = schema.schema_version;

        debug!(
            origin,
            devices = catalog.devices.len(),
            usecases = catalog.usecases.len(),
            "loaded threat catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog without attack vectors from records constructed in code.
    pub fn from_parts(
        devices: Vec<Device>,
        usecases: Vec<Usecase>,
    ) -> Result<Self, DefinitionError> {
        Self::from_records(Vec::new(), devices, usecases)
    }

    /// Build a catalog from records constructed in code.
    ///
    /// Checks name uniqueness within each catalog and that every collision
    /// names another known usecase, then lowers each device's levels by the
    /// attack vectors of its pinned usecases.
    pub fn from_records(
        attack_vectors: Vec<AttackVector>,
        mut devices: Vec<Device>,
        usecases: Vec<Usecase>,
    ) -> Result<Self, DefinitionError> {
        let vector_index = build_index(RecordKind::AttackVector, &attack_vectors, |v| &v.name)?;
        let device_index = build_index(RecordKind::Device, &devices, |d| &d.name)?;
        let usecase_index = build_index(RecordKind::Usecase, &usecases, |u| &u.name)?;

        for usecase in &usecases {
            for other in &usecase.collides_with {
                if other == &usecase.name {
                    return Err(DefinitionError::SelfCollision {
                        usecase: usecase.name.0.clone(),
                    });
                }
                if !usecase_index.contains_key(other) {
                    return Err(DefinitionError::UnknownCollision {
                        usecase: usecase.name.0.clone(),
                        other: other.0.clone(),
                    });
                }
            }
        }

        let lookup = Lookup {
            vectors: &attack_vectors,
            vector_index: &vector_index,
            usecases: &usecases,
            usecase_index: &usecase_index,
        };
        ceiling::resolve(&lookup, &mut devices)?;

        Ok(Self {
            schema_version: CATALOG_SCHEMA_VERSION.to_string(),
            attack_vectors,
            devices,
            usecases,
            device_index,
            usecase_index,
        })
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Attack vectors in catalog order.
    pub fn attack_vectors(&self) -> &[AttackVector] {
        &self.attack_vectors
    }

    pub fn attack_vector(&self, name: &VectorName) -> Option<&AttackVector> {
        self.attack_vectors.iter().find(|vector| &vector.name == name)
    }

    /// Devices in catalog order, with effective levels.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Usecases in catalog order.
    pub fn usecases(&self) -> &[Usecase] {
        &self.usecases
    }

    pub fn device(&self, name: &DeviceName) -> Option<&Device> {
        self.device_index.get(name).map(|&idx| &self.devices[idx])
    }

    pub fn usecase(&self, name: &UsecaseName) -> Option<&Usecase> {
        self.usecase_index.get(name).map(|&idx| &self.usecases[idx])
    }
}

fn read_section<T>(
    document: &Value,
    section: &'static str,
    read: fn(usize, &Value) -> Result<T, DefinitionError>,
) -> Result<Vec<T>, DefinitionError> {
    let records = document
        .get(section)
        .and_then(Value::as_array)
        .ok_or(DefinitionError::MissingSection { section })?;
    records
        .iter()
        .enumerate()
        .map(|(idx, value)| read(idx, value))
        .collect()
}

fn build_index<T, K>(
    kind: RecordKind,
    records: &[T],
    name_of: impl Fn(&T) -> &K,
) -> Result<BTreeMap<K, usize>, DefinitionError>
where
    K: Ord + Clone + std::fmt::Display,
{
    let mut index = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
        let name = name_of(record);
        if let Some(&first) = index.get(name) {
            return Err(DefinitionError::DuplicateName {
                record: RecordRef {
                    kind,
                    index: idx,
                    name: Some(name.to_string()),
                },
                name: name.to_string(),
                first,
            });
        }
        index.insert(name.clone(), idx);
    }
    Ok(index)
}
