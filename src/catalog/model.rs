//! Validated device and usecase records.
//!
//! Records are read from `serde_json::Value` rather than derived structs so
//! each malformed field can be reported as a `DefinitionError` that names the
//! offending record. Unknown fields are left for the schema pass.

use crate::catalog::identity::{
    DeviceName, Dimension, Level, Levels, RecordKind, UsecaseName, VectorName,
};
use crate::error::{DefinitionError, RecordRef};
use serde::Serialize;
use serde_json::{Map, Value};

/// Something that caps the achievable level of any device it is present on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AttackVector {
    pub name: VectorName,
    pub ceiling: Levels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A security domain and its resistance on each dimension.
///
/// `ceiling` is what the hardware allows on its own; `levels` is that ceiling
/// lowered by the attack vectors of every pinned usecase, and is what the
/// matcher compares against. The two are equal until the catalog resolves
/// vectors.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Device {
    pub name: DeviceName,
    pub levels: Levels,
    #[serde(skip)]
    pub ceiling: Levels,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pinned: Vec<UsecaseName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An activity and the minimum device resistance it requires.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Usecase {
    pub name: UsecaseName,
    pub levels: Levels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collides_with: Vec<UsecaseName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attack_vectors: Vec<VectorName>,
}

impl AttackVector {
    pub fn new(name: impl Into<String>, ceiling: Levels) -> Self {
        Self {
            name: VectorName(name.into()),
            ceiling,
            description: None,
        }
    }

    pub(crate) fn from_value(index: usize, value: &Value) -> Result<Self, DefinitionError> {
        let fields = RecordFields::read(RecordKind::AttackVector, index, value)?;
        Ok(Self {
            name: VectorName(fields.name),
            ceiling: fields.levels,
            description: fields.description,
        })
    }
}

impl Device {
    pub fn new(name: impl Into<String>, levels: Levels) -> Self {
        Self {
            name: DeviceName(name.into()),
            levels,
            ceiling: levels,
            pinned: Vec::new(),
            description: None,
        }
    }

    /// Builder-style helper for pinning usecases in code.
    pub fn pinning<I, S>(mut self, usecases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned
            .extend(usecases.into_iter().map(|name| UsecaseName(name.into())));
        self
    }

    pub(crate) fn from_value(index: usize, value: &Value) -> Result<Self, DefinitionError> {
        let fields = RecordFields::read(RecordKind::Device, index, value)?;
        let pinned = fields.names("pinned").map(UsecaseName).collect();
        Ok(Self {
            name: DeviceName(fields.name),
            levels: fields.levels,
            ceiling: fields.levels,
            pinned,
            description: fields.description,
        })
    }
}

impl Usecase {
    pub fn new(name: impl Into<String>, levels: Levels) -> Self {
        Self {
            name: UsecaseName(name.into()),
            levels,
            description: None,
            collides_with: Vec::new(),
            attack_vectors: Vec::new(),
        }
    }

    /// Builder-style helper for declaring collisions in code.
    pub fn colliding_with<I, S>(mut self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collides_with
            .extend(others.into_iter().map(|name| UsecaseName(name.into())));
        self
    }

    /// Builder-style helper for attaching attack vectors in code.
    pub fn introducing<I, S>(mut self, vectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attack_vectors
            .extend(vectors.into_iter().map(|name| VectorName(name.into())));
        self
    }

    /// Whether this usecase declares a collision with `other`.
    pub fn declares_collision(&self, other: &UsecaseName) -> bool {
        self.collides_with.iter().any(|name| name == other)
    }

    pub(crate) fn from_value(index: usize, value: &Value) -> Result<Self, DefinitionError> {
        let fields = RecordFields::read(RecordKind::Usecase, index, value)?;
        let collides_with = fields.names("collides_with").map(UsecaseName).collect();
        let attack_vectors = fields.names("attack_vectors").map(VectorName).collect();
        Ok(Self {
            name: UsecaseName(fields.name),
            levels: fields.levels,
            description: fields.description,
            collides_with,
            attack_vectors,
        })
    }
}

/// Fields shared by both record kinds, pulled out of one JSON object.
struct RecordFields<'a> {
    object: &'a Map<String, Value>,
    name: String,
    levels: Levels,
    description: Option<String>,
}

impl<'a> RecordFields<'a> {
    fn read(kind: RecordKind, index: usize, value: &'a Value) -> Result<Self, DefinitionError> {
        let mut record = RecordRef {
            kind,
            index,
            name: None,
        };
        let Some(object) = value.as_object() else {
            return Err(DefinitionError::NotAnObject { record });
        };

        let name = match object.get("name") {
            None | Some(Value::Null) => {
                return Err(DefinitionError::MissingField {
                    record,
                    field: "name",
                });
            }
            Some(Value::String(name)) if name.trim().is_empty() => {
                return Err(DefinitionError::InvalidName {
                    record,
                    reason: "must not be empty",
                });
            }
            Some(Value::String(name)) if name.contains(is_reserved) => {
                return Err(DefinitionError::InvalidName {
                    record,
                    reason: "must not contain commas, parentheses or whitespace",
                });
            }
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(DefinitionError::InvalidName {
                    record,
                    reason: "must be a string",
                });
            }
        };
        record.name = Some(name.clone());

        let phys = read_level(&record, object, Dimension::Phys)?;
        let near = read_level(&record, object, Dimension::Near)?;
        let remote = read_level(&record, object, Dimension::Remote)?;

        Ok(Self {
            object,
            name,
            levels: Levels { phys, near, remote },
            description: object
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

impl RecordFields<'_> {
    /// String items of an optional array field; non-strings are left for
    /// the schema pass.
    fn names(&self, field: &str) -> impl Iterator<Item = String> + '_ {
        self.object
            .get(field)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
    }
}

/// Characters that would make a name ambiguous in the comma-joined report.
fn is_reserved(c: char) -> bool {
    c == ',' || c == '(' || c == ')' || c.is_whitespace()
}

fn read_level(
    record: &RecordRef,
    object: &Map<String, Value>,
    dimension: Dimension,
) -> Result<Level, DefinitionError> {
    let field = dimension.as_str();
    let value = match object.get(field) {
        None | Some(Value::Null) => {
            return Err(DefinitionError::MissingField {
                record: record.clone(),
                field,
            });
        }
        Some(value) => value,
    };

    if let Some(level) = value.as_u64() {
        return Ok(Level(level));
    }
    if let Some(negative) = value.as_i64() {
        return Err(DefinitionError::NegativeLevel {
            record: record.clone(),
            field,
            value: negative,
        });
    }
    Err(DefinitionError::NonIntegerLevel {
        record: record.clone(),
        field,
        value: value.to_string(),
    })
}
