//! Typed errors for catalog loading and matching.
//!
//! `DefinitionError` covers malformed catalog records, `InvalidInputError` a
//! record that reaches the matcher without all three levels, and
//! `CatalogError` wraps both the definition failures and the I/O, JSON and
//! schema failures that can happen while reading a catalog document.

use crate::catalog::{Dimension, RecordKind, Shortfall};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Position (and name, when known) of a record inside its catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub index: usize,
    pub name: Option<String>,
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.index + 1)?;
        if let Some(name) = &self.name {
            write!(f, " ('{name}')")?;
        }
        Ok(())
    }
}

/// A catalog record that cannot become a `Device` or `Usecase`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DefinitionError {
    #[error("catalog document has no '{section}' array")]
    MissingSection { section: &'static str },

    #[error("{record}: record must be a JSON object")]
    NotAnObject { record: RecordRef },

    #[error("{record}: missing field '{field}'")]
    MissingField {
        record: RecordRef,
        field: &'static str,
    },

    #[error("{record}: name {reason}")]
    InvalidName {
        record: RecordRef,
        reason: &'static str,
    },

    #[error("{record}: level '{field}' must be an integer, got {value}")]
    NonIntegerLevel {
        record: RecordRef,
        field: &'static str,
        value: String,
    },

    #[error("{record}: level '{field}' must not be negative, got {value}")]
    NegativeLevel {
        record: RecordRef,
        field: &'static str,
        value: i64,
    },

    #[error("{record}: duplicate {} name '{name}' (first defined as #{})", .record.kind, .first + 1)]
    DuplicateName {
        record: RecordRef,
        name: String,
        first: usize,
    },

    #[error("usecase '{usecase}' collides with unknown usecase '{other}'")]
    UnknownCollision { usecase: String, other: String },

    #[error("usecase '{usecase}' lists itself in collides_with")]
    SelfCollision { usecase: String },

    #[error("usecase '{usecase}' introduces unknown attack vector '{vector}'")]
    UnknownAttackVector { usecase: String, vector: String },

    #[error("usecase '{usecase}' is impossible: {}", describe_caps(.gaps))]
    ImpossibleUsecase { usecase: String, gaps: Vec<Shortfall> },

    #[error("device '{device}' pins unknown usecase '{usecase}'")]
    UnknownPinnedUsecase { device: String, usecase: String },

    #[error("device '{device}' cannot host its pinned usecase '{usecase}': {}", describe_caps(.gaps))]
    PinnedUsecaseUnmet {
        device: String,
        usecase: String,
        gaps: Vec<Shortfall>,
    },

    #[error("device '{device}' pins colliding usecases '{first}' and '{second}'")]
    PinnedCollision {
        device: String,
        first: String,
        second: String,
    },
}

fn describe_caps(gaps: &[Shortfall]) -> String {
    gaps.iter()
        .map(|gap| {
            format!(
                "{} needs {}, capped at {}",
                gap.dimension, gap.required, gap.available
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A record reached the matcher without one of the three levels.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind} '{name}' has no {dimension} level")]
pub struct InvalidInputError {
    pub kind: RecordKind,
    pub name: String,
    pub dimension: Dimension,
}

/// Failure while turning a catalog document into a `ThreatCatalog`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid definition in catalog {origin}")]
    Definition {
        origin: String,
        #[source]
        source: DefinitionError,
    },

    #[error("catalog {origin} failed schema validation:\n{}", .details.join("\n"))]
    Schema { origin: String, details: Vec<String> },

    #[error("catalog schema is unusable: {0}")]
    InvalidSchema(String),
}

impl CatalogError {
    /// The underlying definition error, when loading failed on a record.
    pub fn definition(&self) -> Option<&DefinitionError> {
        match self {
            CatalogError::Definition { source, .. } => Some(source),
            _ => None,
        }
    }
}
