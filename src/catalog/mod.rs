//! Device and usecase catalogs.
//!
//! This module wraps the JSON catalog under `catalog/threat_model.json` (or any
//! document following `schema/threat_catalog.schema.json`) so the matcher and
//! reporter only ever see validated, immutable records. `ThreatCatalog` is the
//! entry point; the identity types give names and levels their own types.
//! Device levels are resolved against attack vectors at load time.

mod ceiling;
pub mod identity;
pub mod index;
pub mod model;
pub mod schema;

pub use identity::{
    DeviceName, Dimension, Level, Levels, RecordKind, Shortfall, Tier, Tiers, UsecaseName,
    VectorName,
};
pub use index::ThreatCatalog;
pub use model::{AttackVector, Device, Usecase};
pub use schema::CATALOG_SCHEMA_VERSION;
