//! Device → usecase matching.
//!
//! A usecase is hostable on a device when the device's level meets or exceeds
//! the usecase's requirement on phys, near, and remote. `match_usecases`
//! evaluates every (device, usecase) pair and keeps both catalogs' order, so
//! the result is a pure function of its inputs.
//!
//! The matcher is generic over [`ThreatProfile`] so tests (and callers with
//! their own record types) can feed synthetic catalogs. Records that cannot
//! produce all three levels are rejected with `InvalidInputError`; nothing
//! else is re-validated here.

use crate::catalog::{Device, Dimension, Level, Levels, RecordKind, Shortfall, Usecase};
use crate::error::InvalidInputError;
use tracing::trace;

/// Anything that can be placed on the phys/near/remote scale.
pub trait ThreatProfile {
    fn name(&self) -> &str;

    /// Level on one dimension, or `None` when the record never defined it.
    fn level(&self, dimension: Dimension) -> Option<Level>;
}

impl ThreatProfile for Device {
    fn name(&self) -> &str {
        &self.name.0
    }

    fn level(&self, dimension: Dimension) -> Option<Level> {
        Some(self.levels.get(dimension))
    }
}

impl ThreatProfile for Usecase {
    fn name(&self) -> &str {
        &self.name.0
    }

    fn level(&self, dimension: Dimension) -> Option<Level> {
        Some(self.levels.get(dimension))
    }
}

/// One device and the usecases it can host, in usecase-catalog order.
#[derive(Debug)]
pub struct MatchRow<'a, D, U> {
    pub device: &'a D,
    pub levels: Levels,
    pub usecases: Vec<&'a U>,
}

/// Ordered device → usecase mapping produced by [`match_usecases`].
#[derive(Debug)]
pub struct MatchTable<'a, D, U> {
    rows: Vec<MatchRow<'a, D, U>>,
}

impl<'a, D: ThreatProfile, U: ThreatProfile> MatchTable<'a, D, U> {
    /// Rows in device-catalog order.
    pub fn rows(&self) -> &[MatchRow<'a, D, U>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRow<'a, D, U>> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for the device called `name`.
    pub fn row(&self, name: &str) -> Option<&MatchRow<'a, D, U>> {
        self.rows.iter().find(|row| row.device.name() == name)
    }

    /// Names of the usecases matched for `device`, if the device is present.
    pub fn usecase_names(&self, device: &str) -> Option<Vec<&'a str>> {
        self.row(device)
            .map(|row| row.usecases.iter().map(|&u| u.name()).collect())
    }

    /// Keep only the rows for which `keep` returns true. Row contents are
    /// never changed, only whole devices dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&MatchRow<'a, D, U>) -> bool) {
        self.rows.retain(|row| keep(row));
    }
}

/// Collect all three levels of a profile or report the first missing one.
pub fn profile_levels<P: ThreatProfile>(
    profile: &P,
    kind: RecordKind,
) -> Result<Levels, InvalidInputError> {
    let level = |dimension| {
        profile.level(dimension).ok_or_else(|| InvalidInputError {
            kind,
            name: profile.name().to_string(),
            dimension,
        })
    };
    Ok(Levels {
        phys: level(Dimension::Phys)?,
        near: level(Dimension::Near)?,
        remote: level(Dimension::Remote)?,
    })
}

/// Whether a device with `device` levels may host a usecase requiring `required`.
pub fn is_hostable(device: &Levels, required: &Levels) -> bool {
    device.covers(required)
}

/// For each device in order, the usecases (in order) whose requirements it meets.
///
/// Every usecase is evaluated against every device; an empty device list gives
/// an empty table, an empty usecase list gives every device an empty row.
pub fn match_usecases<'a, D, U>(
    devices: &'a [D],
    usecases: &'a [U],
) -> Result<MatchTable<'a, D, U>, InvalidInputError>
where
    D: ThreatProfile,
    U: ThreatProfile,
{
    let requirements = usecases
        .iter()
        .map(|usecase| profile_levels(usecase, RecordKind::Usecase).map(|levels| (usecase, levels)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(devices.len());
    for device in devices {
        let levels = profile_levels(device, RecordKind::Device)?;
        let hosted: Vec<&U> = requirements
            .iter()
            .filter(|(_, required)| is_hostable(&levels, required))
            .map(|(usecase, _)| *usecase)
            .collect();
        trace!(
            device = device.name(),
            matched = hosted.len(),
            of = requirements.len(),
            "matched usecases"
        );
        rows.push(MatchRow {
            device,
            levels,
            usecases: hosted,
        });
    }
    Ok(MatchTable { rows })
}

/// Usecases `device` cannot host, each with the dimensions that fall short.
pub fn rejections<'a, D, U>(
    device: &D,
    usecases: &'a [U],
) -> Result<Vec<(&'a U, Vec<Shortfall>)>, InvalidInputError>
where
    D: ThreatProfile,
    U: ThreatProfile,
{
    let available = profile_levels(device, RecordKind::Device)?;
    let mut rejected = Vec::new();
    for usecase in usecases {
        let required = profile_levels(usecase, RecordKind::Usecase)?;
        let gaps = available.shortfalls(&required);
        if !gaps.is_empty() {
            rejected.push((usecase, gaps));
        }
    }
    Ok(rejected)
}
