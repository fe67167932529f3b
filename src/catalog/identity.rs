use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unique name of a device (security domain) inside its catalog.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceName(pub String);

/// Unique name of a usecase inside its catalog.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsecaseName(pub String);

/// Name of an attack vector that caps the levels of whatever it touches.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorName(pub String);

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UsecaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which catalog a record belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    AttackVector,
    Device,
    Usecase,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::AttackVector => "attack vector",
            RecordKind::Device => "device",
            RecordKind::Usecase => "usecase",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three attack-surface dimensions of the threat model.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Dimension {
    /// Physical possession of or access to the hardware.
    Phys,
    /// Short-range proximity access (local wireless, USB in a shared room).
    Near,
    /// Remote or network access.
    Remote,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 3] = [Dimension::Phys, Dimension::Near, Dimension::Remote];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Phys => "phys",
            Dimension::Near => "near",
            Dimension::Remote => "remote",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "phys" => Ok(Dimension::Phys),
            "near" => Ok(Dimension::Near),
            "remote" => Ok(Dimension::Remote),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["phys", "near", "remote"],
            )),
        }
    }
}

/// Security level on the open ordinal scale.
///
/// Higher means stronger resistance for a device and a stricter requirement
/// for a usecase. The scale has no upper bound; values 0 through 3 carry the
/// conventional tier names returned by [`Level::tier`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub u64);

/// Conventional names for the lowest four levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Trivial,
    Easy,
    Hard,
    Impossible,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Trivial => "trivial",
            Tier::Easy => "easy",
            Tier::Hard => "hard",
            Tier::Impossible => "impossible",
        }
    }
}

impl Level {
    /// Tier label for well-known levels; `None` above the conventional range.
    pub fn tier(self) -> Option<Tier> {
        match self.0 {
            0 => Some(Tier::Trivial),
            1 => Some(Tier::Easy),
            2 => Some(Tier::Hard),
            3 => Some(Tier::Impossible),
            _ => None,
        }
    }
}

impl Level {
    /// Numeric level followed by its tier in parentheses, e.g. `2 (hard)`.
    pub fn labelled(self) -> String {
        match self.tier() {
            Some(tier) => format!("{} ({})", self.0, tier.as_str()),
            None => self.0.to_string(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dimension where a usecase asks for more than a device offers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Shortfall {
    pub dimension: Dimension,
    pub required: Level,
    pub available: Level,
}

/// The three levels of a device or usecase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Levels {
    pub phys: Level,
    pub near: Level,
    pub remote: Level,
}

impl Levels {
    pub fn new(phys: u64, near: u64, remote: u64) -> Self {
        Self {
            phys: Level(phys),
            near: Level(near),
            remote: Level(remote),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Level {
        match dimension {
            Dimension::Phys => self.phys,
            Dimension::Near => self.near,
            Dimension::Remote => self.remote,
        }
    }

    /// Lowest of the two on every dimension.
    pub fn capped_by(&self, ceiling: &Levels) -> Levels {
        Levels {
            phys: self.phys.min(ceiling.phys),
            near: self.near.min(ceiling.near),
            remote: self.remote.min(ceiling.remote),
        }
    }

    /// Tier of each dimension, `None` above the conventional range.
    pub fn tiers(&self) -> Tiers {
        Tiers {
            phys: self.phys.tier(),
            near: self.near.tier(),
            remote: self.remote.tier(),
        }
    }

    /// True when these (device) levels meet or exceed `required` on every
    /// dimension. Equality counts as meeting the requirement.
    pub fn covers(&self, required: &Levels) -> bool {
        self.phys >= required.phys && self.near >= required.near && self.remote >= required.remote
    }

    /// Dimensions on which `required` exceeds these levels, in report order.
    pub fn shortfalls(&self, required: &Levels) -> Vec<Shortfall> {
        Dimension::ALL
            .into_iter()
            .filter_map(|dimension| {
                let available = self.get(dimension);
                let needed = required.get(dimension);
                (needed > available).then_some(Shortfall {
                    dimension,
                    required: needed,
                    available,
                })
            })
            .collect()
    }
}

/// Tier labels for a set of levels, serialized next to the numbers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Tiers {
    pub phys: Option<Tier>,
    pub near: Option<Tier>,
    pub remote: Option<Tier>,
}

impl fmt::Display for Levels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phys={}, near={}, remote={}",
            self.phys, self.near, self.remote
        )
    }
}
