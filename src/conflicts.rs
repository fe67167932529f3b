//! Collisions among the usecases a device can host.
//!
//! Two usecases collide when either one lists the other in `collides_with`
//! (e.g. a banking SIM and a personal SIM in the same phone). Collisions are
//! advisory: they are reported next to a device's matches and never remove a
//! usecase from the match set.

use crate::catalog::Usecase;
use crate::matcher::MatchRow;
use serde::{Serialize, Serializer};

/// Unordered pair of colliding usecases, `first` earlier in catalog order.
/// Serializes as a two-element array of names.
#[derive(Clone, Copy, Debug)]
pub struct Collision<'a> {
    pub first: &'a Usecase,
    pub second: &'a Usecase,
}

impl<'a> Collision<'a> {
    pub fn names(&self) -> (&'a str, &'a str) {
        (&self.first.name.0, &self.second.name.0)
    }
}

/// Every colliding pair among `usecases`, each pair once, in catalog order.
pub fn collisions<'a>(usecases: &[&'a Usecase]) -> Vec<Collision<'a>> {
    let mut found = Vec::new();
    for (idx, &first) in usecases.iter().enumerate() {
        for &second in &usecases[idx + 1..] {
            if first.declares_collision(&second.name) || second.declares_collision(&first.name) {
                found.push(Collision { first, second });
            }
        }
    }
    found
}

/// Collisions among the usecases matched for one device.
pub fn row_collisions<'a, D>(row: &MatchRow<'a, D, Usecase>) -> Vec<Collision<'a>> {
    collisions(&row.usecases)
}

impl Serialize for Collision<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (first, second) = self.names();
        [first, second].serialize(serializer)
    }
}
