//! Attack-vector ceilings.
//!
//! Every attack vector a usecase introduces caps the levels of the device it
//! runs on. A device starts at its hardware ceiling and is lowered by the
//! vectors of each usecase pinned to it; the result becomes the device's
//! effective `levels`. Matching itself never looks at vectors.

use crate::catalog::identity::{Levels, UsecaseName, VectorName};
use crate::catalog::model::{AttackVector, Device, Usecase};
use crate::conflicts::collisions;
use crate::error::DefinitionError;
use std::collections::BTreeMap;
use tracing::trace;

/// Name lookups needed while resolving ceilings.
pub(crate) struct Lookup<'a> {
    pub vectors: &'a [AttackVector],
    pub vector_index: &'a BTreeMap<VectorName, usize>,
    pub usecases: &'a [Usecase],
    pub usecase_index: &'a BTreeMap<UsecaseName, usize>,
}

impl Lookup<'_> {
    /// Lowest ceiling across the usecase's vectors; `None` when it has none.
    fn usecase_cap(&self, usecase: &Usecase) -> Result<Option<Levels>, DefinitionError> {
        let mut cap: Option<Levels> = None;
        for name in &usecase.attack_vectors {
            let &idx = self.vector_index.get(name).ok_or_else(|| {
                DefinitionError::UnknownAttackVector {
                    usecase: usecase.name.0.clone(),
                    vector: name.0.clone(),
                }
            })?;
            let ceiling = self.vectors[idx].ceiling;
            cap = Some(match cap {
                Some(current) => current.capped_by(&ceiling),
                None => ceiling,
            });
        }
        Ok(cap)
    }
}

/// Reject impossible usecases, then derive each device's effective levels
/// from its ceiling and pinned usecases.
pub(crate) fn resolve(lookup: &Lookup<'_>, devices: &mut [Device]) -> Result<(), DefinitionError> {
    let mut caps = Vec::with_capacity(lookup.usecases.len());
    for usecase in lookup.usecases {
        let cap = lookup.usecase_cap(usecase)?;
        if let Some(cap) = cap {
            let gaps = cap.shortfalls(&usecase.levels);
            if !gaps.is_empty() {
                return Err(DefinitionError::ImpossibleUsecase {
                    usecase: usecase.name.0.clone(),
                    gaps,
                });
            }
        }
        caps.push(cap);
    }

    for device in devices.iter_mut() {
        let mut pinned = Vec::with_capacity(device.pinned.len());
        let mut levels = device.ceiling;
        for name in &device.pinned {
            let &idx = lookup.usecase_index.get(name).ok_or_else(|| {
                DefinitionError::UnknownPinnedUsecase {
                    device: device.name.0.clone(),
                    usecase: name.0.clone(),
                }
            })?;
            if let Some(cap) = &caps[idx] {
                levels = levels.capped_by(cap);
            }
            pinned.push(&lookup.usecases[idx]);
        }

        for usecase in &pinned {
            let gaps = levels.shortfalls(&usecase.levels);
            if !gaps.is_empty() {
                return Err(DefinitionError::PinnedUsecaseUnmet {
                    device: device.name.0.clone(),
                    usecase: usecase.name.0.clone(),
                    gaps,
                });
            }
        }
        if let Some(collision) = collisions(&pinned).first() {
            let (first, second) = collision.names();
            return Err(DefinitionError::PinnedCollision {
                device: device.name.0.clone(),
                first: first.to_string(),
                second: second.to_string(),
            });
        }

        trace!(
            device = %device.name,
            ceiling = %device.ceiling,
            effective = %levels,
            "resolved device levels"
        );
        device.levels = levels;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        vectors: Vec<AttackVector>,
        vector_index: BTreeMap<VectorName, usize>,
        usecases: Vec<Usecase>,
        usecase_index: BTreeMap<UsecaseName, usize>,
    }

    impl Fixture {
        fn new(vectors: Vec<AttackVector>, usecases: Vec<Usecase>) -> Self {
            let vector_index = vectors
                .iter()
                .enumerate()
                .map(|(idx, v)| (v.name.clone(), idx))
                .collect();
            let usecase_index = usecases
                .iter()
                .enumerate()
                .map(|(idx, u)| (u.name.clone(), idx))
                .collect();
            Self {
                vectors,
                vector_index,
                usecases,
                usecase_index,
            }
        }

        fn resolve(&self, devices: &mut [Device]) -> Result<(), DefinitionError> {
            let lookup = Lookup {
                vectors: &self.vectors,
                vector_index: &self.vector_index,
                usecases: &self.usecases,
                usecase_index: &self.usecase_index,
            };
            resolve(&lookup, devices)
        }
    }

    fn phone_fixture() -> Fixture {
        Fixture::new(
            vec![
                AttackVector::new("gsm_easy", Levels::new(2, 1, 1)),
                AttackVector::new("app_medium", Levels::new(2, 2, 1)),
            ],
            vec![
                Usecase::new("android_device", Levels::new(1, 1, 1)),
                Usecase::new("personal_gsm_sim", Levels::new(1, 1, 1)).introducing(["gsm_easy"]),
                Usecase::new("careful_apps", Levels::new(1, 1, 1)).introducing(["app_medium"]),
                Usecase::new("keepass", Levels::new(2, 1, 1)).colliding_with(["personal_gsm_sim"]),
            ],
        )
    }

    #[test]
    fn pinned_vectors_lower_the_ceiling() {
        let fixture = phone_fixture();
        let mut devices = vec![
            Device::new("gsm_phone", Levels::new(2, 2, 2))
                .pinning(["android_device", "personal_gsm_sim"]),
            Device::new("tablet", Levels::new(1, 2, 1)).pinning(["careful_apps"]),
            Device::new("bare", Levels::new(3, 3, 3)),
        ];
        fixture.resolve(&mut devices).unwrap();
        assert_eq!(devices[0].levels, Levels::new(2, 1, 1));
        assert_eq!(devices[0].ceiling, Levels::new(2, 2, 2));
        assert_eq!(devices[1].levels, Levels::new(1, 2, 1));
        assert_eq!(devices[2].levels, Levels::new(3, 3, 3));
    }

    #[test]
    fn impossible_usecase_is_rejected() {
        let fixture = Fixture::new(
            vec![AttackVector::new("net_easy", Levels::new(2, 1, 1))],
            vec![Usecase::new("banking_app", Levels::new(2, 2, 2)).introducing(["net_easy"])],
        );
        let err = fixture.resolve(&mut []).unwrap_err();
        assert_eq!(
            err.to_string(),
            "usecase 'banking_app' is impossible: near needs 2, capped at 1; remote needs 2, capped at 1"
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let fixture = Fixture::new(
            Vec::new(),
            vec![Usecase::new("music", Levels::new(1, 1, 1)).introducing(["bluetooth"])],
        );
        assert_eq!(
            fixture.resolve(&mut []).unwrap_err(),
            DefinitionError::UnknownAttackVector {
                usecase: "music".into(),
                vector: "bluetooth".into()
            }
        );

        let fixture = phone_fixture();
        let mut devices = vec![Device::new("phone", Levels::new(2, 2, 2)).pinning(["ghost"])];
        assert!(matches!(
            fixture.resolve(&mut devices),
            Err(DefinitionError::UnknownPinnedUsecase { .. })
        ));
    }

    #[test]
    fn pinned_usecases_must_fit_and_not_collide() {
        let fixture = phone_fixture();
        let mut devices = vec![Device::new("old_phone", Levels::new(1, 1, 1)).pinning(["keepass"])];
        assert!(matches!(
            fixture.resolve(&mut devices),
            Err(DefinitionError::PinnedUsecaseUnmet { .. })
        ));

        let mut devices = vec![
            Device::new("phone", Levels::new(2, 2, 2)).pinning(["keepass", "personal_gsm_sim"]),
        ];
        assert_eq!(
            fixture.resolve(&mut devices).unwrap_err().to_string(),
            "device 'phone' pins colliding usecases 'keepass' and 'personal_gsm_sim'"
        );
    }
}
