//! Cross-file reference checks.

use battle_core::{Catalog, TraitCode};

/// A name used by one definition that no registry can resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingReference {
    /// Definition holding the reference, e.g. `species 'goblin'`.
    pub owner: String,
    /// Unresolved id.
    pub target: String,
}

impl std::fmt::Display for MissingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} references unknown '{}'", self.owner, self.target)
    }
}

/// Lists every species act, passive, parent and on-death skill that would
/// fall back at battle time.
///
/// Action references resolve the way battles do: exact skill, exact item,
/// then case-insensitive.
pub fn missing_references(catalog: &Catalog) -> Vec<MissingReference> {
    let action_exists = |id: &str| {
        catalog.skills.contains(id)
            || catalog.items.contains(id)
            || catalog.skills.find_ignore_case(id).is_some()
            || catalog.items.find_ignore_case(id).is_some()
    };

    let mut missing = Vec::new();
    let mut check = |owner: &str, target: &str, found: bool| {
        if !found {
            missing.push(MissingReference {
                owner: owner.to_owned(),
                target: target.to_owned(),
            });
        }
    };

    for id in catalog.species.ids() {
        let owner = format!("species '{id}'");
        let Some(raw) = catalog.species.raw(id) else {
            continue;
        };
        if let Some(parent) = &raw.parent {
            check(&owner, parent, catalog.species.contains(parent));
        }
        let Some(species) = catalog.species.get(id) else {
            continue;
        };
        for act in species.act_rows().iter().flatten() {
            check(&owner, act, action_exists(act));
        }
        for passive in species.passives() {
            check(&owner, passive, catalog.passives.contains(passive));
        }
    }

    for id in catalog.passives.ids() {
        let owner = format!("passive '{id}'");
        let Some(passive) = catalog.passives.get(id) else {
            continue;
        };
        for t in passive.traits().iter().filter(|t| t.code == TraitCode::OnDeathCast) {
            let skill = t.data_id.as_deref().unwrap_or_default();
            check(&owner, skill, action_exists(skill));
        }
    }

    missing
}
