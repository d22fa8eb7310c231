//! Bundle of every registry the engine reads, plus the formula cache.

use std::sync::Arc;

use crate::action::ActionDef;
use crate::config::BattleConfig;
use crate::error::report;
use crate::formula::{Formula, FormulaCache, FormulaError};
use crate::registry::{Definition, Registry, RegistryError};
use crate::stats::{Battler, BattlerId, BattlerKind, SpeciesDef, StatSheet};
use crate::traits::{EquipmentDef, PassiveDef, TraitSet, TraitSource};

/// Registry an action reference was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionSource {
    Skill,
    Item,
    /// Built-in fallback attack.
    Builtin,
}

/// Action definition bound to the registry it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAction {
    pub def: Arc<ActionDef>,
    pub source: ActionSource,
}

impl ResolvedAction {
    pub fn id(&self) -> &str {
        &self.def.id
    }
}

/// All content an encounter needs, passed explicitly to the engine.
#[derive(Debug, Default)]
pub struct Catalog {
    pub species: Registry<SpeciesDef>,
    pub skills: Registry<ActionDef>,
    pub items: Registry<ActionDef>,
    pub equipment: Registry<EquipmentDef>,
    pub passives: Registry<PassiveDef>,
    formulas: FormulaCache,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, source: &str) -> Result<Arc<Formula>, FormulaError> {
        self.formulas.compile(source)
    }

    /// Resolved species of `battler`, or an empty stand-in when missing.
    pub fn species_of(&self, battler: &Battler) -> Arc<SpeciesDef> {
        self.species
            .require(&battler.species)
            .unwrap_or_else(|err| {
                report(&err);
                Arc::new(SpeciesDef::placeholder(&battler.species))
            })
    }

    /// Trait sources of `battler` in aggregation order.
    pub fn trait_sources(&self, battler: &Battler) -> Vec<TraitSource> {
        let mut sources = vec![TraitSource::Species(battler.species.clone())];
        sources.extend(battler.passives.iter().cloned().map(TraitSource::Passive));
        if let Some(item) = battler.equipment() {
            sources.push(TraitSource::Equipment(item.to_owned()));
        }
        sources
    }

    /// Concatenated traits of every source bound to `battler`.
    ///
    /// Sources that fail to resolve contribute nothing.
    pub fn traits_of(&self, battler: &Battler) -> TraitSet {
        let mut traits = Vec::new();
        for source in self.trait_sources(battler) {
            let found = match &source {
                TraitSource::Species(id) => self.species.get(id).map(|d| d.traits().to_vec()),
                TraitSource::Passive(id) => self.passives.get(id).map(|d| d.traits().to_vec()),
                TraitSource::Equipment(id) => self.equipment.get(id).map(|d| d.traits().to_vec()),
            };
            match found {
                Some(list) => traits.extend(list),
                None => {
                    let (kind, id) = match source {
                        TraitSource::Species(id) => (SpeciesDef::KIND, id),
                        TraitSource::Passive(id) => (PassiveDef::KIND, id),
                        TraitSource::Equipment(id) => (EquipmentDef::KIND, id),
                    };
                    report(&RegistryError::NotFound { kind, id });
                }
            }
        }
        TraitSet::new(traits)
    }

    pub fn sheet(&self, battler: &Battler, config: &BattleConfig) -> StatSheet {
        self.sheet_with(battler, &self.traits_of(battler), config)
    }

    pub fn sheet_with(
        &self,
        battler: &Battler,
        traits: &TraitSet,
        config: &BattleConfig,
    ) -> StatSheet {
        StatSheet::compute(battler, &self.species_of(battler), traits, config)
    }

    /// Looks up an action reference.
    ///
    /// Order: skill, item, case-insensitive skill or item, the `attack`
    /// skill, then the built-in attack.
    pub fn action(&self, id: &str) -> ResolvedAction {
        let found = self
            .skills
            .get(id)
            .map(|def| (def, ActionSource::Skill))
            .or_else(|| self.items.get(id).map(|def| (def, ActionSource::Item)))
            .or_else(|| {
                self.skills
                    .find_ignore_case(id)
                    .map(|def| (def, ActionSource::Skill))
            })
            .or_else(|| {
                self.items
                    .find_ignore_case(id)
                    .map(|def| (def, ActionSource::Item))
            });
        if let Some((def, source)) = found {
            return ResolvedAction { def, source };
        }

        report(&RegistryError::NotFound {
            kind: ActionDef::KIND,
            id: id.to_owned(),
        });
        self.basic_attack()
    }

    pub fn basic_attack(&self) -> ResolvedAction {
        match self.skills.get(ActionDef::BASIC_ATTACK_ID) {
            Some(def) => ResolvedAction {
                def,
                source: ActionSource::Skill,
            },
            None => ResolvedAction {
                def: Arc::new(ActionDef::basic_attack()),
                source: ActionSource::Builtin,
            },
        }
    }

    /// Builds a battler at full hp/mp.
    pub fn spawn(
        &self,
        id: BattlerId,
        species_id: &str,
        kind: BattlerKind,
        level: u32,
        slot_index: u8,
        config: &BattleConfig,
    ) -> Result<Battler, RegistryError> {
        let species = self.species.require(species_id)?;
        let mut battler = Battler::new(id, &species, kind, level.min(config.max_level), slot_index);
        battler.exp = crate::stats::exp_for_level(species.xp_curve(), battler.level);
        let sheet = self.sheet(&battler, config);
        battler.recover_all(&sheet);
        Ok(battler)
    }
}
