//! Persistent player roster: formation, gold and equipment stock.
//!
//! A [`Party`] lives across encounters. [`Party::deploy`] hands copies of
//! the members to a battle and [`Party::absorb`] writes the survivors' state
//! back once it ends.

use std::collections::BTreeMap;

use crate::battle::Rewards;
use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};
use crate::registry::{Catalog, RegistryError};
use crate::stats::{Battler, BattlerId, BattlerKind};

/// Errors from roster management.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PartyError {
    /// Every formation slot is taken.
    #[error("party is full (max: {max})")]
    Full { max: u8 },

    #[error("no party member {0}")]
    UnknownMember(BattlerId),

    #[error("formation slot {slot} is out of range (slots: {max})")]
    SlotOutOfRange { slot: u8, max: u8 },

    #[error("item '{0}' is not in the inventory")]
    MissingItem(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl BattleError for PartyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Registry(err) => err.severity(),
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Full { .. } => "PARTY_FULL",
            Self::UnknownMember(_) => "PARTY_UNKNOWN_MEMBER",
            Self::SlotOutOfRange { .. } => "PARTY_SLOT_OUT_OF_RANGE",
            Self::MissingItem(_) => "PARTY_MISSING_ITEM",
            Self::Registry(err) => err.error_code(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    members: Vec<Battler>,
    pub gold: u32,
    /// Unequipped equipment by id.
    inventory: BTreeMap<String, u32>,
    next_id: u32,
}

impl Default for Party {
    fn default() -> Self {
        Self::new()
    }
}

impl Party {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            gold: 0,
            inventory: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Members in formation order.
    pub fn members(&self) -> Vec<&Battler> {
        let mut members: Vec<&Battler> = self.members.iter().collect();
        members.sort_by_key(|b| b.slot_index);
        members
    }

    pub fn member(&self, id: BattlerId) -> Option<&Battler> {
        self.members.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Recruits a new actor into the first free formation slot.
    pub fn add_actor(
        &mut self,
        catalog: &Catalog,
        config: &BattleConfig,
        species: &str,
        level: u32,
    ) -> Result<BattlerId, PartyError> {
        let slot = (0..BattleConfig::FORMATION_SLOTS)
            .find(|slot| self.members.iter().all(|b| b.slot_index != *slot))
            .ok_or(PartyError::Full {
                max: BattleConfig::FORMATION_SLOTS,
            })?;

        let id = BattlerId(self.next_id);
        let battler = catalog.spawn(
            id,
            species,
            BattlerKind::Actor { equipment: None },
            level,
            slot,
            config,
        )?;
        self.next_id += 1;
        tracing::debug!(unit = %id, species, slot, "actor joined party");
        self.members.push(battler);
        Ok(id)
    }

    /// Removes a member; its equipment returns to the inventory.
    pub fn remove_actor(&mut self, id: BattlerId) -> Result<Battler, PartyError> {
        let index = self
            .members
            .iter()
            .position(|b| b.id == id)
            .ok_or(PartyError::UnknownMember(id))?;
        let mut battler = self.members.remove(index);
        if let Some(item) = battler.set_equipment(None) {
            self.add_item(item, 1);
        }
        Ok(battler)
    }

    /// Exchanges whoever occupies formation slots `a` and `b`.
    pub fn swap_order(&mut self, a: u8, b: u8) -> Result<(), PartyError> {
        let max = BattleConfig::FORMATION_SLOTS;
        for slot in [a, b] {
            if slot >= max {
                return Err(PartyError::SlotOutOfRange { slot, max });
            }
        }
        for member in &mut self.members {
            if member.slot_index == a {
                member.slot_index = b;
            } else if member.slot_index == b {
                member.slot_index = a;
            }
        }
        Ok(())
    }

    /// Equips `item` from the inventory, returning the replaced item to it.
    ///
    /// Hp is clamped to the new maximum.
    pub fn equip(
        &mut self,
        catalog: &Catalog,
        config: &BattleConfig,
        id: BattlerId,
        item: &str,
    ) -> Result<Option<String>, PartyError> {
        catalog.equipment.require(item)?;
        if self.item_count(item) == 0 {
            return Err(PartyError::MissingItem(item.to_owned()));
        }
        let member = self
            .members
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(PartyError::UnknownMember(id))?;

        let previous = member.set_equipment(Some(item.to_owned()));
        clamp_hp(catalog, config, member);
        self.take_item(item);
        if let Some(previous) = &previous {
            self.add_item(previous.clone(), 1);
        }
        Ok(previous)
    }

    pub fn unequip(
        &mut self,
        catalog: &Catalog,
        config: &BattleConfig,
        id: BattlerId,
    ) -> Result<Option<String>, PartyError> {
        let member = self
            .members
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(PartyError::UnknownMember(id))?;
        let previous = member.set_equipment(None);
        clamp_hp(catalog, config, member);
        if let Some(previous) = &previous {
            self.add_item(previous.clone(), 1);
        }
        Ok(previous)
    }

    // ===== stock =====

    pub fn add_item(&mut self, item: impl Into<String>, count: u32) {
        let entry = self.inventory.entry(item.into()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn item_count(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> impl Iterator<Item = (&str, u32)> {
        self.inventory.iter().map(|(id, count)| (id.as_str(), *count))
    }

    fn take_item(&mut self, item: &str) {
        if let Some(count) = self.inventory.get_mut(item) {
            *count -= 1;
            if *count == 0 {
                self.inventory.remove(item);
            }
        }
    }

    pub fn gain_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    // ===== battle hand-off =====

    /// Copies of every member, in formation order, for a battle roster.
    pub fn deploy(&self) -> Vec<Battler> {
        self.members().into_iter().cloned().collect()
    }

    /// Writes battle results back onto matching members.
    ///
    /// Battlers that are not party members are ignored.
    pub fn absorb(&mut self, battlers: Vec<Battler>) {
        for battler in battlers {
            if let Some(member) = self.members.iter_mut().find(|b| b.id == battler.id) {
                *member = battler;
            }
        }
    }

    /// Banks the gold from a victory. Experience is already on the battlers.
    pub fn apply_rewards(&mut self, rewards: &Rewards) {
        self.gain_gold(rewards.gold);
    }
}

fn clamp_hp(catalog: &Catalog, config: &BattleConfig, member: &mut Battler) {
    let sheet = catalog.sheet(member, config);
    let (hp, mp) = (member.hp(), member.mp());
    member.set_hp(hp, sheet.mhp);
    member.set_mp(mp, sheet.mmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Param, SpeciesDef};
    use crate::traits::{EquipmentDef, Trait, TraitCode};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .species
            .register(SpeciesDef::new("squire").with_hp(20.0, 0.0));
        catalog.equipment.register(
            EquipmentDef::new("amulet").with_trait(Trait::new(TraitCode::HpBonusPercent, 0.5)),
        );
        catalog
    }

    #[test]
    fn formation_holds_six_members() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        for slot in 0..6 {
            let id = party.add_actor(&catalog, &config, "squire", 1).unwrap();
            assert_eq!(party.member(id).unwrap().slot_index, slot);
        }
        assert_eq!(
            party.add_actor(&catalog, &config, "squire", 1),
            Err(PartyError::Full { max: 6 })
        );
    }

    #[test]
    fn removed_member_frees_its_slot() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        let first = party.add_actor(&catalog, &config, "squire", 1).unwrap();
        party.add_actor(&catalog, &config, "squire", 1).unwrap();
        party.remove_actor(first).unwrap();

        let third = party.add_actor(&catalog, &config, "squire", 1).unwrap();
        assert_eq!(party.member(third).unwrap().slot_index, 0);
        assert_ne!(third, first);
    }

    #[test]
    fn swap_order_moves_members_between_rows() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        let id = party.add_actor(&catalog, &config, "squire", 1).unwrap();

        party.swap_order(0, 4).unwrap();
        assert!(!party.member(id).unwrap().is_front_row());
        assert_eq!(
            party.swap_order(0, 6),
            Err(PartyError::SlotOutOfRange { slot: 6, max: 6 })
        );
    }

    #[test]
    fn unequip_clamps_hp_to_new_maximum() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        let id = party.add_actor(&catalog, &config, "squire", 1).unwrap();
        party.add_item("amulet", 1);

        party.equip(&catalog, &config, id, "amulet").unwrap();
        assert_eq!(party.item_count("amulet"), 0);
        let member = party.members.iter_mut().find(|b| b.id == id).unwrap();
        let mhp = catalog.sheet(member, &config).param(Param::Mhp);
        assert_eq!(mhp, 30);
        member.set_hp(30, mhp);

        assert_eq!(
            party.unequip(&catalog, &config, id).unwrap(),
            Some("amulet".to_string())
        );
        assert_eq!(party.member(id).unwrap().hp(), 20);
        assert_eq!(party.item_count("amulet"), 1);
    }

    #[test]
    fn equip_requires_stock() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        let id = party.add_actor(&catalog, &config, "squire", 1).unwrap();
        assert_eq!(
            party.equip(&catalog, &config, id, "amulet"),
            Err(PartyError::MissingItem("amulet".into()))
        );
    }

    #[test]
    fn absorb_writes_back_battle_state() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut party = Party::new();
        let id = party.add_actor(&catalog, &config, "squire", 1).unwrap();

        let mut roster = party.deploy();
        roster[0].set_hp(4, 20);
        roster[0].exp = 50;
        party.absorb(roster);

        let member = party.member(id).unwrap();
        assert_eq!(member.hp(), 4);
        assert_eq!(member.exp, 50);
    }

    #[test]
    fn rewards_bank_gold() {
        let mut party = Party::new();
        party.gain_gold(5);
        party.apply_rewards(&Rewards {
            gold: 40,
            exp: 10,
            allies: Vec::new(),
        });
        assert_eq!(party.gold, 45);
    }
}
