//! Runtime combatant record.

use std::collections::BTreeSet;

use crate::config::BattleConfig;
use crate::element::Element;
use crate::stats::{Param, SpeciesDef, StatSheet, Temperament};

/// Transient state that halves incoming damage until the next round.
pub const GUARDING: &str = "guarding";

/// Unique id of a battler within a party or encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlerId(pub u32);

impl std::fmt::Display for BattlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actor/enemy specific data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlerKind {
    /// Party member. Equipment contributes traits.
    Actor { equipment: Option<String> },
    /// Encounter enemy. Base params are multiplied by `scale`.
    Enemy { scale: f64 },
}

/// Per-parameter buff stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buffs([i8; Param::COUNT]);

impl Buffs {
    pub fn stage(&self, param: Param) -> i8 {
        self.0[param.index()]
    }

    /// Shifts a stage by `delta`, clamped to the configured range.
    pub fn shift(&mut self, param: Param, delta: i8) {
        let max = BattleConfig::MAX_BUFF_STAGE;
        let slot = &mut self.0[param.index()];
        *slot = slot.saturating_add(delta).clamp(-max, max);
    }

    pub fn rate(&self, param: Param) -> f64 {
        1.0 + BattleConfig::BUFF_RATE_PER_STAGE * f64::from(self.stage(param))
    }

    pub fn clear(&mut self) {
        self.0 = [0; Param::COUNT];
    }
}

/// A combatant: species template plus mutable battle state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battler {
    pub id: BattlerId,
    pub name: String,
    pub species: String,
    pub kind: BattlerKind,
    pub level: u32,
    pub exp: u32,
    hp: i32,
    mp: i32,
    states: BTreeSet<String>,
    pub buffs: Buffs,
    /// Permanent flat bonuses (stat-increasing items).
    plus: [i32; Param::COUNT],
    pub passives: Vec<String>,
    pub elements: Vec<Element>,
    pub temperament: Temperament,
    /// Action rows: `[front, back]`.
    pub acts: [Vec<String>; 2],
    /// Formation position; slots below `FRONT_ROW_SIZE` are the front row.
    pub slot_index: u8,
    /// Power gained from evasions this battle.
    pub evade_bonus: i32,
    pub survive_ko_used: bool,
}

impl Battler {
    /// Creates a battler from a resolved species with empty hp/mp.
    ///
    /// Call [`Battler::recover_all`] once its stat sheet is known.
    pub fn new(
        id: BattlerId,
        species: &SpeciesDef,
        kind: BattlerKind,
        level: u32,
        slot_index: u8,
    ) -> Self {
        Self {
            id,
            name: species.name().to_owned(),
            species: species.id.clone(),
            kind,
            level: level.max(1),
            exp: 0,
            hp: 0,
            mp: 0,
            states: BTreeSet::new(),
            buffs: Buffs::default(),
            plus: [0; Param::COUNT],
            passives: species.passives().to_vec(),
            elements: species.elements().to_vec(),
            temperament: species.temperament(),
            acts: species.act_rows(),
            slot_index,
            evade_bonus: 0,
            survive_ko_used: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_actor(&self) -> bool {
        matches!(self.kind, BattlerKind::Actor { .. })
    }

    pub fn equipment(&self) -> Option<&str> {
        match &self.kind {
            BattlerKind::Actor { equipment } => equipment.as_deref(),
            BattlerKind::Enemy { .. } => None,
        }
    }

    /// Replaces the equipped item, returning the previous one.
    ///
    /// Enemies carry no equipment; the call is a no-op for them.
    pub fn set_equipment(&mut self, item: Option<String>) -> Option<String> {
        match &mut self.kind {
            BattlerKind::Actor { equipment } => std::mem::replace(equipment, item),
            BattlerKind::Enemy { .. } => None,
        }
    }

    pub fn scale(&self) -> f64 {
        match self.kind {
            BattlerKind::Enemy { scale } => scale,
            BattlerKind::Actor { .. } => 1.0,
        }
    }

    pub fn is_front_row(&self) -> bool {
        self.slot_index < BattleConfig::FRONT_ROW_SIZE
    }

    // ===== resources =====

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Sets hp clamped to `[0, mhp]`.
    pub fn set_hp(&mut self, hp: i32, mhp: i32) {
        self.hp = hp.clamp(0, mhp.max(0));
    }

    /// Sets mp clamped to `[0, mmp]`.
    pub fn set_mp(&mut self, mp: i32, mmp: i32) {
        self.mp = mp.clamp(0, mmp.max(0));
    }

    /// Adds `amount` hp (negative to damage), clamped. Returns the change.
    pub fn change_hp(&mut self, amount: i32, mhp: i32) -> i32 {
        let before = self.hp;
        self.set_hp(self.hp.saturating_add(amount), mhp);
        self.hp - before
    }

    pub fn recover_all(&mut self, sheet: &StatSheet) {
        self.hp = sheet.mhp;
        self.mp = sheet.mmp;
    }

    // ===== states =====

    pub fn add_state(&mut self, state: impl Into<String>) {
        self.states.insert(state.into());
    }

    pub fn remove_state(&mut self, state: &str) -> bool {
        self.states.remove(state)
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    pub fn is_guarding(&self) -> bool {
        self.has_state(GUARDING)
    }

    // ===== permanent bonuses =====

    pub fn param_plus(&self, param: Param) -> i32 {
        self.plus[param.index()]
    }

    pub fn add_param_plus(&mut self, param: Param, amount: i32) {
        let slot = &mut self.plus[param.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Clears per-battle counters and transient state.
    pub fn reset_battle_state(&mut self) {
        self.evade_bonus = 0;
        self.survive_ko_used = false;
        self.buffs.clear();
        self.remove_state(GUARDING);
    }
}
