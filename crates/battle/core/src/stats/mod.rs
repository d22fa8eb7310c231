//! Battler stat model.
//!
//! # Layers
//!
//! ```text
//! Species curve (base_hp, hp_growth, atk, ...) × enemy scale
//!     ↓
//! + permanent flat bonus + Σ ParamPlus traits
//!     ↓
//! × Π ParamRate traits × buff rate
//!     ↓
//! StatSheet (mhp, atk, cri, speed, ...)
//! ```
//!
//! Stored battler fields stay minimal (level, exp, hp, mp, states, buffs);
//! everything else is recomputed into a [`StatSheet`] snapshot when needed.

mod battler;
mod growth;
mod species;

pub use battler::{Battler, BattlerId, BattlerKind, Buffs, GUARDING};
pub use growth::{LevelUp, exp_for_level, grown_value};
pub use species::{SpeciesDef, Temperament};

use crate::config::BattleConfig;
use crate::element::Element;
use crate::formula::{Attribute, Scope};
use crate::traits::{TraitCode, TraitSet};

/// Core parameter.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    Mhp,
    Mmp,
    Atk,
    Def,
    Mat,
    Mdf,
    Agi,
    Luk,
}

impl Param {
    pub const COUNT: usize = 8;

    pub const ALL: [Param; Self::COUNT] = [
        Self::Mhp,
        Self::Mmp,
        Self::Atk,
        Self::Def,
        Self::Mat,
        Self::Mdf,
        Self::Agi,
        Self::Luk,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unscaled species value at `level`.
    fn base(self, species: &SpeciesDef, level: u32) -> f64 {
        let flat = |v: Option<f64>| v.unwrap_or(SpeciesDef::DEFAULT_PARAM);
        match self {
            Self::Mhp => grown_value(species.base_hp(), species.hp_growth(), level),
            Self::Mmp => grown_value(species.base_mp(), species.mp_growth(), level),
            Self::Atk => flat(species.atk),
            Self::Def => flat(species.def),
            Self::Mat => flat(species.mat),
            Self::Mdf => flat(species.mdf),
            Self::Agi => flat(species.agi),
            Self::Luk => flat(species.luk),
        }
    }
}

/// Snapshot of every derived value of one battler.
///
/// Computed from the battler, its resolved species and its aggregated traits.
/// Effects read the snapshot taken when the action starts, so mid-action
/// changes do not feed back into the same action.
#[derive(Clone, Debug, PartialEq)]
pub struct StatSheet {
    pub level: u32,
    pub exp: u32,
    pub hp: i32,
    pub mp: i32,
    pub mhp: i32,
    pub mmp: i32,
    pub atk: i32,
    pub def: i32,
    pub mat: i32,
    pub mdf: i32,
    pub agi: i32,
    pub luk: i32,
    pub cri: f64,
    pub hit: f64,
    pub eva: f64,
    pub power: i32,
    pub speed: i32,
    pub xp_rate: f64,
    pub elements: Vec<Element>,
}

impl StatSheet {
    pub fn compute(
        battler: &Battler,
        species: &SpeciesDef,
        traits: &TraitSet,
        config: &BattleConfig,
    ) -> Self {
        let param = |p: Param| param_value(battler, species, traits, p);
        let agi = param(Param::Agi);

        let elements = match traits.last_data(TraitCode::ElementChange) {
            Some(tag) => tag
                .parse::<Element>()
                .map(|e| vec![e])
                .unwrap_or_else(|_| battler.elements.clone()),
            None => battler.elements.clone(),
        };

        Self {
            level: battler.level,
            exp: battler.exp,
            hp: battler.hp(),
            mp: battler.mp(),
            mhp: param(Param::Mhp),
            mmp: param(Param::Mmp),
            atk: param(Param::Atk),
            def: param(Param::Def),
            mat: param(Param::Mat),
            mdf: param(Param::Mdf),
            agi,
            luk: param(Param::Luk),
            cri: config.base_crit + traits.sum_all(TraitCode::CritBonusPercent),
            hit: config.base_hit + traits.sum_all(TraitCode::HitBonus),
            eva: config.base_eva + traits.sum_all(TraitCode::EvaBonus),
            power: traits.sum_all(TraitCode::PowerBonus).round() as i32 + battler.evade_bonus,
            speed: agi
                + (traits.sum_all(TraitCode::SpeedBonus) + traits.sum_all(TraitCode::AttackSpeed))
                    .round() as i32,
            xp_rate: traits.sum_all(TraitCode::XpBonusPercent),
            elements,
        }
    }

    pub fn param(&self, param: Param) -> i32 {
        match param {
            Param::Mhp => self.mhp,
            Param::Mmp => self.mmp,
            Param::Atk => self.atk,
            Param::Def => self.def,
            Param::Mat => self.mat,
            Param::Mdf => self.mdf,
            Param::Agi => self.agi,
            Param::Luk => self.luk,
        }
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.mhp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.mhp)
    }
}

impl Scope for StatSheet {
    fn attribute(&self, attr: Attribute) -> f64 {
        match attr {
            Attribute::Level => f64::from(self.level),
            Attribute::Exp => f64::from(self.exp),
            Attribute::Hp => f64::from(self.hp),
            Attribute::Mp => f64::from(self.mp),
            Attribute::Mhp => f64::from(self.mhp),
            Attribute::Mmp => f64::from(self.mmp),
            Attribute::Atk => f64::from(self.atk),
            Attribute::Def => f64::from(self.def),
            Attribute::Mat => f64::from(self.mat),
            Attribute::Mdf => f64::from(self.mdf),
            Attribute::Agi => f64::from(self.agi),
            Attribute::Luk => f64::from(self.luk),
            Attribute::Cri => self.cri,
            Attribute::Eva => self.eva,
            Attribute::Hit => self.hit,
            Attribute::Power => f64::from(self.power),
            Attribute::Speed => f64::from(self.speed),
        }
    }
}

/// `round(max(0, (base + plus + Σ ParamPlus) × Π ParamRate × buff))`.
fn param_value(battler: &Battler, species: &SpeciesDef, traits: &TraitSet, param: Param) -> i32 {
    let id = Some(param.as_ref());
    let mut base = param.base(species, battler.level) * battler.scale();
    if param == Param::Mhp {
        base *= 1.0 + traits.sum_all(TraitCode::HpBonusPercent);
    }
    let flat = base + f64::from(battler.param_plus(param)) + traits.sum(TraitCode::ParamPlus, id);
    let rated = flat * traits.product(TraitCode::ParamRate, id) * battler.buffs.rate(param);
    rated.max(0.0).round() as i32
}
