//! Atomic stat and behaviour modifiers.
//!
//! A [`Trait`] is one `{code, data_id, value}` triple attached to a species,
//! a passive or an equipment definition. A battler's effective traits are the
//! concatenation of every bound source (see [`TraitSource`]), gathered into a
//! [`TraitSet`] that answers aggregation queries.

mod sources;

pub use sources::{EquipmentDef, PassiveDef, TraitSource};

/// Kind of modifier a trait carries.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraitCode {
    // ===== parameter modifiers (data_id = param name) =====
    ParamPlus,
    ParamRate,

    // ===== defensive rates =====
    /// Damage multiplier against an element (data_id = element).
    ElementRate,
    /// Multiplier on the chance of receiving a status (data_id = status).
    StateRate,
    /// Immunity to a status (data_id = status).
    StateResist,

    // ===== attack modifiers =====
    /// Element used by actions that declare none.
    AttackElement,
    /// Chance (value) to inflict a status (data_id) on damaging hits.
    AttackState,
    AttackSpeed,

    // ===== derived stat bonuses =====
    HpBonusPercent,
    CritBonusPercent,
    XpBonusPercent,
    PowerBonus,
    SpeedBonus,
    HitBonus,
    EvaBonus,
    /// Replaces the battler's elements with data_id.
    ElementChange,

    // ===== triggers =====
    /// Holder heals `value` at the start of its own turn.
    HpRegen,
    /// Holder heals `value` whenever any battler starts a turn.
    TurnHeal,
    PostBattleHeal,
    PostBattleLeech,
    /// Each evasion adds one point of power, up to half the holder's level.
    EvadeBonus,
    /// Casts skill data_id on all living opponents when the holder dies.
    OnDeathCast,
    /// Chance (value) to return at full hp on KO; the equipped item breaks.
    ReviveOnKo,
    /// Survive one KO per battle at 1 hp.
    SurviveKo,
}

/// One atomic modifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trait {
    pub code: TraitCode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub data_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: f64,
}

impl Trait {
    pub fn new(code: TraitCode, value: f64) -> Self {
        Self {
            code,
            data_id: None,
            value,
        }
    }

    pub fn with_data(code: TraitCode, data_id: impl Into<String>, value: f64) -> Self {
        Self {
            code,
            data_id: Some(data_id.into()),
            value,
        }
    }

    fn matches(&self, code: TraitCode, data_id: Option<&str>) -> bool {
        self.code == code && self.data_id.as_deref() == data_id
    }
}

/// Flattened traits of one battler, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraitSet {
    traits: Vec<Trait>,
}

impl TraitSet {
    pub fn new(traits: Vec<Trait>) -> Self {
        Self { traits }
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.traits.iter()
    }

    /// Sum of values for `code` with exactly `data_id`.
    pub fn sum(&self, code: TraitCode, data_id: Option<&str>) -> f64 {
        self.traits
            .iter()
            .filter(|t| t.matches(code, data_id))
            .map(|t| t.value)
            .sum()
    }

    /// Sum of values for `code` regardless of data id.
    pub fn sum_all(&self, code: TraitCode) -> f64 {
        self.filter_by_code(code).map(|t| t.value).sum()
    }

    /// Product of values for `code` with exactly `data_id` (1 when none).
    pub fn product(&self, code: TraitCode, data_id: Option<&str>) -> f64 {
        self.traits
            .iter()
            .filter(|t| t.matches(code, data_id))
            .map(|t| t.value)
            .product()
    }

    pub fn filter_by_code(&self, code: TraitCode) -> impl Iterator<Item = &Trait> {
        self.traits.iter().filter(move |t| t.code == code)
    }

    pub fn has(&self, code: TraitCode) -> bool {
        self.traits.iter().any(|t| t.code == code)
    }

    /// Data id of the last trait with `code`.
    pub fn last_data(&self, code: TraitCode) -> Option<&str> {
        self.filter_by_code(code)
            .filter_map(|t| t.data_id.as_deref())
            .last()
    }
}

impl FromIterator<Trait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = Trait>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
