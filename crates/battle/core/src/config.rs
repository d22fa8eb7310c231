/// Combat tuning parameters.
///
/// Every field has a default so a partial `config.toml` only needs to name
/// the values it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Gold granted per defeated enemy, multiplied by the floor number.
    pub gold_per_enemy: u32,
    /// Experience granted per defeated enemy, multiplied by the floor number.
    pub xp_per_enemy: u32,
    /// Damage multiplier applied on a critical hit.
    pub crit_multiplier: f64,
    pub base_crit: f64,
    pub base_hit: f64,
    pub base_eva: f64,
    /// Same-element attack bonus.
    pub stab_multiplier: f64,
    /// Fraction of max hp restored to survivors after a victory.
    pub post_battle_heal_ratio: f64,
    /// Kind battlers heal a friend whose hp falls below this fraction of max hp.
    pub kind_heal_threshold: f64,
    pub max_level: u32,
}

impl BattleConfig {
    /// Formation slots per row. Slots `0..FRONT_ROW_SIZE` form the front row.
    pub const FRONT_ROW_SIZE: u8 = 3;
    /// Total formation slots per side.
    pub const FORMATION_SLOTS: u8 = 6;
    /// Buff stages are clamped to `-MAX_BUFF_STAGE..=MAX_BUFF_STAGE`.
    pub const MAX_BUFF_STAGE: i8 = 2;
    pub const BUFF_RATE_PER_STAGE: f64 = 0.25;

    pub const DEFAULT_GOLD_PER_ENEMY: u32 = 20;
    pub const DEFAULT_XP_PER_ENEMY: u32 = 5;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_BASE_CRIT: f64 = 0.05;
    pub const DEFAULT_BASE_HIT: f64 = 0.95;
    pub const DEFAULT_BASE_EVA: f64 = 0.05;
    pub const DEFAULT_STAB_MULTIPLIER: f64 = 1.25;
    pub const DEFAULT_POST_BATTLE_HEAL_RATIO: f64 = 0.25;
    pub const DEFAULT_KIND_HEAL_THRESHOLD: f64 = 0.6;
    pub const DEFAULT_MAX_LEVEL: u32 = 99;

    pub fn new() -> Self {
        Self {
            gold_per_enemy: Self::DEFAULT_GOLD_PER_ENEMY,
            xp_per_enemy: Self::DEFAULT_XP_PER_ENEMY,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            base_crit: Self::DEFAULT_BASE_CRIT,
            base_hit: Self::DEFAULT_BASE_HIT,
            base_eva: Self::DEFAULT_BASE_EVA,
            stab_multiplier: Self::DEFAULT_STAB_MULTIPLIER,
            post_battle_heal_ratio: Self::DEFAULT_POST_BATTLE_HEAL_RATIO,
            kind_heal_threshold: Self::DEFAULT_KIND_HEAL_THRESHOLD,
            max_level: Self::DEFAULT_MAX_LEVEL,
        }
    }

    /// Config with critical hits disabled, for deterministic damage checks.
    #[must_use]
    pub fn without_crits(mut self) -> Self {
        self.base_crit = 0.0;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
