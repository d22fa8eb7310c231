//! Victory rewards and experience gain.

use crate::config::BattleConfig;
use crate::registry::Catalog;
use crate::stats::{Battler, BattlerId, LevelUp, exp_for_level};

/// Experience granted to one ally.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllyReward {
    pub unit: BattlerId,
    pub exp: u32,
    pub level_ups: Vec<LevelUp>,
}

/// Everything granted by a victory.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rewards {
    pub gold: u32,
    /// Base experience before per-ally bonuses.
    pub exp: u32,
    pub allies: Vec<AllyReward>,
}

/// `(gold, base exp)` for defeating `enemy_count` enemies on `floor`.
pub fn victory_payout(config: &BattleConfig, enemy_count: u32, floor: u32) -> (u32, u32) {
    (
        enemy_count * config.gold_per_enemy * floor,
        enemy_count * config.xp_per_enemy * floor,
    )
}

/// Adds experience, levelling up while the next threshold is reached.
///
/// Each level gained fully restores hp and mp. Levels stop at
/// `config.max_level`.
pub fn gain_exp(
    catalog: &Catalog,
    config: &BattleConfig,
    battler: &mut Battler,
    amount: u32,
) -> Vec<LevelUp> {
    let curve = catalog.species_of(battler).xp_curve();
    battler.exp = battler.exp.saturating_add(amount);

    let mut level_ups = Vec::new();
    while battler.level < config.max_level
        && battler.exp >= exp_for_level(curve, battler.level + 1)
    {
        let from = battler.level;
        battler.level += 1;
        let sheet = catalog.sheet(battler, config);
        battler.recover_all(&sheet);
        tracing::debug!(unit = %battler.id, level = battler.level, "level up");
        level_ups.push(LevelUp {
            from,
            to: battler.level,
        });
    }
    level_ups
}
