//! Trait-driven reactions at turn start, on evasion and after victory.

use crate::battle::{Battle, BattleEvent, Side};
use crate::config::BattleConfig;
use crate::rng::RandomSource;
use crate::stats::BattlerId;
use crate::traits::TraitCode;

/// Whether two formation slots touch: neighbours within a row, or the same
/// column across rows.
pub(crate) fn adjacent(a: u8, b: u8) -> bool {
    let row = BattleConfig::FRONT_ROW_SIZE;
    if a / row == b / row {
        a.abs_diff(b) == 1
    } else {
        a.abs_diff(b) == row
    }
}

impl<R: RandomSource> Battle<'_, R> {
    /// Heals every living `TurnHeal` holder, then the actor's own `HpRegen`.
    pub(super) fn turn_start_triggers(&mut self, actor: BattlerId) {
        let ids: Vec<BattlerId> = self
            .session
            .allies
            .iter()
            .chain(&self.session.enemies)
            .filter(|b| b.is_alive())
            .map(|b| b.id)
            .collect();

        for id in ids {
            self.heal_by_trait(id, TraitCode::TurnHeal);
        }
        self.heal_by_trait(actor, TraitCode::HpRegen);
    }

    fn heal_by_trait(&mut self, id: BattlerId, code: TraitCode) {
        let Some(battler) = self.session.battler(id).filter(|b| b.is_alive()) else {
            return;
        };
        let traits = self.catalog.traits_of(battler);
        let amount = traits.sum_all(code).round() as i32;
        if amount <= 0 {
            return;
        }
        let mhp = self.catalog.sheet_with(battler, &traits, self.config).mhp;
        let Some(battler) = self.session.battler_mut(id) else {
            return;
        };
        let healed = battler.change_hp(amount, mhp);
        if healed > 0 {
            self.events.push(BattleEvent::TraitTriggered {
                unit: id,
                code,
                value: healed,
            });
        }
    }

    /// Grows the evasion power bonus, capped at half the unit's level.
    pub(super) fn on_evade(&mut self, id: BattlerId) {
        let Some(battler) = self.session.battler(id) else {
            return;
        };
        if !self.catalog.traits_of(battler).has(TraitCode::EvadeBonus) {
            return;
        }
        let Some(battler) = self.session.battler_mut(id) else {
            return;
        };
        let cap = (battler.level / 2) as i32;
        if battler.evade_bonus < cap {
            battler.evade_bonus += 1;
            let value = battler.evade_bonus;
            self.events.push(BattleEvent::TraitTriggered {
                unit: id,
                code: TraitCode::EvadeBonus,
                value,
            });
        }
    }

    /// Post-victory heals and leeches for the surviving allies.
    pub(super) fn battle_end_triggers(&mut self) {
        let survivors: Vec<BattlerId> = self
            .session
            .living(Side::Ally)
            .iter()
            .map(|b| b.id)
            .collect();

        for id in survivors {
            let Some(battler) = self.session.battler(id).filter(|b| b.is_alive()) else {
                continue;
            };
            let traits = self.catalog.traits_of(battler);
            let mhp = self.catalog.sheet_with(battler, &traits, self.config).mhp;
            let level = battler.level;

            for t in traits.filter_by_code(TraitCode::PostBattleHeal) {
                let amount = if t.value > 0.0 {
                    t.value.round() as i32
                } else {
                    let r = self.rng.next_f64();
                    (r * r * f64::from(level)).floor() as i32 + 1
                };
                if let Some(battler) = self.session.battler_mut(id) {
                    let healed = battler.change_hp(amount, mhp);
                    self.events.push(BattleEvent::TraitTriggered {
                        unit: id,
                        code: TraitCode::PostBattleHeal,
                        value: healed,
                    });
                }
            }

            let leech = traits.sum_all(TraitCode::PostBattleLeech).round() as i32;
            if leech > 0 {
                self.leech_neighbours(id, leech, mhp);
            }
        }
    }

    /// Drains `amount` from each adjacent living ally, never below 1 hp, and
    /// heals the holder for half the total drained.
    fn leech_neighbours(&mut self, id: BattlerId, amount: i32, mhp: i32) {
        let Some(slot) = self.session.battler(id).map(|b| b.slot_index) else {
            return;
        };
        let mut total = 0;
        for neighbour in self
            .session
            .allies
            .iter_mut()
            .filter(|b| b.id != id && b.is_alive() && adjacent(b.slot_index, slot))
        {
            let hp = neighbour.hp();
            let drain = amount.min(hp - 1).max(0);
            neighbour.set_hp(hp - drain, hp);
            total += drain;
        }

        let Some(battler) = self.session.battler_mut(id) else {
            return;
        };
        let healed = battler.change_hp(total / 2, mhp);
        tracing::debug!(unit = %id, drained = total, healed, "post-battle leech");
        self.events.push(BattleEvent::TraitTriggered {
            unit: id,
            code: TraitCode::PostBattleLeech,
            value: total,
        });
    }
}
