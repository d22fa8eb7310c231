//! Applying effect results to battlers, including knock-out handling.

use crate::action::{EffectKind, EffectResult};
use crate::battle::{Battle, BattleEvent};
use crate::rng::RandomSource;
use crate::stats::{BattlerId, Param, exp_for_level};
use crate::traits::TraitCode;

impl<R: RandomSource> Battle<'_, R> {
    /// Mutates the target of `result`. Knock-outs resolve immediately.
    pub(super) fn apply_result(&mut self, user: BattlerId, result: &EffectResult) {
        self.events.push(BattleEvent::EffectApplied {
            user,
            result: result.clone(),
        });

        let id = result.target;
        if result.is_miss {
            self.events.push(BattleEvent::UnitEvaded { unit: id });
            self.on_evade(id);
            return;
        }

        let Some(target) = self.session.battler(id) else {
            return;
        };
        let sheet = self.catalog.sheet(target, self.config);
        let curve = self.catalog.species_of(target).xp_curve();
        let max_level = self.config.max_level;
        let Some(target) = self.session.battler_mut(id) else {
            return;
        };

        match result.effect {
            EffectKind::HpDamage => {
                if !target.is_alive() {
                    return;
                }
                target.change_hp(-result.value, sheet.mhp);
                if !target.is_alive() {
                    self.knock_out(id);
                }
            }
            EffectKind::HpHeal | EffectKind::HpHealRatio => {
                if target.is_alive() {
                    target.change_hp(result.value, sheet.mhp);
                }
            }
            EffectKind::Revive => {
                if !target.is_alive() {
                    target.set_hp(result.value.max(1), sheet.mhp);
                    let hp = target.hp();
                    self.events.push(BattleEvent::UnitRevived { unit: id, hp });
                }
            }
            EffectKind::AddStatus => {
                if let Some(status) = &result.status
                    && target.is_alive()
                {
                    target.add_state(status.clone());
                }
            }
            EffectKind::IncreaseMaxHp => {
                target.add_param_plus(Param::Mhp, result.value);
                if target.is_alive() {
                    target.change_hp(result.value, sheet.mhp + result.value);
                }
            }
            EffectKind::IncreaseLevel => {
                let level = (target.level as i64 + i64::from(result.value))
                    .clamp(1, i64::from(max_level)) as u32;
                target.level = level;
                target.exp = target.exp.max(exp_for_level(curve, level));
            }
            EffectKind::Miss => {}
        }
    }

    /// Runs survival and revival traits, then finalizes the death.
    fn knock_out(&mut self, id: BattlerId) {
        let Some(target) = self.session.battler(id) else {
            return;
        };
        let traits = self.catalog.traits_of(target);

        if traits.has(TraitCode::SurviveKo) && !target.survive_ko_used {
            let mhp = self.catalog.sheet_with(target, &traits, self.config).mhp;
            if let Some(target) = self.session.battler_mut(id) {
                target.survive_ko_used = true;
                target.set_hp(1, mhp);
            }
            tracing::debug!(unit = %id, "survived knock-out");
            self.events.push(BattleEvent::UnitSurvived { unit: id });
            return;
        }

        let revive_chance = traits
            .filter_by_code(TraitCode::ReviveOnKo)
            .map(|t| if t.value > 0.0 { t.value } else { 1.0 })
            .fold(0.0, f64::max);
        if revive_chance > 0.0 && self.rng.chance(revive_chance) {
            self.revive_from_ko(id);
            return;
        }

        tracing::debug!(unit = %id, "unit died");
        self.events.push(BattleEvent::UnitDied { unit: id });
        for t in traits.filter_by_code(TraitCode::OnDeathCast) {
            if let Some(skill) = &t.data_id {
                self.pending_casts.push((id, skill.clone()));
            }
        }
    }

    /// Returns the unit at full hp; an equipped item granting the revival breaks.
    fn revive_from_ko(&mut self, id: BattlerId) {
        let breaks = self
            .session
            .battler(id)
            .and_then(|b| b.equipment())
            .and_then(|item| self.catalog.equipment.get(item))
            .filter(|def| def.traits().iter().any(|t| t.code == TraitCode::ReviveOnKo))
            .map(|def| def.id.clone());

        let Some(target) = self.session.battler_mut(id) else {
            return;
        };
        if let Some(item) = breaks {
            target.set_equipment(None);
            self.events.push(BattleEvent::EquipmentBroken { unit: id, item });
        }

        let Some(target) = self.session.battler(id) else {
            return;
        };
        let mhp = self.catalog.sheet(target, self.config).mhp;
        let Some(target) = self.session.battler_mut(id) else {
            return;
        };
        target.set_hp(mhp, mhp);
        tracing::debug!(unit = %id, "revived on knock-out");
        self.events.push(BattleEvent::UnitRevived { unit: id, hp: mhp });
        self.events.push(BattleEvent::TraitTriggered {
            unit: id,
            code: TraitCode::ReviveOnKo,
            value: mhp,
        });
    }

    /// Resolves on-death casts queued during this turn, including chains.
    pub(super) fn flush_death_casts(&mut self) {
        while !self.pending_casts.is_empty() {
            let (caster, skill) = self.pending_casts.remove(0);
            let Some(side) = self.session.side_of(caster) else {
                continue;
            };
            let targets: Vec<BattlerId> = self
                .session
                .living(side.opposite())
                .iter()
                .map(|b| b.id)
                .collect();
            if targets.is_empty() {
                continue;
            }
            let action = self.catalog.action(&skill);
            tracing::debug!(unit = %caster, skill = %skill, "on-death cast");
            self.events.push(BattleEvent::TraitTriggered {
                unit: caster,
                code: TraitCode::OnDeathCast,
                value: targets.len() as i32,
            });
            self.execute(caster, &action.def, &targets);
        }
    }
}
