//! Per-target effect evaluation.
//!
//! [`ActionResolver`] binds an acting battler to an action and turns each
//! target into a list of [`EffectResult`]s. It never mutates anything: the
//! battle applies the results afterwards.
//!
//! # Damage pipeline
//!
//! ```text
//! max(0, formula) + power
//!     × offense / max(1, defense)
//!     × STAB (user shares the attack element)
//!     × elemental relation × target ElementRate
//!     → floor
//!     → crit roll (× crit multiplier, floor)
//!     → guard (÷ 2, floor)
//! ```

use crate::action::{ActionDef, EffectDef, EffectKind, EffectResult, StatSelector};
use crate::config::BattleConfig;
use crate::element::{Element, relation_rate};
use crate::error::report;
use crate::registry::Catalog;
use crate::rng::RandomSource;
use crate::stats::{Battler, StatSheet};
use crate::traits::{TraitCode, TraitSet};

/// An action bound to the battler performing it.
///
/// The user's stat sheet is captured once, when the resolver is built.
pub struct ActionResolver<'a> {
    catalog: &'a Catalog,
    config: &'a BattleConfig,
    action: &'a ActionDef,
    user: StatSheet,
    user_traits: TraitSet,
}

struct TargetView<'t> {
    battler: &'t Battler,
    sheet: StatSheet,
    traits: TraitSet,
}

impl<'a> ActionResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        config: &'a BattleConfig,
        subject: &Battler,
        action: &'a ActionDef,
    ) -> Self {
        let user_traits = catalog.traits_of(subject);
        let user = catalog.sheet_with(subject, &user_traits, config);
        Self {
            catalog,
            config,
            action,
            user,
            user_traits,
        }
    }

    pub fn action(&self) -> &ActionDef {
        self.action
    }

    pub fn user_sheet(&self) -> &StatSheet {
        &self.user
    }

    /// Evaluates every effect of the action against `target`.
    ///
    /// Actions carrying `hp_damage` first pass an evasion gate: the draw
    /// misses when it is at or above `max(0, hit - eva)`, producing a single
    /// miss result.
    pub fn apply<R: RandomSource + ?Sized>(
        &self,
        target: &Battler,
        rng: &mut R,
    ) -> Vec<EffectResult> {
        let traits = self.catalog.traits_of(target);
        let view = TargetView {
            battler: target,
            sheet: self.catalog.sheet_with(target, &traits, self.config),
            traits,
        };

        if self.action.deals_damage() {
            let hit_chance = (self.user.hit - view.sheet.eva).max(0.0);
            let roll = rng.next_f64();
            tracing::trace!(action = %self.action.id, hit_chance, roll, "evasion roll");
            if roll >= hit_chance {
                return vec![EffectResult::miss(target.id)];
            }
        }

        let mut results = Vec::new();
        for _ in 0..self.action.repeat() {
            for effect in self.action.effects() {
                let Some(kind) = effect.effect_kind() else {
                    tracing::warn!(
                        action = %self.action.id,
                        kind = %effect.kind,
                        "unknown effect kind skipped"
                    );
                    continue;
                };
                results.push(self.evaluate(kind, effect, &view, rng));
                if kind == EffectKind::HpDamage {
                    self.attack_states(&view, rng, &mut results);
                }
            }
        }
        results
    }

    fn evaluate<R: RandomSource + ?Sized>(
        &self,
        kind: EffectKind,
        effect: &EffectDef,
        target: &TargetView<'_>,
        rng: &mut R,
    ) -> EffectResult {
        let id = target.battler.id;
        match kind {
            EffectKind::HpDamage => {
                let (value, is_crit) = self.damage(effect, target, rng);
                EffectResult::new(id, kind, value).with_crit(is_crit)
            }
            EffectKind::HpHeal => {
                let scale = f64::from(self.offense()) / 100.0;
                let value = (self.formula(effect, target).max(0.0) * scale).floor();
                EffectResult::new(id, kind, value as i32)
            }
            EffectKind::HpHealRatio | EffectKind::Revive => {
                let ratio = self.formula(effect, target);
                let value = (f64::from(target.sheet.mhp) * ratio).floor().max(0.0);
                EffectResult::new(id, kind, value as i32)
            }
            EffectKind::AddStatus => {
                let status = effect.status.as_deref().and_then(|status| {
                    self.status_lands(status, effect.chance(), target, rng)
                        .then(|| status.to_owned())
                });
                EffectResult::new(id, kind, 0).with_status(status)
            }
            EffectKind::IncreaseMaxHp | EffectKind::IncreaseLevel => {
                let value = self.formula(effect, target).max(0.0).floor();
                EffectResult::new(id, kind, value as i32)
            }
            EffectKind::Miss => EffectResult::miss(id),
        }
    }

    fn damage<R: RandomSource + ?Sized>(
        &self,
        effect: &EffectDef,
        target: &TargetView<'_>,
        rng: &mut R,
    ) -> (i32, bool) {
        let defense = match self.action.stat() {
            StatSelector::Atk => target.sheet.def,
            StatSelector::Mat => target.sheet.mdf,
        };

        let mut value = self.formula(effect, target).max(0.0) + f64::from(self.user.power);
        value *= f64::from(self.offense()) / f64::from(defense.max(1));

        if let Some(element) = self.attack_element() {
            if self.user.elements.contains(&element) {
                value *= self.config.stab_multiplier;
            }
            value *= relation_rate(element, &target.sheet.elements);
            value *= target
                .traits
                .product(TraitCode::ElementRate, Some(element.as_ref()));
        }

        let mut damage = value.floor();
        let is_crit = rng.chance(self.user.cri);
        if is_crit {
            damage = (damage * self.config.crit_multiplier).floor();
        }
        if target.battler.is_guarding() {
            damage = (damage / 2.0).floor();
        }
        (damage.max(0.0) as i32, is_crit)
    }

    /// Rolls each `AttackState` trait of the user after a damaging effect.
    fn attack_states<R: RandomSource + ?Sized>(
        &self,
        target: &TargetView<'_>,
        rng: &mut R,
        results: &mut Vec<EffectResult>,
    ) {
        for t in self.user_traits.filter_by_code(TraitCode::AttackState) {
            let Some(status) = t.data_id.as_deref() else {
                continue;
            };
            if self.status_lands(status, t.value, target, rng) {
                results.push(
                    EffectResult::new(target.battler.id, EffectKind::AddStatus, 0)
                        .with_status(Some(status.to_owned())),
                );
            }
        }
    }

    fn status_lands<R: RandomSource + ?Sized>(
        &self,
        status: &str,
        chance: f64,
        target: &TargetView<'_>,
        rng: &mut R,
    ) -> bool {
        let resisted = target
            .traits
            .filter_by_code(TraitCode::StateResist)
            .any(|t| t.data_id.as_deref() == Some(status));
        if resisted {
            return false;
        }
        let chance = chance * target.traits.product(TraitCode::StateRate, Some(status));
        rng.chance(chance)
    }

    fn offense(&self) -> i32 {
        match self.action.stat() {
            StatSelector::Atk => self.user.atk,
            StatSelector::Mat => self.user.mat,
        }
    }

    fn attack_element(&self) -> Option<Element> {
        self.action.element.or_else(|| {
            self.user_traits
                .last_data(TraitCode::AttackElement)
                .and_then(|tag| tag.parse().ok())
        })
    }

    /// Evaluates the effect formula; failures count as 0.
    fn formula(&self, effect: &EffectDef, target: &TargetView<'_>) -> f64 {
        let Some(source) = effect.formula.as_deref() else {
            return 0.0;
        };
        self.catalog
            .compile(source)
            .and_then(|formula| formula.evaluate(&self.user, &target.sheet))
            .unwrap_or_else(|err| {
                report(&err);
                0.0
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionCategory, TargetRule};
    use crate::rng::ScriptedRng;
    use crate::stats::{BattlerId, BattlerKind, GUARDING, SpeciesDef};
    use crate::traits::{PassiveDef, Trait};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.species.register(SpeciesDef::new("plain").with_hp(100.0, 0.0));
        catalog.species.register(
            SpeciesDef::new("ember")
                .with_hp(100.0, 0.0)
                .with_elements(&[Element::R]),
        );
        catalog.species.register(
            SpeciesDef::new("sprout")
                .with_hp(100.0, 0.0)
                .with_elements(&[Element::G]),
        );
        catalog
    }

    fn spawn(catalog: &Catalog, id: u32, species: &str) -> Battler {
        catalog
            .spawn(
                BattlerId(id),
                species,
                BattlerKind::Enemy { scale: 1.0 },
                1,
                0,
                &BattleConfig::default(),
            )
            .unwrap()
    }

    fn no_crit() -> BattleConfig {
        BattleConfig::default().without_crits()
    }

    /// Draw 0.0 always passes the evasion gate.
    fn sure_hit() -> ScriptedRng {
        ScriptedRng::constant(0.0)
    }

    #[test]
    fn level_one_attack_deals_six() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let attack = ActionDef::basic_attack();
        let results = ActionResolver::new(&catalog, &config, &user, &attack)
            .apply(&target, &mut sure_hit());
        assert_eq!(results, vec![EffectResult::new(BattlerId(2), EffectKind::HpDamage, 6)]);
    }

    #[test]
    fn hit_not_above_evasion_always_misses() {
        let catalog = catalog();
        let mut config = no_crit();
        config.base_hit = 0.3;
        config.base_eva = 0.3;
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let attack = ActionDef::basic_attack();
        let resolver = ActionResolver::new(&catalog, &config, &user, &attack);
        let results = resolver.apply(&target, &mut sure_hit());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_miss);
        assert_eq!(results[0].effect, EffectKind::Miss);
    }

    #[test]
    fn stab_and_element_multiply() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "ember");
        let target = spawn(&catalog, 2, "sprout");
        let fire = ActionDef::new("fire")
            .with_element(Element::R)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "16"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &fire).apply(&target, &mut sure_hit());
        // floor(16 * 1.25 * 1.25) = floor(25.0)
        assert_eq!(results[0].value, 25);
    }

    #[test]
    fn critical_hits_multiply_then_floor() {
        let catalog = catalog();
        let mut config = BattleConfig::default();
        config.base_crit = 1.0;
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let attack = ActionDef::new("jab").with_effect(EffectDef::new(EffectKind::HpDamage, "7"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &attack).apply(&target, &mut sure_hit());
        assert!(results[0].is_crit);
        assert_eq!(results[0].value, 10);
    }

    #[test]
    fn guarding_halves_damage() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let mut target = spawn(&catalog, 2, "plain");
        target.add_state(GUARDING);
        let attack = ActionDef::new("jab").with_effect(EffectDef::new(EffectKind::HpDamage, "7"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &attack).apply(&target, &mut sure_hit());
        assert_eq!(results[0].value, 3);
    }

    #[test]
    fn heal_scales_with_magic() {
        let catalog = catalog();
        let config = no_crit();
        let mut user = spawn(&catalog, 1, "plain");
        user.add_param_plus(crate::stats::Param::Mat, 50);
        let target = spawn(&catalog, 2, "plain");
        let cure = ActionDef::new("cure")
            .with_category(ActionCategory::Heal)
            .with_target(TargetRule::AllySingle)
            .with_effect(EffectDef::new(EffectKind::HpHeal, "5"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &cure).apply(&target, &mut sure_hit());
        // floor(5 * 150 / 100)
        assert_eq!(results[0].value, 7);
        assert!(!results[0].is_miss);
    }

    #[test]
    fn ratio_effects_use_target_max_hp() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let potion = ActionDef::new("potion")
            .with_effect(EffectDef::new(EffectKind::HpHealRatio, "0.3"))
            .with_effect(EffectDef::new(EffectKind::Revive, "0.5"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &potion).apply(&target, &mut sure_hit());
        assert_eq!(results[0].value, 30);
        assert_eq!(results[1].value, 50);
    }

    #[test]
    fn status_chance_and_resistance() {
        let mut catalog = catalog();
        catalog.passives.register(
            PassiveDef::new("stoic").with_trait(Trait::with_data(TraitCode::StateResist, "sleep", 0.0)),
        );
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let lullaby = ActionDef::new("lullaby").with_effect(EffectDef::status("sleep", 0.5));
        let resolver = ActionResolver::new(&catalog, &config, &user, &lullaby);

        let landed = resolver.apply(&target, &mut ScriptedRng::new([0.2]));
        assert_eq!(landed[0].status.as_deref(), Some("sleep"));
        let failed = resolver.apply(&target, &mut ScriptedRng::new([0.7]));
        assert_eq!(failed[0].status, None);

        let mut stoic = target.clone();
        stoic.passives.push("stoic".into());
        let resisted = resolver.apply(&stoic, &mut ScriptedRng::new([0.0]));
        assert_eq!(resisted[0].status, None);
    }

    #[test]
    fn bad_formula_counts_as_zero_and_unknown_kinds_are_skipped() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let odd = ActionDef::new("odd")
            .with_effect(EffectDef::new(EffectKind::HpDamage, "a.level +"))
            .with_effect(EffectDef {
                kind: "teleport".into(),
                ..EffectDef::default()
            });
        let results =
            ActionResolver::new(&catalog, &config, &user, &odd).apply(&target, &mut sure_hit());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 0);
    }

    #[test]
    fn repeat_runs_effects_again() {
        let catalog = catalog();
        let config = no_crit();
        let user = spawn(&catalog, 1, "plain");
        let target = spawn(&catalog, 2, "plain");
        let ray = ActionDef::new("ray")
            .with_repeat(3)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "2"));
        let results =
            ActionResolver::new(&catalog, &config, &user, &ray).apply(&target, &mut sure_hit());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.value == 2));
    }
}
