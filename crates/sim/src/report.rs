//! Plain-text rendering of battle events.

use battle_core::{BattleEvent, BattlerId, EffectKind, EffectResult};

/// Renders one event as a log line, resolving unit ids through `name`.
pub fn describe(event: &BattleEvent, name: impl Fn(BattlerId) -> String) -> String {
    match event {
        BattleEvent::EncounterStarted { floor, enemies } => {
            let names: Vec<String> = enemies.iter().map(|id| name(*id)).collect();
            format!("floor {floor}: {} appear", names.join(", "))
        }
        BattleEvent::RoundStarted { round } => format!("-- round {round} --"),
        BattleEvent::PlayerInputRequested { round } => format!("waiting for input (round {round})"),
        BattleEvent::TurnStarted { unit } => format!("{}'s turn", name(*unit)),
        BattleEvent::ActionChosen {
            unit,
            action,
            targets,
        } => {
            let names: Vec<String> = targets.iter().map(|id| name(*id)).collect();
            format!("{} uses {action} on {}", name(*unit), names.join(", "))
        }
        BattleEvent::EffectApplied { result, .. } => effect_line(result, &name),
        BattleEvent::UnitEvaded { unit } => format!("{} evades", name(*unit)),
        BattleEvent::UnitDied { unit } => format!("{} is knocked out", name(*unit)),
        BattleEvent::UnitSurvived { unit } => format!("{} holds on with 1 hp", name(*unit)),
        BattleEvent::UnitRevived { unit, hp } => format!("{} is revived with {hp} hp", name(*unit)),
        BattleEvent::EquipmentBroken { unit, item } => {
            format!("{}'s {item} breaks", name(*unit))
        }
        BattleEvent::TraitTriggered { unit, code, value } => {
            format!("{} triggers {code} ({value})", name(*unit))
        }
        BattleEvent::LevelUp { unit, level_up } => format!(
            "{} grows from level {} to {}",
            name(*unit),
            level_up.from,
            level_up.to
        ),
        BattleEvent::BattleEnded { outcome, rewards } => match rewards {
            Some(rewards) => format!(
                "{outcome}: {} gold, {} exp",
                rewards.gold, rewards.exp
            ),
            None => outcome.to_string(),
        },
    }
}

fn effect_line(result: &EffectResult, name: &impl Fn(BattlerId) -> String) -> String {
    let target = name(result.target);
    if result.is_miss {
        return format!("  misses {target}");
    }
    let crit = if result.is_crit { " (critical)" } else { "" };
    match result.effect {
        EffectKind::HpDamage => format!("  {target} takes {} damage{crit}", result.value),
        EffectKind::HpHeal | EffectKind::HpHealRatio => {
            format!("  {target} recovers {} hp", result.value)
        }
        EffectKind::Revive => format!("  {target} is revived"),
        EffectKind::AddStatus => match &result.status {
            Some(status) => format!("  {target} is afflicted with {status}"),
            None => format!("  {target} is unaffected"),
        },
        other => format!("  {other} on {target} ({})", result.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{Outcome, Rewards};

    fn name(id: BattlerId) -> String {
        format!("u{}", id.0)
    }

    #[test]
    fn damage_mentions_critical_hits() {
        let mut result = EffectResult::new(BattlerId(1000), EffectKind::HpDamage, 12);
        result.is_crit = true;
        let line = describe(
            &BattleEvent::EffectApplied {
                user: BattlerId(1),
                result,
            },
            name,
        );
        assert_eq!(line, "  u1000 takes 12 damage (critical)");
    }

    #[test]
    fn victory_lists_rewards() {
        let line = describe(
            &BattleEvent::BattleEnded {
                outcome: Outcome::Victory,
                rewards: Some(Rewards {
                    gold: 80,
                    exp: 20,
                    allies: Vec::new(),
                }),
            },
            name,
        );
        assert_eq!(line, "Victory: 80 gold, 20 exp");
    }
}
