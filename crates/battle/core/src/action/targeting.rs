//! Target selection.
//!
//! Candidate pools are filtered to living battlers before a rule is applied.
//! An empty result is reported as [`TargetError::NoTargets`] and the action
//! becomes a no-op.

use crate::action::TargetRule;
use crate::error::{BattleError, ErrorSeverity};
use crate::rng::RandomSource;
use crate::stats::{Battler, BattlerId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("action '{action}' by {subject} found no living target ({rule})")]
    NoTargets {
        action: String,
        subject: BattlerId,
        rule: TargetRule,
    },
}

impl BattleError for TargetError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Silent
    }

    fn error_code(&self) -> &'static str {
        "NO_TARGETS"
    }
}

/// Picks target ids for `rule`.
///
/// # Arguments
///
/// * `subject` - Acting battler
/// * `friends` - Subject's side, the subject included
/// * `foes` - Opposing side
pub fn select_targets<R: RandomSource + ?Sized>(
    rule: TargetRule,
    subject: &Battler,
    friends: &[&Battler],
    foes: &[&Battler],
    rng: &mut R,
) -> Vec<BattlerId> {
    let living = |pool: &[&Battler]| -> Vec<BattlerId> {
        pool.iter().filter(|b| b.is_alive()).map(|b| b.id).collect()
    };

    match rule {
        TargetRule::User => {
            if subject.is_alive() {
                vec![subject.id]
            } else {
                Vec::new()
            }
        }
        TargetRule::AllySingle => friends
            .iter()
            .filter(|b| b.is_alive())
            .min_by_key(|b| b.hp())
            .map(|b| vec![b.id])
            .unwrap_or_default(),
        TargetRule::EnemyAll => living(foes),
        TargetRule::EnemyRow => {
            let (front, back): (Vec<&Battler>, Vec<&Battler>) = foes
                .iter()
                .copied()
                .filter(|b| b.is_alive())
                .partition(|b| b.is_front_row());
            let row = if front.is_empty() { back } else { front };
            row.iter().map(|b| b.id).collect()
        }
        TargetRule::EnemySingle => {
            let pool = living(foes);
            if pool.is_empty() {
                Vec::new()
            } else {
                vec![pool[rng.below(pool.len())]]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::stats::{BattlerKind, SpeciesDef};

    fn unit(id: u32, slot: u8, hp: i32) -> Battler {
        let mut b = Battler::new(
            BattlerId(id),
            &SpeciesDef::new("dummy"),
            BattlerKind::Enemy { scale: 1.0 },
            1,
            slot,
        );
        b.set_hp(hp, 100);
        b
    }

    #[test]
    fn ally_single_picks_lowest_living_hp() {
        let me = unit(1, 0, 50);
        let hurt = unit(2, 1, 10);
        let dead = unit(3, 2, 0);
        let friends = [&me, &hurt, &dead];
        let targets = select_targets(
            TargetRule::AllySingle,
            &me,
            &friends,
            &[],
            &mut ScriptedRng::constant(0.0),
        );
        assert_eq!(targets, vec![BattlerId(2)]);
    }

    #[test]
    fn enemy_row_prefers_front_then_back() {
        let me = unit(1, 0, 50);
        let front = unit(10, 1, 5);
        let back_a = unit(11, 3, 5);
        let back_b = unit(12, 5, 5);
        let mut rng = ScriptedRng::constant(0.0);

        let foes = [&front, &back_a, &back_b];
        assert_eq!(
            select_targets(TargetRule::EnemyRow, &me, &[&me], &foes, &mut rng),
            vec![BattlerId(10)]
        );

        let fallen_front = unit(10, 1, 0);
        let foes = [&fallen_front, &back_a, &back_b];
        assert_eq!(
            select_targets(TargetRule::EnemyRow, &me, &[&me], &foes, &mut rng),
            vec![BattlerId(11), BattlerId(12)]
        );
    }

    #[test]
    fn enemy_single_draws_uniformly() {
        let me = unit(1, 0, 50);
        let a = unit(10, 0, 5);
        let b = unit(11, 1, 5);
        let foes = [&a, &b];
        let mut rng = ScriptedRng::new([0.9]);
        assert_eq!(
            select_targets(TargetRule::EnemySingle, &me, &[&me], &foes, &mut rng),
            vec![BattlerId(11)]
        );
    }

    #[test]
    fn no_living_foes_means_no_targets() {
        let me = unit(1, 0, 50);
        let dead = unit(10, 0, 0);
        let mut rng = ScriptedRng::constant(0.0);
        assert!(select_targets(TargetRule::EnemyAll, &me, &[&me], &[&dead], &mut rng).is_empty());
        assert!(select_targets(TargetRule::EnemySingle, &me, &[&me], &[&dead], &mut rng).is_empty());
        assert_eq!(
            select_targets(TargetRule::User, &me, &[&me], &[], &mut rng),
            vec![BattlerId(1)]
        );
    }
}
