//! Automatic action selection.

use crate::action::ActionCategory;
use crate::battle::BattleSession;
use crate::config::BattleConfig;
use crate::registry::{Catalog, ResolvedAction};
use crate::rng::RandomSource;
use crate::stats::{BattlerId, Temperament};

/// Picks the action `id` performs this turn.
///
/// Kind battlers heal the lowest-hp hurt friend when that friend is below
/// the configured threshold and a heal is among their acts. Everyone else
/// picks uniformly from the front and back rows combined.
pub(super) fn choose_action<R: RandomSource + ?Sized>(
    catalog: &Catalog,
    config: &BattleConfig,
    session: &BattleSession,
    id: BattlerId,
    rng: &mut R,
) -> ResolvedAction {
    let (Some(subject), Some(side)) = (session.battler(id), session.side_of(id)) else {
        return catalog.basic_attack();
    };
    let acts: Vec<&str> = subject
        .acts
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    if subject.temperament == Temperament::Kind {
        let most_hurt = session
            .living(side)
            .into_iter()
            .map(|b| (b, catalog.sheet(b, config)))
            .filter(|(b, sheet)| b.hp() < sheet.mhp)
            .min_by_key(|(b, _)| b.hp());
        if let Some((friend, sheet)) = most_hurt {
            let threshold = f64::from(sheet.mhp) * config.kind_heal_threshold;
            if f64::from(friend.hp()) < threshold {
                let heal = acts
                    .iter()
                    .map(|act| catalog.action(act))
                    .find(|action| action.def.category() == ActionCategory::Heal);
                if let Some(heal) = heal {
                    return heal;
                }
            }
        }
    }

    if acts.is_empty() {
        return catalog.basic_attack();
    }
    catalog.action(acts[rng.below(acts.len())])
}
