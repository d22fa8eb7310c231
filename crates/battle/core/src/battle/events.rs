//! Notifications emitted while a battle runs.
//!
//! The battle appends events as it steps; the presentation layer drains them
//! with [`Battle::take_events`](crate::battle::Battle::take_events).

use crate::action::EffectResult;
use crate::battle::{Outcome, Rewards};
use crate::stats::{BattlerId, LevelUp};
use crate::traits::TraitCode;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    EncounterStarted {
        floor: u32,
        enemies: Vec<BattlerId>,
    },
    RoundStarted {
        round: u32,
    },
    PlayerInputRequested {
        round: u32,
    },
    TurnStarted {
        unit: BattlerId,
    },
    ActionChosen {
        unit: BattlerId,
        action: String,
        targets: Vec<BattlerId>,
    },
    EffectApplied {
        user: BattlerId,
        result: EffectResult,
    },
    UnitEvaded {
        unit: BattlerId,
    },
    UnitDied {
        unit: BattlerId,
    },
    /// A once-per-battle survival trait left the unit at 1 hp.
    UnitSurvived {
        unit: BattlerId,
    },
    UnitRevived {
        unit: BattlerId,
        hp: i32,
    },
    EquipmentBroken {
        unit: BattlerId,
        item: String,
    },
    TraitTriggered {
        unit: BattlerId,
        code: TraitCode,
        value: i32,
    },
    LevelUp {
        unit: BattlerId,
        level_up: LevelUp,
    },
    BattleEnded {
        outcome: Outcome,
        rewards: Option<Rewards>,
    },
}
