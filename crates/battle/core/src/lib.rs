//! Data-driven, turn-based party battle engine.
//!
//! `battle-core` holds the rules: definition registries with parent
//! inheritance, trait aggregation, stat sheets, the damage-formula language,
//! the element table, action resolution and the [`battle::Battle`] state
//! machine. Content is supplied through a [`registry::Catalog`] that callers
//! build themselves (see the `battle-content` crate for RON loaders), and
//! every random roll goes through an injectable [`rng::RandomSource`].
pub mod action;
pub mod battle;
pub mod config;
pub mod element;
pub mod error;
pub mod formula;
pub mod party;
pub mod registry;
pub mod rng;
pub mod stats;
pub mod traits;

pub use action::{
    ActionCategory, ActionDef, ActionResolver, EffectDef, EffectKind, EffectResult, StatSelector,
    TargetError, TargetRule, select_targets,
};
pub use battle::{
    AllyReward, Battle, BattleEvent, BattlePhase, BattleSession, ENEMY_ID_BASE, EncounterPool,
    EncounterTable, Outcome, Rewards, Side, Step, gain_exp, victory_payout,
};
pub use config::BattleConfig;
pub use element::{Affinity, Element, relation_rate};
pub use error::{BattleError, ErrorSeverity, report};
pub use formula::{Attribute, Formula, FormulaCache, FormulaError, Scope};
pub use party::{Party, PartyError};
pub use registry::{
    ActionSource, Catalog, Definition, Registry, RegistryError, ResolvedAction,
};
pub use rng::{PcgRng, RandomSource, ScriptedRng};
pub use stats::{
    Battler, BattlerId, BattlerKind, Buffs, GUARDING, LevelUp, Param, SpeciesDef, StatSheet,
    Temperament, exp_for_level,
};
pub use traits::{EquipmentDef, PassiveDef, Trait, TraitCode, TraitSet, TraitSource};
