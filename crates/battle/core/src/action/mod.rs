//! Skills, items and their resolution.
//!
//! - [`def`]: raw/resolved action templates and their effect lists
//! - [`targeting`]: target rules applied to living candidate pools
//! - [`resolver`]: pure per-target evaluation producing [`EffectResult`]s
mod def;
mod resolver;
mod targeting;

pub use def::{ActionCategory, ActionDef, EffectDef, EffectKind, StatSelector, TargetRule};
pub use resolver::ActionResolver;
pub use targeting::{TargetError, select_targets};

use crate::stats::BattlerId;

/// Outcome of one effect on one target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectResult {
    pub target: BattlerId,
    pub effect: EffectKind,
    pub value: i32,
    pub is_crit: bool,
    pub is_miss: bool,
    /// Status attached by an `add_status` effect that landed.
    pub status: Option<String>,
}

impl EffectResult {
    pub fn new(target: BattlerId, effect: EffectKind, value: i32) -> Self {
        Self {
            target,
            effect,
            value,
            is_crit: false,
            is_miss: false,
            status: None,
        }
    }

    pub fn miss(target: BattlerId) -> Self {
        Self {
            is_miss: true,
            ..Self::new(target, EffectKind::Miss, 0)
        }
    }

    #[must_use]
    pub fn with_crit(mut self, is_crit: bool) -> Self {
        self.is_crit = is_crit;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }
}
