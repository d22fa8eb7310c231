//! Skill and item definitions.

use crate::element::Element;
use crate::registry::Definition;

/// Broad purpose of an action, used by the AI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCategory {
    #[default]
    Damage,
    Heal,
    Effect,
}

/// Who an action lands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetRule {
    /// The acting battler only.
    #[strum(serialize = "self", serialize = "user")]
    User,
    /// The living friend with the lowest hp.
    AllySingle,
    /// Every living opponent.
    EnemyAll,
    /// Living opponents in the front row, or the back row if the front is empty.
    EnemyRow,
    /// One living opponent chosen uniformly at random.
    #[default]
    EnemySingle,
}

/// Offensive/defensive stat pair an action scales with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatSelector {
    /// atk against def.
    Atk,
    /// mat against mdf.
    Mat,
}

/// Kind of atomic consequence an effect produces.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    HpDamage,
    HpHeal,
    HpHealRatio,
    Revive,
    AddStatus,
    IncreaseMaxHp,
    IncreaseLevel,
    /// Produced by the evasion gate; never declared in data.
    Miss,
}

/// One declared effect of an action.
///
/// `kind` stays a string so content with effect kinds this engine does not
/// know still loads; such effects are skipped at resolution time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectDef {
    pub kind: String,
    pub formula: Option<String>,
    pub chance: Option<f64>,
    pub status: Option<String>,
}

impl EffectDef {
    pub fn new(kind: EffectKind, formula: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            formula: Some(formula.into()),
            ..Self::default()
        }
    }

    pub fn status(status: impl Into<String>, chance: f64) -> Self {
        Self {
            kind: EffectKind::AddStatus.to_string(),
            chance: Some(chance),
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Parsed kind, or `None` for kinds the engine does not handle.
    pub fn effect_kind(&self) -> Option<EffectKind> {
        self.kind
            .parse::<EffectKind>()
            .ok()
            .filter(|kind| *kind != EffectKind::Miss)
    }

    pub fn chance(&self) -> f64 {
        self.chance.unwrap_or(1.0)
    }
}

/// Skill or item template. Absent fields inherit from the parent.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionDef {
    pub id: String,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ActionCategory>,
    pub target: Option<TargetRule>,
    /// Speed tier reported to the presentation layer.
    pub speed: Option<i32>,
    pub element: Option<Element>,
    pub stat: Option<StatSelector>,
    /// Times the effect list runs against each target.
    pub repeat: Option<u32>,
    pub effects: Option<Vec<EffectDef>>,
}

impl ActionDef {
    pub const BASIC_ATTACK_ID: &'static str = "attack";

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Built-in physical attack used when no `attack` definition is loaded.
    pub fn basic_attack() -> Self {
        Self::new(Self::BASIC_ATTACK_ID)
            .with_category(ActionCategory::Damage)
            .with_target(TargetRule::EnemySingle)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "4 + 2 * a.level"))
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn category(&self) -> ActionCategory {
        self.category.unwrap_or_default()
    }

    pub fn target(&self) -> TargetRule {
        self.target.unwrap_or_default()
    }

    pub fn speed(&self) -> i32 {
        self.speed.unwrap_or(0)
    }

    /// Heals scale with mat unless told otherwise; everything else with atk.
    pub fn stat(&self) -> StatSelector {
        self.stat.unwrap_or(match self.category() {
            ActionCategory::Heal => StatSelector::Mat,
            _ => StatSelector::Atk,
        })
    }

    pub fn repeat(&self) -> u32 {
        self.repeat.unwrap_or(1).max(1)
    }

    pub fn effects(&self) -> &[EffectDef] {
        self.effects.as_deref().unwrap_or_default()
    }

    /// Whether the evasion gate applies.
    pub fn deals_damage(&self) -> bool {
        self.effects()
            .iter()
            .any(|e| e.effect_kind() == Some(EffectKind::HpDamage))
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: ActionCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetRule) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn with_stat(mut self, stat: StatSelector) -> Self {
        self.stat = Some(stat);
        self
    }

    #[must_use]
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectDef) -> Self {
        self.effects.get_or_insert_with(Vec::new).push(effect);
        self
    }
}

impl Definition for ActionDef {
    const KIND: &'static str = "action";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn inherit(&self, parent: &Self) -> Self {
        crate::inherit_fields!(self, parent;
            name, description, category, target, speed, element, stat, repeat, effects,
        )
    }
}
