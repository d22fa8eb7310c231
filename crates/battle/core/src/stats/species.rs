//! Species definitions: base curves and default behaviour of a creature kind.

use crate::element::Element;
use crate::registry::Definition;
use crate::traits::Trait;

/// AI behaviour tag.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Temperament {
    /// Heals hurt friends before attacking.
    Kind,
    #[default]
    Free,
    Ruthless,
    Selfish,
}

/// Raw or resolved species template. Absent fields inherit from the parent.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeciesDef {
    pub id: String,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,

    pub base_hp: Option<f64>,
    pub hp_growth: Option<f64>,
    pub base_mp: Option<f64>,
    pub mp_growth: Option<f64>,
    pub xp_curve: Option<f64>,

    pub atk: Option<f64>,
    pub def: Option<f64>,
    pub mat: Option<f64>,
    pub mdf: Option<f64>,
    pub agi: Option<f64>,
    pub luk: Option<f64>,

    pub elements: Option<Vec<Element>>,
    pub temperament: Option<Temperament>,
    pub passives: Option<Vec<String>>,
    /// Action rows: `[front, back]`.
    pub acts: Option<Vec<Vec<String>>>,
    pub traits: Option<Vec<Trait>>,
}

impl SpeciesDef {
    pub const DEFAULT_BASE_HP: f64 = 10.0;
    pub const DEFAULT_HP_GROWTH: f64 = 0.2;
    pub const DEFAULT_MP_GROWTH: f64 = 0.05;
    pub const DEFAULT_XP_CURVE: f64 = 10.0;
    pub const DEFAULT_PARAM: f64 = 100.0;

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Empty stand-in used when a battler's species cannot be resolved.
    pub fn placeholder(id: &str) -> Self {
        Self::new(id)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn base_hp(&self) -> f64 {
        self.base_hp.unwrap_or(Self::DEFAULT_BASE_HP)
    }

    pub fn hp_growth(&self) -> f64 {
        self.hp_growth.unwrap_or(Self::DEFAULT_HP_GROWTH)
    }

    pub fn base_mp(&self) -> f64 {
        self.base_mp.unwrap_or(0.0)
    }

    pub fn mp_growth(&self) -> f64 {
        self.mp_growth.unwrap_or(Self::DEFAULT_MP_GROWTH)
    }

    pub fn xp_curve(&self) -> f64 {
        self.xp_curve.unwrap_or(Self::DEFAULT_XP_CURVE)
    }

    pub fn elements(&self) -> &[Element] {
        self.elements.as_deref().unwrap_or_default()
    }

    pub fn temperament(&self) -> Temperament {
        self.temperament.unwrap_or_default()
    }

    pub fn passives(&self) -> &[String] {
        self.passives.as_deref().unwrap_or_default()
    }

    pub fn traits(&self) -> &[Trait] {
        self.traits.as_deref().unwrap_or_default()
    }

    /// Front and back action rows. Missing rows are empty.
    pub fn act_rows(&self) -> [Vec<String>; 2] {
        let rows = self.acts.as_deref().unwrap_or_default();
        [
            rows.first().cloned().unwrap_or_default(),
            rows.get(1).cloned().unwrap_or_default(),
        ]
    }

    // ===== builder helpers for definitions constructed in code =====

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_hp(mut self, base_hp: f64, hp_growth: f64) -> Self {
        self.base_hp = Some(base_hp);
        self.hp_growth = Some(hp_growth);
        self
    }

    #[must_use]
    pub fn with_xp_curve(mut self, xp_curve: f64) -> Self {
        self.xp_curve = Some(xp_curve);
        self
    }

    #[must_use]
    pub fn with_elements(mut self, elements: &[Element]) -> Self {
        self.elements = Some(elements.to_vec());
        self
    }

    #[must_use]
    pub fn with_temperament(mut self, temperament: Temperament) -> Self {
        self.temperament = Some(temperament);
        self
    }

    #[must_use]
    pub fn with_acts(mut self, front: &[&str], back: &[&str]) -> Self {
        let row = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        self.acts = Some(vec![row(front), row(back)]);
        self
    }

    #[must_use]
    pub fn with_passive(mut self, passive: impl Into<String>) -> Self {
        self.passives.get_or_insert_with(Vec::new).push(passive.into());
        self
    }

    #[must_use]
    pub fn with_trait(mut self, t: Trait) -> Self {
        self.traits.get_or_insert_with(Vec::new).push(t);
        self
    }
}

impl Definition for SpeciesDef {
    const KIND: &'static str = "species";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn inherit(&self, parent: &Self) -> Self {
        crate::inherit_fields!(self, parent;
            name, description,
            base_hp, hp_growth, base_mp, mp_growth, xp_curve,
            atk, def, mat, mdf, agi, luk,
            elements, temperament, passives, acts, traits,
        )
    }
}
