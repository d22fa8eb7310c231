//! Definitions that only contribute traits.

use crate::registry::Definition;
use crate::traits::Trait;

/// Where a battler's traits come from, in aggregation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraitSource {
    Species(String),
    Passive(String),
    Equipment(String),
}

/// Equippable item. Its stat bonuses are expressed as traits.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EquipmentDef {
    pub id: String,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost: Option<u32>,
    pub traits: Option<Vec<Trait>>,
}

impl EquipmentDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_trait(mut self, t: Trait) -> Self {
        self.traits.get_or_insert_with(Vec::new).push(t);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn cost(&self) -> u32 {
        self.cost.unwrap_or(0)
    }

    pub fn traits(&self) -> &[Trait] {
        self.traits.as_deref().unwrap_or_default()
    }
}

impl Definition for EquipmentDef {
    const KIND: &'static str = "equipment";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn inherit(&self, parent: &Self) -> Self {
        crate::inherit_fields!(self, parent; name, description, cost, traits)
    }
}

/// Named passive ability granted by a species or learned later.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PassiveDef {
    pub id: String,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub traits: Option<Vec<Trait>>,
}

impl PassiveDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_trait(mut self, t: Trait) -> Self {
        self.traits.get_or_insert_with(Vec::new).push(t);
        self
    }

    pub fn traits(&self) -> &[Trait] {
        self.traits.as_deref().unwrap_or_default()
    }
}

impl Definition for PassiveDef {
    const KIND: &'static str = "passive";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn inherit(&self, parent: &Self) -> Self {
        crate::inherit_fields!(self, parent; name, description, traits)
    }
}
