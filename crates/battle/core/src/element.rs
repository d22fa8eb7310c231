//! Elemental affinities.
//!
//! Five elements: a triad where R beats G, G beats B and B beats R, plus W and
//! K which are neutral to every other element. Every element resists itself.

/// Elemental tag carried by battlers and actions.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    /// Red
    R,
    /// Green
    G,
    /// Blue
    B,
    /// White
    W,
    /// Black
    K,
}

/// How an attacking element fares against one defending tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Strong,
    Weak,
    Neutral,
}

impl Affinity {
    pub const STRONG_RATE: f64 = 1.25;
    pub const WEAK_RATE: f64 = 0.75;

    pub const fn rate(self) -> f64 {
        match self {
            Self::Strong => Self::STRONG_RATE,
            Self::Weak => Self::WEAK_RATE,
            Self::Neutral => 1.0,
        }
    }
}

impl Element {
    /// Element this one is strong against, if any.
    pub const fn beats(self) -> Option<Element> {
        match self {
            Self::R => Some(Self::G),
            Self::G => Some(Self::B),
            Self::B => Some(Self::R),
            Self::W | Self::K => None,
        }
    }

    /// Affinity of `self` attacking a target tagged `defender`.
    pub fn against(self, defender: Element) -> Affinity {
        if self == defender {
            Affinity::Weak
        } else if self.beats() == Some(defender) {
            Affinity::Strong
        } else if defender.beats() == Some(self) {
            Affinity::Weak
        } else {
            Affinity::Neutral
        }
    }
}

/// Product of per-tag rates of `attack` against every element in `defenders`.
///
/// An untagged target takes the identity rate.
pub fn relation_rate(attack: Element, defenders: &[Element]) -> f64 {
    defenders
        .iter()
        .map(|&d| attack.against(d).rate())
        .product()
}
