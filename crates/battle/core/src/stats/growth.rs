//! Level curves and experience thresholds.

/// `round(base × (1 + growth × (level − 1)))`.
pub fn grown_value(base: f64, growth: f64, level: u32) -> f64 {
    let steps = f64::from(level.max(1) - 1);
    (base * (1.0 + growth * steps)).round()
}

/// Total experience required to reach `level`.
///
/// `floor(xp_curve × 10 × (level − 1)^1.5)`; level 1 needs nothing.
pub fn exp_for_level(xp_curve: f64, level: u32) -> u32 {
    let steps = f64::from(level.max(1) - 1);
    (xp_curve * 10.0 * steps.powf(1.5)).floor().max(0.0) as u32
}

/// One level gained by a battler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}
