//! Floor-based random encounter tables.

use crate::rng::RandomSource;

/// Species that may appear on a range of floors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterPool {
    pub min_floor: u32,
    /// Inclusive upper bound; `None` means every deeper floor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_floor: Option<u32>,
    pub enemies: Vec<String>,
}

impl EncounterPool {
    pub fn contains(&self, floor: u32) -> bool {
        floor >= self.min_floor && self.max_floor.is_none_or(|max| floor <= max)
    }
}

/// Encounter generation rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncounterTable {
    pub min_enemies: u32,
    pub max_enemies: u32,
    /// Enemy stat multiplier is `1 + floor * scale_per_floor`.
    pub scale_per_floor: f64,
    pub enemy_level: u32,
    pub pools: Vec<EncounterPool>,
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self {
            min_enemies: 1,
            max_enemies: 3,
            scale_per_floor: 0.1,
            enemy_level: 1,
            pools: Vec::new(),
        }
    }
}

impl EncounterTable {
    /// First pool whose floor range contains `floor`.
    pub fn pool_for(&self, floor: u32) -> Option<&EncounterPool> {
        self.pools.iter().find(|pool| pool.contains(floor))
    }

    pub fn scale_for(&self, floor: u32) -> f64 {
        1.0 + f64::from(floor) * self.scale_per_floor
    }

    /// Rolls the species ids for one encounter on `floor`.
    ///
    /// Count is uniform in `[min_enemies, max_enemies]`, each species uniform
    /// over the matching pool. Empty when no pool matches.
    pub fn roll<R: RandomSource + ?Sized>(&self, floor: u32, rng: &mut R) -> Vec<String> {
        let Some(pool) = self.pool_for(floor).filter(|p| !p.enemies.is_empty()) else {
            tracing::warn!(floor, "no encounter pool for floor");
            return Vec::new();
        };
        let count = rng.range(self.min_enemies, self.max_enemies.max(self.min_enemies));
        (0..count)
            .map(|_| pool.enemies[rng.below(pool.enemies.len())].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PcgRng;

    fn table() -> EncounterTable {
        EncounterTable {
            pools: vec![
                EncounterPool {
                    min_floor: 1,
                    max_floor: Some(2),
                    enemies: vec!["goblin".into(), "skeleton".into(), "pixie".into()],
                },
                EncounterPool {
                    min_floor: 3,
                    max_floor: None,
                    enemies: vec!["golem".into()],
                },
            ],
            ..EncounterTable::default()
        }
    }

    #[test]
    fn pools_match_floor_ranges() {
        let t = table();
        assert_eq!(t.pool_for(2).unwrap().min_floor, 1);
        assert_eq!(t.pool_for(40).unwrap().enemies, vec!["golem".to_string()]);
        assert!(t.pool_for(0).is_none());
    }

    #[test]
    fn rolls_stay_within_count_and_pool() {
        let t = table();
        let mut rng = PcgRng::new(5);
        for _ in 0..100 {
            let roll = t.roll(1, &mut rng);
            assert!((1..=3).contains(&roll.len()));
            assert!(roll.iter().all(|id| t.pool_for(1).unwrap().enemies.contains(id)));
        }
    }

    #[test]
    fn scale_grows_by_a_tenth_per_floor() {
        let t = table();
        assert!((t.scale_for(3) - 1.3).abs() < 1e-9);
        assert_eq!(t.scale_for(0), 1.0);
    }
}
