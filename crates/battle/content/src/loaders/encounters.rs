//! Encounter table loader.

use std::path::Path;

use battle_core::EncounterTable;

use crate::loaders::{LoadResult, read_file};

/// Loader for floor encounter tables from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load an encounter table from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing an `EncounterTable`
    pub fn load(path: &Path) -> LoadResult<EncounterTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EncounterTable> {
        let table: EncounterTable = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter table RON: {}", e))?;

        if table.min_enemies > table.max_enemies {
            anyhow::bail!(
                "min_enemies ({}) exceeds max_enemies ({})",
                table.min_enemies,
                table.max_enemies
            );
        }
        for pool in &table.pools {
            if pool.max_floor.is_some_and(|max| max < pool.min_floor) {
                anyhow::bail!("encounter pool starting at floor {} ends before it starts", pool.min_floor);
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_ended_pools() {
        let table = EncounterLoader::parse(
            r#"#![enable(implicit_some)]
            (
                max_enemies: 2,
                pools: [
                    (min_floor: 1, max_floor: 2, enemies: ["goblin"]),
                    (min_floor: 3, enemies: ["lich"]),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(table.min_enemies, 1);
        assert_eq!(table.max_enemies, 2);
        assert_eq!(table.pool_for(99).unwrap().enemies, vec!["lich".to_string()]);
    }

    #[test]
    fn rejects_inverted_counts() {
        assert!(EncounterLoader::parse("(min_enemies: 4, max_enemies: 2)").is_err());
    }
}
