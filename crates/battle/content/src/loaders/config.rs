//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their [`BattleConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if !(0.0..=1.0).contains(&config.post_battle_heal_ratio) {
            anyhow::bail!(
                "post_battle_heal_ratio must be within [0, 1], got {}",
                config.post_battle_heal_ratio
            );
        }
        if config.max_level == 0 {
            anyhow::bail!("max_level must be at least 1");
        }

        Ok(config)
    }
}
