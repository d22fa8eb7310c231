//! Content factory for building a battle catalog from data files.

use std::path::{Path, PathBuf};

use battle_core::{
    ActionDef, BattleConfig, Catalog, EncounterTable, EquipmentDef, PassiveDef, SpeciesDef,
};

use crate::loaders::{ConfigLoader, DefinitionLoader, EncounterLoader, LoadResult};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── encounters.ron
/// ├── species.ron
/// ├── skills.ron
/// ├── items.ron
/// ├── equipment.ron
/// └── passives.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load the floor encounter table from `encounters.ron`.
    pub fn load_encounters(&self) -> LoadResult<EncounterTable> {
        let path = self.data_dir.join("encounters.ron");
        EncounterLoader::load(&path)
    }

    pub fn load_species(&self) -> LoadResult<Vec<SpeciesDef>> {
        DefinitionLoader::load(&self.data_dir.join("species.ron"))
    }

    pub fn load_skills(&self) -> LoadResult<Vec<ActionDef>> {
        DefinitionLoader::load(&self.data_dir.join("skills.ron"))
    }

    pub fn load_items(&self) -> LoadResult<Vec<ActionDef>> {
        DefinitionLoader::load(&self.data_dir.join("items.ron"))
    }

    pub fn load_equipment(&self) -> LoadResult<Vec<EquipmentDef>> {
        DefinitionLoader::load(&self.data_dir.join("equipment.ron"))
    }

    pub fn load_passives(&self) -> LoadResult<Vec<PassiveDef>> {
        DefinitionLoader::load(&self.data_dir.join("passives.ron"))
    }

    /// Load every definition file into a fresh [`Catalog`].
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let mut catalog = Catalog::new();
        catalog.species.extend(self.load_species()?);
        catalog.skills.extend(self.load_skills()?);
        catalog.items.extend(self.load_items()?);
        catalog.equipment.extend(self.load_equipment()?);
        catalog.passives.extend(self.load_passives()?);

        tracing::info!(
            data_dir = %self.data_dir.display(),
            species = catalog.species.len(),
            skills = catalog.skills.len(),
            items = catalog.items.len(),
            equipment = catalog.equipment.len(),
            passives = catalog.passives.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
