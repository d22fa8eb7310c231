//! Definition list loader.
//!
//! Species, skills, items, equipment and passives share one file format: a
//! RON list of definitions, each with a unique `id` and an optional `parent`.
//!
//! ```ron
//! #![enable(implicit_some)]
//! [
//!     (id: "base_creature", atk: 100.0, acts: [["wait"]]),
//!     (id: "goblin", parent: "base_creature", base_hp: 18.0),
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use battle_core::Definition;
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for definition lists from RON files.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Load a definition list from a RON file.
    ///
    /// Parent links are not resolved here; registries resolve them lazily.
    pub fn load<D>(path: &Path) -> LoadResult<Vec<D>>
    where
        D: Definition + DeserializeOwned,
    {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse<D>(content: &str) -> LoadResult<Vec<D>>
    where
        D: Definition + DeserializeOwned,
    {
        let defs: Vec<D> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {} RON: {}", D::KIND, e))?;

        let mut seen = HashSet::new();
        for def in &defs {
            if def.id().is_empty() {
                anyhow::bail!("{} definition with an empty id", D::KIND);
            }
            if !seen.insert(def.id().to_owned()) {
                anyhow::bail!("duplicate {} definition '{}'", D::KIND, def.id());
            }
        }

        tracing::debug!(kind = D::KIND, count = defs.len(), "definitions loaded");
        Ok(defs)
    }
}
