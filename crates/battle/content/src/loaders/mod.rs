//! Content loaders for reading battle data from files.
//!
//! Each loader turns one RON/TOML file into `battle-core` types;
//! [`ContentFactory`] ties them to a data directory.

pub mod config;
pub mod definitions;
pub mod encounters;
pub mod factory;
pub mod references;

pub use config::ConfigLoader;
pub use definitions::DefinitionLoader;
pub use encounters::EncounterLoader;
pub use factory::ContentFactory;
pub use references::{MissingReference, missing_references};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
