//! Data-driven battle content and loaders.
//!
//! This crate reads static content from RON/TOML files into the registries
//! `battle-core` consumes:
//! - Species, skills, items, equipment and passives (RON)
//! - Floor encounter tables (RON)
//! - Battle configuration (TOML)
//!
//! It also provides [`SystemRng`], an entropy-seeded random source for
//! interactive play.

#[cfg(feature = "loaders")]
pub mod loaders;
pub mod rng;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, DefinitionLoader, EncounterLoader, MissingReference,
    missing_references,
};
pub use rng::SystemRng;
