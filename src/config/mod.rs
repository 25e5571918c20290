// src/config/mod.rs

//! Configuration: TOML model, loading, and semantic validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_or_default};
pub use model::{
    AssetConfig, ConfigFile, DesignSection, DiffusionSection, PathsSection, RunnerSection,
    UnpackKind,
};
