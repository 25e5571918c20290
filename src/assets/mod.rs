// src/assets/mod.rs

//! Model-weight provisioning.
//!
//! [`manifest`] describes what to download; [`provision`] downloads and
//! unpacks it into the models directory, guarded by a completion marker so
//! re-running is a no-op.

pub mod manifest;
pub mod provision;

pub use manifest::{default_manifest, Asset};
pub use provision::Provisioner;
