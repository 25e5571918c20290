// src/errors.rs

//! Crate-wide error aliases.
//!
//! A thin wrapper around `anyhow`; this module gives a single place to add
//! more structured error types later if a caller needs to match on them.

pub use anyhow::{Error, Result};
