//! Read-only artifact loading for dexsim
//!
//! Reads the catalog, embedding feeds and normalization constants from JSON,
//! validates them against each other and hands them to the query engine.

pub mod loader;
pub mod manager;

pub use loader::{load_catalog, load_constants, load_embeddings, read_json, ArtifactDescription};
pub use manager::{DataSources, DataStore};
