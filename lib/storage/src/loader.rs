use dexsim_core::{Error, Result};
use dexsim_similarity::{
    EmbeddingFamily, EmbeddingRecord, EmbeddingStore, EntityRecord, NormalizationConstants,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// What was read from disk, reported in the startup logs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactDescription {
    pub path: PathBuf,
    pub size: u64,
    pub checksum: String,
    pub entries: usize,
}

/// Read a JSON artifact, returning the value and a description of the file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactDescription)> {
    let data = fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let value = serde_json::from_slice(&data)
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;

    let description = ArtifactDescription {
        path: path.to_path_buf(),
        size: data.len() as u64,
        checksum: format!("{:x}", Sha256::digest(&data)),
        entries: 0,
    };
    Ok((value, description))
}

/// Catalog feed: a JSON array of entity records
pub fn load_catalog(path: &Path) -> Result<(Vec<EntityRecord>, ArtifactDescription)> {
    let (records, mut description): (Vec<EntityRecord>, _) = read_json(path)?;
    description.entries = records.len();
    Ok((records, description))
}

/// Embedding feed: a JSON array of `{name, vector, genus?}`
pub fn load_embeddings(
    path: &Path,
    family: EmbeddingFamily,
    expected_dim: Option<usize>,
) -> Result<(EmbeddingStore, ArtifactDescription)> {
    let (records, mut description): (Vec<EmbeddingRecord>, _) = read_json(path)?;
    description.entries = records.len();
    let store = EmbeddingStore::from_records(family, records, expected_dim)?;
    Ok((store, description))
}

/// Normalization constants: a single JSON object
pub fn load_constants(path: &Path) -> Result<(NormalizationConstants, ArtifactDescription)> {
    let (constants, mut description): (NormalizationConstants, _) = read_json(path)?;
    constants.validate()?;
    description.entries = 1;
    Ok((constants, description))
}
