//! Read-only stores of externally generated embeddings
//!
//! Each family (image, text) maps an entity name to a dense vector of one
//! fixed width. Lookups of absent names fail with
//! [`Error::MissingEmbedding`]; nothing is ever zero-filled.

use crate::weights::Group;
use ahash::AHashMap;
use dexsim_core::{Error, Result, Vector};
use serde::{Deserialize, Serialize};

/// Width of the image embeddings in the reference deployment
pub const DEFAULT_IMAGE_DIM: usize = 768;

/// Width of the text embeddings in the reference deployment
pub const DEFAULT_TEXT_DIM: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFamily {
    Image,
    Text,
}

impl EmbeddingFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingFamily::Image => "image",
            EmbeddingFamily::Text => "text",
        }
    }

    pub fn default_dim(&self) -> usize {
        match self {
            EmbeddingFamily::Image => DEFAULT_IMAGE_DIM,
            EmbeddingFamily::Text => DEFAULT_TEXT_DIM,
        }
    }

    pub fn group(&self) -> Group {
        match self {
            EmbeddingFamily::Image => Group::Image,
            EmbeddingFamily::Text => Group::Text,
        }
    }
}

impl std::fmt::Display for EmbeddingFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an embedding feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    pub name: String,
    pub vector: Vec<f32>,
    /// Source text, kept for auditing text embeddings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
}

/// Name → vector lookup for one embedding family
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    family: EmbeddingFamily,
    dim: usize,
    names: Vec<String>,
    vectors: Vec<Vector>,
    sources: Vec<Option<String>>,
    positions: AHashMap<String, usize>,
}

impl EmbeddingStore {
    /// Build a store from feed records.
    ///
    /// With `expected_dim` unset, the first record fixes the width. An empty
    /// feed produces an empty store of that width.
    pub fn from_records(
        family: EmbeddingFamily,
        records: Vec<EmbeddingRecord>,
        expected_dim: Option<usize>,
    ) -> Result<Self> {
        let dim = expected_dim
            .or_else(|| records.first().map(|r| r.vector.len()))
            .unwrap_or_else(|| family.default_dim());

        let mut store = Self::empty(family, dim);
        store.names.reserve(records.len());
        store.vectors.reserve(records.len());

        for record in records {
            if record.vector.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: record.vector.len(),
                });
            }
            if store.positions.contains_key(&record.name) {
                return Err(Error::DuplicateEntity(record.name));
            }
            store.positions.insert(record.name.clone(), store.names.len());
            store.names.push(record.name);
            store.vectors.push(Vector::new(record.vector));
            store.sources.push(record.genus);
        }

        Ok(store)
    }

    /// A store with no entries; every lookup misses
    pub fn empty(family: EmbeddingFamily, dim: usize) -> Self {
        Self {
            family,
            dim,
            names: Vec::new(),
            vectors: Vec::new(),
            sources: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    pub fn family(&self) -> EmbeddingFamily {
        self.family
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Vector for `name`, or [`Error::MissingEmbedding`]
    pub fn get(&self, name: &str) -> Result<&Vector> {
        self.positions
            .get(name)
            .map(|&p| &self.vectors[p])
            .ok_or_else(|| Error::MissingEmbedding {
                family: self.family.to_string(),
                name: name.to_string(),
            })
    }

    /// Source text recorded alongside the vector, if any
    pub fn source_text(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .and_then(|&p| self.sources[p].as_deref())
    }

    /// `(name, vector)` pairs in feed order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.vectors.iter())
    }
}
