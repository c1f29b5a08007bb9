use crate::loader::{load_catalog, load_constants, load_embeddings, ArtifactDescription};
use dexsim_core::Result;
use dexsim_similarity::{
    Catalog, CategoryLabels, EmbeddingFamily, EmbeddingStore, EngineConfig,
    NormalizationConstants, QueryEngine,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the read-only artifacts live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSources {
    pub catalog: PathBuf,
    pub image_vectors: Option<PathBuf>,
    pub text_vectors: Option<PathBuf>,
    /// Derived from the catalog when absent
    pub constants: Option<PathBuf>,
    pub image_dim: Option<usize>,
    pub text_dim: Option<usize>,
}

impl DataSources {
    pub fn new(catalog: impl Into<PathBuf>) -> Self {
        Self {
            catalog: catalog.into(),
            ..Self::default()
        }
    }
}

/// Everything loaded at startup, validated and immutable
#[derive(Debug)]
pub struct DataStore {
    catalog: Catalog,
    image: EmbeddingStore,
    text: EmbeddingStore,
    constants: NormalizationConstants,
    labels: CategoryLabels,
    artifacts: Vec<ArtifactDescription>,
}

impl DataStore {
    /// Load and cross-check every artifact in `sources`
    pub fn open(sources: &DataSources) -> Result<Self> {
        let mut artifacts = Vec::new();

        let (records, description) = load_catalog(&sources.catalog)?;
        artifacts.push(description);

        let constants = match &sources.constants {
            Some(path) => {
                let (constants, description) = load_constants(path)?;
                artifacts.push(description);
                constants
            }
            None => {
                let constants = NormalizationConstants::from_catalog(&records)?;
                tracing::info!("Derived normalization constants from {} records", records.len());
                constants
            }
        };

        let catalog = Catalog::new(records, &constants)?;

        let mut load_family = |family: EmbeddingFamily,
                               path: &Option<PathBuf>,
                               dim: Option<usize>|
         -> Result<EmbeddingStore> {
            match path {
                Some(path) => {
                    let (store, description) = load_embeddings(path, family, dim)?;
                    artifacts.push(description);
                    Ok(store)
                }
                None => {
                    tracing::warn!("No {} embedding feed configured", family);
                    Ok(EmbeddingStore::empty(
                        family,
                        dim.unwrap_or_else(|| family.default_dim()),
                    ))
                }
            }
        };
        let image = load_family(EmbeddingFamily::Image, &sources.image_vectors, sources.image_dim)?;
        let text = load_family(EmbeddingFamily::Text, &sources.text_vectors, sources.text_dim)?;

        for store in [&image, &text] {
            check_join(&catalog, store);
        }

        for artifact in &artifacts {
            tracing::info!(
                "Loaded {} ({} entries, {} bytes, sha256 {})",
                artifact.path.display(),
                artifact.entries,
                artifact.size,
                artifact.checksum
            );
        }

        Ok(Self {
            catalog,
            image,
            text,
            constants,
            labels: CategoryLabels::reference(),
            artifacts,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn image(&self) -> &EmbeddingStore {
        &self.image
    }

    pub fn text(&self) -> &EmbeddingStore {
        &self.text
    }

    pub fn constants(&self) -> &NormalizationConstants {
        &self.constants
    }

    pub fn labels(&self) -> &CategoryLabels {
        &self.labels
    }

    pub fn artifacts(&self) -> &[ArtifactDescription] {
        &self.artifacts
    }

    /// Hand the data over to a query engine
    pub fn into_engine(self, config: EngineConfig) -> Result<(QueryEngine, CategoryLabels)> {
        let engine = QueryEngine::new(self.catalog, self.image, self.text, self.constants, config)?;
        Ok((engine, self.labels))
    }
}

/// Warn about feed entries that do not join with the catalog
fn check_join(catalog: &Catalog, store: &EmbeddingStore) -> usize {
    let unknown = store
        .iter()
        .filter(|(name, _)| !catalog.contains(name))
        .count();
    if unknown > 0 {
        tracing::warn!(
            "{} {} embeddings name entities outside the catalog",
            unknown,
            store.family()
        );
    }

    let missing = catalog
        .iter()
        .filter(|record| !store.contains(&record.name))
        .count();
    if missing > 0 && !store.is_empty() {
        tracing::warn!(
            "{} of {} catalog entities have no {} embedding and will be excluded from queries using it",
            missing,
            catalog.len(),
            store.family()
        );
    }
    missing
}
