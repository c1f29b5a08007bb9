//! # dexsim
//!
//! "Find similar" search over the Pokémon catalog.
//!
//! Every entity is described by attribute groups and two embedding families.
//! A query weights each group, the weighted groups are concatenated into one
//! composite vector per entity, and the composite space is searched exactly
//! under euclidean or cosine distance.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! dexsim --catalog data/pokemon.json \
//!     --image-vectors data/image_vectors.json \
//!     --text-vectors data/text_vectors.json \
//!     --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use dexsim::prelude::*;
//!
//! let mut sources = DataSources::new("data/pokemon.json");
//! sources.image_vectors = Some("data/image_vectors.json".into());
//! sources.text_vectors = Some("data/text_vectors.json".into());
//!
//! let (engine, _labels) = DataStore::open(&sources)?.into_engine(EngineConfig::default())?;
//!
//! let weights = GroupWeights::default().with(Group::Color, 0.0);
//! for entry in engine.find_similar_combined("bulbasaur", 10, Distance::Cosine, &weights)? {
//!     println!("{} {:.3}", entry.name, entry.score);
//! }
//! # Ok::<(), dexsim::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - `dexsim-core` - vectors, SIMD kernels, exact flat index, error type
//! - `dexsim-similarity` - records, vectorizer, composite builder, query engine
//! - `dexsim-storage` - JSON artifact loading and validation
//! - `dexsim-api` - REST routes

// Re-export core types
pub use dexsim_core::{Distance, Error, FlatIndex, Result, SearchHit, Vector};

// Re-export the similarity engine
pub use dexsim_similarity::{
    Catalog, CategoryLabels, EmbeddingFamily, EmbeddingStore, EngineConfig, EntityRecord,
    Family, Group, GroupWeights, NormalizationConstants, QueryEngine, SimilarEntry,
};

// Re-export storage
pub use dexsim_storage::{DataSources, DataStore};

// Re-export API
pub use dexsim_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppState, Catalog, DataSources, DataStore, Distance, EmbeddingFamily, EmbeddingStore,
        EngineConfig, EntityRecord, Error, Family, Group, GroupWeights, NormalizationConstants,
        QueryEngine, RestApi, Result, SimilarEntry, Vector,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use dexsim_core::simd::{dot_product_simd, l2_squared_simd, norm_simd};
}
