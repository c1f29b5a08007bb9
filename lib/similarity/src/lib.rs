//! # dexsim Similarity
//!
//! Combined vector similarity over the Pokémon catalog.
//!
//! Each entity is described by attribute groups (pokedex position, size,
//! types, egg groups, color, habitat, shape, evolution chain, flags, stats)
//! and by two externally generated embeddings (image, text). A query picks a
//! weight per group; the enabled groups are scaled and concatenated into one
//! composite space which is then searched exhaustively.
//!
//! ## Example
//!
//! ```rust
//! use dexsim_similarity::{
//!     Catalog, EmbeddingFamily, EmbeddingStore, EngineConfig, EntityRecord, Group,
//!     GroupWeights, NormalizationConstants, QueryEngine,
//! };
//! use dexsim_core::Distance;
//!
//! let records: Vec<EntityRecord> = serde_json::from_str(r#"[
//!   {"name": "bulbasaur", "order": 1, "pokedex_number": 1, "species_index": 1,
//!    "weight": 69, "height": 7, "stats": [45, 49, 49, 65, 65, 45], "types": [12, 4],
//!    "generation": 1, "eggGroups": [1, 7], "color": 5, "habitat": 3, "shape": 8,
//!    "is_baby": 0, "is_legendary": 0, "is_mythical": 0, "evolution_chain": 1},
//!   {"name": "charmander", "order": 5, "pokedex_number": 4, "species_index": 4,
//!    "weight": 85, "height": 6, "stats": [39, 52, 43, 60, 50, 65], "types": [10],
//!    "generation": 1, "eggGroups": [1, 14], "color": 8, "habitat": 4, "shape": 6,
//!    "is_baby": 0, "is_legendary": 0, "is_mythical": 0, "evolution_chain": 2}
//! ]"#).unwrap();
//!
//! let constants = NormalizationConstants::reference();
//! let engine = QueryEngine::new(
//!     Catalog::new(records, &constants).unwrap(),
//!     EmbeddingStore::empty(EmbeddingFamily::Image, 768),
//!     EmbeddingStore::empty(EmbeddingFamily::Text, 384),
//!     constants,
//!     EngineConfig::default(),
//! )
//! .unwrap();
//!
//! let weights = GroupWeights::only(Group::Types, 1.0).with(Group::Stats, 1.0);
//! let results = engine
//!     .find_similar_combined("bulbasaur", 2, Distance::Euclidean, &weights)
//!     .unwrap();
//! assert_eq!(results[0].name, "bulbasaur");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────>│ Vectorizer  │──┐
//! └─────────────┘     └─────────────┘  │   ┌─────────────┐     ┌─────────────┐
//!                                      ├──>│  Composite  │────>│ Flat index  │
//! ┌─────────────┐                      │   │   builder   │     │  (search)   │
//! │ Embeddings  │──────────────────────┘   └─────────────┘     └─────────────┘
//! └─────────────┘                                 ▲                   │
//!                                          ┌─────────────┐            │
//!                                          │   Weights   │     ┌─────────────┐
//!                                          └─────────────┘     │   Explain   │
//!                                                              └─────────────┘
//! ```

pub mod catalog;
pub mod composite;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod explain;
pub mod record;
pub mod vectorize;
pub mod weights;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use composite::{CompositeBuilder, CompositeIndex, CompositeSpace, Layout};
pub use constants::{CategoryLabels, NormalizationConstants};
pub use embedding::{
    EmbeddingFamily, EmbeddingRecord, EmbeddingStore, DEFAULT_IMAGE_DIM, DEFAULT_TEXT_DIM,
};
pub use engine::{EngineConfig, Family, QueryEngine};
pub use explain::SimilarEntry;
pub use record::EntityRecord;
pub use weights::{Group, GroupWeights};
