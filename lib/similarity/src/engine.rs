//! Query engine
//!
//! Owns the loaded catalog and embedding stores, keeps one prebuilt index per
//! single family, and builds a composite index per combined query.

use crate::catalog::Catalog;
use crate::composite::{CompositeBuilder, CompositeIndex};
use crate::constants::NormalizationConstants;
use crate::embedding::EmbeddingStore;
use crate::explain::{contributions, SimilarEntry};
use crate::weights::{Group, GroupWeights};
use dexsim_core::{Distance, Error, Result};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Prebuilt single-family vector space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Image,
    Text,
    /// Every attribute group at unit weight
    #[default]
    Attributes,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Image, Family::Text, Family::Attributes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Image => "image",
            Family::Text => "text",
            Family::Attributes => "attributes",
        }
    }

    /// Weights that select exactly this family's groups
    pub fn weights(&self) -> GroupWeights {
        match self {
            Family::Image => GroupWeights::only(Group::Image, 1.0),
            Family::Text => GroupWeights::only(Group::Text, 1.0),
            Family::Attributes => Group::ATTRIBUTES
                .into_iter()
                .fold(GroupWeights::none(), |w, g| w.with(g, 1.0)),
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Family::Image),
            "text" => Ok(Family::Text),
            "attributes" | "pokemon" => Ok(Family::Attributes),
            other => Err(Error::InvalidConfig(format!("unknown family: {}", other))),
        }
    }
}

/// Engine options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keep the query entity in its own results
    pub include_self: bool,
    /// Composite indexes kept for reuse; 0 rebuilds on every query
    pub cache_capacity: usize,
    /// Distance of the prebuilt single-family indexes
    pub family_distance: Distance,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_self: true,
            cache_capacity: 0,
            family_distance: Distance::Euclidean,
        }
    }
}

type CacheKey = (Distance, [u32; 12]);

/// Serves single-family and combined weighted similarity queries
pub struct QueryEngine {
    catalog: Catalog,
    image: EmbeddingStore,
    text: EmbeddingStore,
    constants: NormalizationConstants,
    config: EngineConfig,
    /// `None` when the family has no eligible entities
    families: [Option<CompositeIndex>; 3],
    cache: Option<Mutex<LruCache<CacheKey, Arc<CompositeIndex>>>>,
}

impl QueryEngine {
    /// Take ownership of the loaded data and prebuild the family indexes
    pub fn new(
        catalog: Catalog,
        image: EmbeddingStore,
        text: EmbeddingStore,
        constants: NormalizationConstants,
        config: EngineConfig,
    ) -> Result<Self> {
        let mut engine = Self {
            catalog,
            image,
            text,
            constants,
            config,
            families: [None, None, None],
            cache: NonZeroUsize::new(config.cache_capacity)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        };

        for family in Family::ALL {
            let index = match engine
                .builder()
                .build(&family.weights())?
                .into_index(config.family_distance)
            {
                Ok(index) => Some(index),
                Err(Error::EmptyCandidateSet(_)) => {
                    tracing::warn!("No entities available for the {} family", family);
                    None
                }
                Err(e) => return Err(e),
            };
            if let Some(index) = &index {
                tracing::debug!(
                    "Built {} family index: {} entities, {} dims",
                    family,
                    index.len(),
                    index.dim()
                );
            }
            engine.families[family as usize] = index;
        }

        Ok(engine)
    }

    fn builder(&self) -> CompositeBuilder<'_> {
        CompositeBuilder::new(&self.catalog, &self.image, &self.text, &self.constants)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn constants(&self) -> &NormalizationConstants {
        &self.constants
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of entities searchable in a single family
    pub fn family_len(&self, family: Family) -> usize {
        self.families[family as usize]
            .as_ref()
            .map_or(0, CompositeIndex::len)
    }

    /// Baseline weights for combined queries
    pub fn default_weights(&self) -> GroupWeights {
        GroupWeights::default()
    }

    /// `k` nearest entities to `name` within one prebuilt family
    pub fn find_similar(&self, name: &str, k: usize, family: Family) -> Result<Vec<SimilarEntry>> {
        self.ensure_known(name)?;
        let index = self.families[family as usize].as_ref().ok_or_else(|| {
            Error::EmptyCandidateSet(format!("no entities in the {} family", family))
        })?;
        self.search(index, name, k, false)
    }

    /// `k` nearest entities to `name` in the composite space of `weights`
    pub fn find_similar_combined(
        &self,
        name: &str,
        k: usize,
        distance: Distance,
        weights: &GroupWeights,
    ) -> Result<Vec<SimilarEntry>> {
        self.combined(name, k, distance, weights, false)
    }

    /// Like [`find_similar_combined`](Self::find_similar_combined), with
    /// per-group contributions attached to every entry
    pub fn find_similar_combined_explained(
        &self,
        name: &str,
        k: usize,
        distance: Distance,
        weights: &GroupWeights,
    ) -> Result<Vec<SimilarEntry>> {
        self.combined(name, k, distance, weights, true)
    }

    fn combined(
        &self,
        name: &str,
        k: usize,
        distance: Distance,
        weights: &GroupWeights,
        explain: bool,
    ) -> Result<Vec<SimilarEntry>> {
        weights.validate()?;
        self.ensure_known(name)?;
        if !weights.any_enabled() {
            return Err(Error::EmptyCandidateSet(
                "every group weight is zero".to_string(),
            ));
        }

        let index = self.composite_index(distance, weights)?;
        self.search(&index, name, k, explain)
    }

    fn ensure_known(&self, name: &str) -> Result<()> {
        if self.catalog.contains(name) {
            Ok(())
        } else {
            Err(Error::NotFound(name.to_string()))
        }
    }

    /// Fetch from the cache or build the composite index for `weights`
    fn composite_index(
        &self,
        distance: Distance,
        weights: &GroupWeights,
    ) -> Result<Arc<CompositeIndex>> {
        let key = (distance, weights.cache_key());

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().get(&key) {
                tracing::debug!("Composite index cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        let space = self.builder().build(weights)?;
        tracing::debug!(
            "Built composite space: {} entities, {} dims, {} excluded",
            space.len(),
            space.dim(),
            space.excluded()
        );
        let index = Arc::new(space.into_index(distance)?);

        if let Some(cache) = &self.cache {
            cache.lock().put(key, Arc::clone(&index));
        }
        Ok(index)
    }

    fn search(
        &self,
        index: &CompositeIndex,
        name: &str,
        k: usize,
        explain: bool,
    ) -> Result<Vec<SimilarEntry>> {
        let position = index
            .position(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let flat = index.index();
        let query = flat
            .vector(position)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let include_self = self.config.include_self;
        let wanted = if include_self { k } else { k.saturating_add(1) };
        let mut hits = flat.search(query, wanted)?;
        if !include_self {
            hits.retain(|hit| hit.position != position);
            hits.truncate(k);
        }

        hits.into_iter()
            .map(|hit| {
                let name = index
                    .name(hit.position)
                    .ok_or_else(|| Error::NotFound(format!("position {}", hit.position)))?;
                let mut entry = SimilarEntry::new(name, hit.score);
                if explain {
                    if let Some(stored) = flat.vector(hit.position) {
                        entry.explain = Some(contributions(
                            flat.distance(),
                            index.layout(),
                            stored,
                            query,
                        ));
                    }
                }
                Ok(entry)
            })
            .collect()
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("entities", &self.catalog.len())
            .field("image", &self.image.len())
            .field("text", &self.text.len())
            .field("config", &self.config)
            .finish()
    }
}
