//! Composite vector builder
//!
//! Concatenates the weighted group vectors of every eligible entity into one
//! space. Disabled groups contribute no dimensions at all, and entities
//! without an embedding for an enabled family are left out of the space
//! instead of being zero-filled.

use crate::catalog::Catalog;
use crate::constants::NormalizationConstants;
use crate::embedding::EmbeddingStore;
use crate::record::EntityRecord;
use crate::vectorize::{attribute_group_vector, attribute_width};
use crate::weights::{Group, GroupWeights};
use ahash::AHashMap;
use dexsim_core::{Distance, Error, FlatIndex, Result, Vector};
use rayon::prelude::*;
use std::ops::Range;

/// Where each enabled group sits inside a composite vector
pub type Layout = Vec<(Group, Range<usize>)>;

/// Borrowed view over the loaded data, producing composite spaces on demand
#[derive(Debug, Clone, Copy)]
pub struct CompositeBuilder<'a> {
    catalog: &'a Catalog,
    image: &'a EmbeddingStore,
    text: &'a EmbeddingStore,
    constants: &'a NormalizationConstants,
}

impl<'a> CompositeBuilder<'a> {
    pub fn new(
        catalog: &'a Catalog,
        image: &'a EmbeddingStore,
        text: &'a EmbeddingStore,
        constants: &'a NormalizationConstants,
    ) -> Self {
        Self {
            catalog,
            image,
            text,
            constants,
        }
    }

    /// Group widths for the enabled groups, in canonical order
    pub fn layout(&self, weights: &GroupWeights) -> Layout {
        let mut offset = 0;
        weights
            .enabled()
            .map(|(group, _)| {
                let width = self.width(group);
                let range = offset..offset + width;
                offset += width;
                (group, range)
            })
            .collect()
    }

    fn width(&self, group: Group) -> usize {
        match group {
            Group::Image => self.image.dim(),
            Group::Text => self.text.dim(),
            _ => attribute_width(group, self.constants).unwrap_or(0),
        }
    }

    /// Build the composite space for one weight configuration
    pub fn build(&self, weights: &GroupWeights) -> Result<CompositeSpace> {
        weights.validate()?;
        if !weights.any_enabled() {
            return Err(Error::EmptyCandidateSet(
                "every group weight is zero".to_string(),
            ));
        }

        let layout = self.layout(weights);
        let dim = layout.last().map(|(_, r)| r.end).unwrap_or(0);

        let composed: Vec<Option<Vector>> = self
            .catalog
            .records()
            .par_iter()
            .map(|record| self.compose(record, weights, &layout, dim))
            .collect::<Result<_>>()?;

        let mut names = Vec::with_capacity(composed.len());
        let mut vectors = Vec::with_capacity(composed.len());
        for (record, vector) in self.catalog.iter().zip(composed) {
            if let Some(vector) = vector {
                names.push(record.name.clone());
                vectors.push(vector);
            }
        }

        let excluded = self.catalog.len() - names.len();
        if excluded > 0 {
            tracing::debug!(
                "Excluded {} of {} entities missing an enabled embedding",
                excluded,
                self.catalog.len()
            );
        }

        Ok(CompositeSpace {
            names,
            vectors,
            dim,
            layout,
            excluded,
        })
    }

    /// Composite vector of one record, `None` when an enabled embedding is missing
    fn compose(
        &self,
        record: &EntityRecord,
        weights: &GroupWeights,
        layout: &Layout,
        dim: usize,
    ) -> Result<Option<Vector>> {
        let mut vector = Vector::with_capacity(dim);

        for ((group, weight), (_, range)) in weights.enabled().zip(layout) {
            let owned;
            let part: &[f32] = match group {
                Group::Image | Group::Text => {
                    let store = if group == Group::Image {
                        self.image
                    } else {
                        self.text
                    };
                    match store.get(&record.name) {
                        Ok(v) => v.as_slice(),
                        Err(Error::MissingEmbedding { .. }) => return Ok(None),
                        Err(e) => return Err(e),
                    }
                }
                _ => {
                    owned = attribute_group_vector(group, record, self.constants)
                        .unwrap_or_default();
                    &owned
                }
            };

            if part.len() != range.len() {
                return Err(Error::DimensionMismatch {
                    expected: range.len(),
                    actual: part.len(),
                });
            }
            vector.extend_scaled(part, weight);
        }

        Ok(Some(vector))
    }
}

/// Ordered `(name, composite vector)` set for one weight configuration
#[derive(Debug, Clone)]
pub struct CompositeSpace {
    names: Vec<String>,
    vectors: Vec<Vector>,
    dim: usize,
    layout: Layout,
    excluded: usize,
}

impl CompositeSpace {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of catalog entities left out for missing embeddings
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    /// Index the space under `distance`
    pub fn into_index(self, distance: Distance) -> Result<CompositeIndex> {
        let index = FlatIndex::build(distance, self.vectors)?;
        let positions = self
            .names
            .iter()
            .enumerate()
            .map(|(p, n)| (n.clone(), p))
            .collect();
        Ok(CompositeIndex {
            names: self.names,
            positions,
            layout: self.layout,
            excluded: self.excluded,
            index,
        })
    }
}

/// A searchable composite space
#[derive(Debug)]
pub struct CompositeIndex {
    names: Vec<String>,
    positions: AHashMap<String, usize>,
    layout: Layout,
    excluded: usize,
    index: FlatIndex,
}

impl CompositeIndex {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    pub fn distance(&self) -> Distance {
        self.index.distance()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingFamily, EmbeddingRecord};
    use crate::record::tests::bulbasaur;
    use crate::vectorize::attribute_vector;

    fn named(name: &str) -> EntityRecord {
        let mut record = bulbasaur();
        record.name = name.to_string();
        record
    }

    fn image_store(names: &[&str]) -> EmbeddingStore {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, n)| EmbeddingRecord {
                name: n.to_string(),
                vector: vec![i as f32, 1.0],
                genus: None,
            })
            .collect();
        EmbeddingStore::from_records(EmbeddingFamily::Image, records, None).unwrap()
    }

    struct Fixture {
        catalog: Catalog,
        image: EmbeddingStore,
        text: EmbeddingStore,
        constants: NormalizationConstants,
    }

    impl Fixture {
        fn new(catalog: &[&str], with_image: &[&str]) -> Self {
            let constants = NormalizationConstants::reference();
            Self {
                catalog: Catalog::new(catalog.iter().map(|n| named(n)).collect(), &constants)
                    .unwrap(),
                image: image_store(with_image),
                text: EmbeddingStore::empty(EmbeddingFamily::Text, 3),
                constants,
            }
        }

        fn builder(&self) -> CompositeBuilder<'_> {
            CompositeBuilder::new(&self.catalog, &self.image, &self.text, &self.constants)
        }
    }

    #[test]
    fn test_disabled_groups_have_no_dimensions() {
        let fixture = Fixture::new(&["bulbasaur"], &["bulbasaur"]);
        let builder = fixture.builder();

        let types_only = builder.build(&GroupWeights::only(Group::Types, 1.0)).unwrap();
        assert_eq!(types_only.dim(), 38);

        let with_color = GroupWeights::only(Group::Types, 1.0).with(Group::Color, 1.0);
        assert_eq!(builder.build(&with_color).unwrap().dim(), 38 + 11);

        let with_image = with_color.with(Group::Image, 0.5);
        let space = builder.build(&with_image).unwrap();
        assert_eq!(space.dim(), 2 + 38 + 11);
        assert_eq!(
            space.layout(),
            &vec![
                (Group::Image, 0..2),
                (Group::Types, 2..40),
                (Group::Color, 40..51),
            ]
        );
    }

    #[test]
    fn test_weights_scale_each_group() {
        let fixture = Fixture::new(&["bulbasaur"], &["bulbasaur"]);
        let weights = GroupWeights::only(Group::Image, 3.0).with(Group::Booleans, 2.0);
        let space = fixture.builder().build(&weights).unwrap();

        // image [0, 1] * 3, booleans [0, 0, 0] * 2
        assert_eq!(space.vectors()[0].as_slice(), &[0.0, 3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_embeddings_are_excluded() {
        let fixture = Fixture::new(&["bulbasaur", "ivysaur", "venusaur"], &["venusaur", "bulbasaur"]);
        let builder = fixture.builder();

        // text store is empty, so nothing survives the baseline weights
        let space = builder.build(&GroupWeights::default()).unwrap();
        assert!(space.is_empty());
        assert_eq!(space.excluded(), 3);
        let err = space.into_index(Distance::Cosine).unwrap_err();
        assert!(matches!(err, Error::EmptyCandidateSet(_)));

        let weights = GroupWeights::only(Group::Image, 1.0).with(Group::Types, 1.0);
        let space = builder.build(&weights).unwrap();
        assert_eq!(space.names(), &["bulbasaur".to_string(), "venusaur".to_string()]);
        assert_eq!(space.excluded(), 1);

        let attributes_only = builder.build(&GroupWeights::only(Group::Types, 1.0)).unwrap();
        assert_eq!(attributes_only.len(), 3);
        assert_eq!(attributes_only.excluded(), 0);
    }

    #[test]
    fn test_all_zero_weights_is_empty_candidate_set() {
        let fixture = Fixture::new(&["bulbasaur"], &["bulbasaur"]);
        let err = fixture.builder().build(&GroupWeights::none()).unwrap_err();
        assert!(matches!(err, Error::EmptyCandidateSet(_)));
    }

    #[test]
    fn test_unit_attribute_weights_match_attribute_vector() {
        let fixture = Fixture::new(&["bulbasaur"], &[]);
        let mut weights = GroupWeights::none();
        for group in Group::ATTRIBUTES {
            weights.set(group, 1.0);
        }
        let space = fixture.builder().build(&weights).unwrap();
        let expected = attribute_vector(&fixture.catalog.records()[0], &fixture.constants);
        assert_eq!(space.vectors()[0], expected);
    }

    #[test]
    fn test_into_index_maps_names() {
        let fixture = Fixture::new(&["bulbasaur", "ivysaur"], &["bulbasaur", "ivysaur"]);
        let index = fixture
            .builder()
            .build(&GroupWeights::only(Group::Image, 1.0))
            .unwrap()
            .into_index(Distance::Euclidean)
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.position("ivysaur"), Some(1));
        assert_eq!(index.name(0), Some("bulbasaur"));
        assert_eq!(index.dim(), 2);
    }

    #[test]
    fn test_short_stat_line_is_dimension_mismatch() {
        let fixture = Fixture::new(&["bulbasaur"], &["bulbasaur"]);
        let weights = GroupWeights::only(Group::Stats, 1.0);
        let builder = fixture.builder();
        let layout = builder.layout(&weights);
        let dim = layout.iter().map(|(_, r)| r.len()).sum();

        let mut record = named("bulbasaur");
        record.stats.truncate(5);
        let err = builder.compose(&record, &weights, &layout, dim).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 6,
                actual: 5
            }
        ));
    }

}
