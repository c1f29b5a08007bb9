//! Ranked results and per-group score breakdowns

use crate::composite::Layout;
use crate::weights::Group;
use dexsim_core::{Distance, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ranked neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarEntry {
    pub name: String,
    /// Squared distance (euclidean) or cosine similarity
    pub score: f32,
    /// Contribution of each enabled group; the values sum to `score`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<BTreeMap<Group, f32>>,
}

impl SimilarEntry {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
            explain: None,
        }
    }
}

/// Split a score into per-group parts.
///
/// `stored` and `query` must already be in the index's comparison space
/// (unit-normalized for cosine). Euclidean parts are per-group squared
/// distances, cosine parts per-group inner products. Two zero vectors match
/// with cosine similarity 1, split across groups by width.
pub fn contributions(
    distance: Distance,
    layout: &Layout,
    stored: &Vector,
    query: &Vector,
) -> BTreeMap<Group, f32> {
    if distance == Distance::Cosine && stored.is_zero() && query.is_zero() {
        let total = stored.dim().max(1) as f32;
        return layout
            .iter()
            .map(|(group, range)| (*group, range.len() as f32 / total))
            .collect();
    }

    let (stored, query) = (stored.as_slice(), query.as_slice());
    layout
        .iter()
        .map(|(group, range)| {
            let pairs = stored[range.clone()].iter().zip(&query[range.clone()]);
            let part = match distance {
                Distance::Euclidean => pairs.map(|(s, q)| (s - q) * (s - q)).sum(),
                Distance::Cosine => pairs.map(|(s, q)| s * q).sum(),
            };
            (*group, part)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_parts_sum_to_distance() {
        let layout = vec![(Group::Image, 0..2), (Group::Stats, 2..3)];
        let a = Vector::new(vec![1.0, 2.0, 3.0]);
        let b = Vector::new(vec![0.0, 2.0, 1.0]);

        let parts = contributions(Distance::Euclidean, &layout, &a, &b);
        assert_eq!(parts[&Group::Image], 1.0);
        assert_eq!(parts[&Group::Stats], 4.0);
        assert_eq!(parts.values().sum::<f32>(), a.l2_squared(&b));
    }

    #[test]
    fn test_cosine_parts_sum_to_similarity() {
        let layout = vec![(Group::Types, 0..1), (Group::Color, 1..2)];
        let a = Vector::new(vec![3.0, 4.0]).normalized();
        let b = Vector::new(vec![1.0, 0.0]).normalized();

        let parts = contributions(Distance::Cosine, &layout, &a, &b);
        assert!((parts[&Group::Types] - 0.6).abs() < 1e-6);
        assert_eq!(parts[&Group::Color], 0.0);
    }

    #[test]
    fn test_cosine_zero_vectors_split_perfect_score() {
        let layout = vec![(Group::Booleans, 0..3), (Group::Color, 3..4)];
        let zero = Vector::new(vec![0.0; 4]);

        let parts = contributions(Distance::Cosine, &layout, &zero, &zero);
        assert!((parts[&Group::Booleans] - 0.75).abs() < 1e-6);
        assert!((parts[&Group::Color] - 0.25).abs() < 1e-6);
        assert!((parts.values().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_explain_omitted_when_absent() {
        let json = serde_json::to_value(SimilarEntry::new("ivysaur", 0.5)).unwrap();
        assert!(json.get("explain").is_none());
        assert_eq!(json["name"], "ivysaur");
    }
}
