use crate::{Error, Result, Vector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Catalogs above this size are scored on the rayon pool
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Distance semantics of a [`FlatIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// Squared L2 distance, smaller is more similar
    Euclidean,
    /// Inner product of unit-normalized vectors, larger is more similar
    #[default]
    Cosine,
}

impl Distance {
    /// Score of a vector compared with itself
    pub fn perfect_score(self) -> f32 {
        match self {
            Distance::Euclidean => 0.0,
            Distance::Cosine => 1.0,
        }
    }

    /// Orders two scores best-first
    #[inline]
    pub fn compare(self, a: f32, b: f32) -> Ordering {
        match self {
            Distance::Euclidean => OrderedFloat(a).cmp(&OrderedFloat(b)),
            Distance::Cosine => OrderedFloat(b).cmp(&OrderedFloat(a)),
        }
    }

    /// Bring a vector into the space this distance compares in
    pub fn prepare(self, vector: &Vector) -> Vector {
        match self {
            Distance::Euclidean => vector.clone(),
            Distance::Cosine => vector.normalized(),
        }
    }

    /// `zero_query` marks a cosine query with no direction; it matches
    /// stored zero vectors perfectly and everything else with 0.
    #[inline]
    fn score(self, stored: &Vector, query: &Vector, zero_query: bool) -> f32 {
        match self {
            Distance::Euclidean => stored.l2_squared(query),
            Distance::Cosine if zero_query && stored.is_zero() => 1.0,
            Distance::Cosine => stored.dot(query),
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distance::Euclidean => write!(f, "euclidean"),
            Distance::Cosine => write!(f, "cosine"),
        }
    }
}

impl std::str::FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Distance::Euclidean),
            "cosine" => Ok(Distance::Cosine),
            other => Err(Error::InvalidConfig(format!("unknown distance: {}", other))),
        }
    }
}

/// One search result: position in insertion order and its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub score: f32,
}

/// Exact nearest-neighbour index over a fixed, ordered set of vectors.
///
/// Every search scans all stored vectors. Cosine indexes store unit-normalized
/// copies and normalize each query the same way before comparing.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    distance: Distance,
    dim: usize,
    vectors: Vec<Vector>,
}

impl FlatIndex {
    /// Build an index; the first vector fixes the dimensionality
    pub fn build(distance: Distance, vectors: Vec<Vector>) -> Result<Self> {
        let dim = match vectors.first() {
            Some(v) => v.dim(),
            None => {
                return Err(Error::EmptyCandidateSet(
                    "cannot build an index without vectors".to_string(),
                ))
            }
        };

        if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: bad.dim(),
            });
        }

        let vectors = match distance {
            Distance::Euclidean => vectors,
            Distance::Cosine => vectors
                .into_iter()
                .map(|mut v| {
                    v.normalize();
                    v
                })
                .collect(),
        };

        Ok(Self {
            distance,
            dim,
            vectors,
        })
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stored vector at `position`, as compared (normalized for cosine)
    pub fn vector(&self, position: usize) -> Option<&Vector> {
        self.vectors.get(position)
    }

    /// Return the `k` best matches for `query`, best first.
    ///
    /// `k` is clamped to the number of stored vectors; `k == 0` yields nothing.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<SearchHit>> {
        if query.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let k = k.min(self.vectors.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.distance.prepare(query);
        let distance = self.distance;
        let zero_query = distance == Distance::Cosine && query.is_zero();
        let score_at = |(position, stored): (usize, &Vector)| SearchHit {
            position,
            score: distance.score(stored, &query, zero_query),
        };

        let mut hits: Vec<SearchHit> = if self.vectors.len() >= PARALLEL_SCAN_THRESHOLD {
            self.vectors.par_iter().enumerate().map(score_at).collect()
        } else {
            self.vectors.iter().enumerate().map(score_at).collect()
        };

        let by_rank = |a: &SearchHit, b: &SearchHit| {
            distance
                .compare(a.score, b.score)
                .then(a.position.cmp(&b.position))
        };

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, by_rank);
            hits.truncate(k);
        }
        hits.sort_by(by_rank);
        Ok(hits)
    }
}
