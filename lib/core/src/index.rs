use crate::{Error, Result, Vector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Indexes with at least this many rows are scanned on the rayon pool
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Distance function of an index. Smaller is always closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distance {
    /// Squared L2
    #[default]
    Euclidean,
    /// 1 - cosine similarity
    Cosine,
    /// Negated inner product
    Dot,
}

impl Distance {
    #[inline]
    pub fn between(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Distance::Euclidean => crate::simd::l2_squared_simd(a, b),
            Distance::Cosine => {
                let norm_a = crate::simd::norm_simd(a);
                let norm_b = crate::simd::norm_simd(b);
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - crate::simd::dot_product_simd(a, b) / (norm_a * norm_b)
                }
            }
            Distance::Dot => -crate::simd::dot_product_simd(a, b),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Distance::Euclidean => "euclidean",
            Distance::Cosine => "cosine",
            Distance::Dot => "dot",
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Distance::Euclidean),
            "cosine" => Ok(Distance::Cosine),
            "dot" => Ok(Distance::Dot),
            other => Err(Error::InvalidConfig(format!("unknown distance: {other}"))),
        }
    }
}

/// One search result: a corpus row offset and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    pub row_index: usize,
    pub distance: f32,
}

/// Ascending distance, then ascending row index. Total, so results are reproducible.
#[inline]
fn hit_order(a: &SearchHit, b: &SearchHit) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.row_index.cmp(&b.row_index))
}

/// Exact nearest-neighbor index over row-ordered embeddings.
///
/// Vectors live in one contiguous buffer, row `i` at `[i * dim, (i + 1) * dim)`.
/// The index is immutable after construction.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectors: Vec<f32>,
    dim: usize,
    distance: Distance,
}

impl SimilarityIndex {
    /// Build a Euclidean index; row `i` is `vectors[i]`
    pub fn build(vectors: Vec<Vector>) -> Result<Self> {
        Self::build_with_distance(vectors, Distance::Euclidean)
    }

    pub fn build_with_distance(vectors: Vec<Vector>, distance: Distance) -> Result<Self> {
        let dim = vectors.first().map(Vector::dim).unwrap_or(0);
        let mut data = Vec::with_capacity(dim * vectors.len());

        for vector in vectors {
            if vector.dim() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: vector.dim(),
                });
            }
            data.extend_from_slice(vector.as_slice());
        }

        if dim == 0 && !data.is_empty() {
            return Err(Error::InvalidDimension {
                expected: 1,
                actual: 0,
            });
        }

        Ok(Self {
            vectors: data,
            dim,
            distance,
        })
    }

    /// Rebuild from a flat row-major buffer, as persisted on disk
    pub fn from_raw_parts(dim: usize, distance: Distance, vectors: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            if !vectors.is_empty() {
                return Err(Error::InvalidDimension {
                    expected: 1,
                    actual: 0,
                });
            }
        } else if vectors.len() % dim != 0 {
            return Err(Error::InvalidConfig(format!(
                "vector buffer of {} floats is not a multiple of dimension {dim}",
                vectors.len()
            )));
        }

        Ok(Self {
            vectors,
            dim,
            distance,
        })
    }

    /// The `k` rows closest to `query`, ascending by distance with ties broken
    /// by row index. Returns at most `min(k, len)` hits.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if query.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let mut hits = self.scan(query.as_slice());

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, hit_order);
            hits.truncate(k);
        }
        hits.sort_unstable_by(hit_order);
        Ok(hits)
    }

    fn scan(&self, query: &[f32]) -> Vec<SearchHit> {
        let distance = self.distance;
        let score = |(row_index, row): (usize, &[f32])| SearchHit {
            row_index,
            distance: distance.between(query, row),
        };

        if self.len() >= PARALLEL_SCAN_THRESHOLD {
            self.vectors
                .par_chunks_exact(self.dim)
                .enumerate()
                .map(score)
                .collect()
        } else {
            self.vectors
                .chunks_exact(self.dim)
                .enumerate()
                .map(score)
                .collect()
        }
    }

    /// Stored vector of a row
    #[inline]
    pub fn vector(&self, row_index: usize) -> Option<&[f32]> {
        if row_index >= self.len() {
            return None;
        }
        let start = row_index * self.dim;
        self.vectors.get(start..start + self.dim)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.vectors.len() / self.dim
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    #[must_use]
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Flat row-major vector buffer
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> &[f32] {
        &self.vectors
    }
}
