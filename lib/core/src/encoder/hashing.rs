use super::{Encoder, DEFAULT_DIM};
use crate::{Error, Result, Vector};
use rayon::prelude::*;
use std::collections::HashSet;

/// Batches at least this large are encoded on the rayon pool
const PARALLEL_BATCH_THRESHOLD: usize = 64;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing encoder over character trigrams and words.
///
/// Needs no model files and is fully deterministic. Buckets come from FNV-1a,
/// which must stay stable across releases: persisted index blobs depend on it.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
    model_id: String,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            model_id: format!("hashing-fnv1a-{DEFAULT_DIM}"),
        }
    }
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "hashing encoder dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            dim,
            model_id: format!("hashing-fnv1a-{dim}"),
        })
    }

    /// Encode one text: trigram hits add 1.0, whole words add 2.0, then L2 normalize
    pub fn embed(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in trigrams(&normalized) {
            components[self.bucket(trigram.as_bytes())] += 1.0;
        }
        for word in normalized.split_whitespace() {
            components[self.bucket(word.as_bytes())] += 2.0;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    #[inline]
    fn bucket(&self, bytes: &[u8]) -> usize {
        (fnv1a(bytes) % self.dim as u64) as usize
    }
}

impl Encoder for HashingEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.len() >= PARALLEL_BATCH_THRESHOLD {
            Ok(texts.par_iter().map(|text| self.embed(text)).collect())
        } else {
            Ok(texts.iter().map(|text| self.embed(text)).collect())
        }
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Distinct character trigrams of the text padded with two spaces on each side
fn trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {s}  ");
    let chars: Vec<char> = padded.chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Distance;

    #[test]
    fn test_same_text_same_vector() {
        let encoder = HashingEncoder::default();
        let v1 = encoder.embed("Data scientist with Python");
        let v2 = encoder.embed("Data scientist with Python");
        assert_eq!(v1, v2);
        assert_eq!(v1.dim(), DEFAULT_DIM);
        assert!((v1.norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_similar_texts_are_closer() {
        let encoder = HashingEncoder::default();
        let query = encoder.embed("machine learning engineer");
        let near = encoder.embed("machine learning researcher");
        let far = encoder.embed("pastry chef");
        let cosine = |a: &Vector, b: &Vector| Distance::Cosine.between(a.as_slice(), b.as_slice());
        assert!(cosine(&query, &near) < cosine(&query, &far));
    }

    #[test]
    fn test_batch_preserves_order() {
        let encoder = HashingEncoder::new(32).unwrap();
        let texts: Vec<String> = (0..100).map(|i| format!("skill number {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let batch = encoder.encode(&refs).unwrap();
        assert_eq!(batch.len(), 100);
        for (text, vector) in refs.iter().zip(&batch) {
            assert_eq!(vector, &encoder.embed(text));
        }
    }

    #[test]
    fn test_empty_text_is_padding_only() {
        let encoder = HashingEncoder::new(16).unwrap();
        let v = encoder.encode_one("").unwrap();
        assert_eq!(v.dim(), 16);
        assert!(encoder.encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_dim_rejected() {
        assert!(matches!(HashingEncoder::new(0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }
}
