//! Embedding encoders
//!
//! An [`Encoder`] maps text to fixed-length vectors. The index and every
//! query must be encoded by the same model; [`Encoder::model_id`] is what the
//! artifact layer records and compares to catch a mismatch.

use crate::{Error, Result, Vector};

mod hashing;
#[cfg(feature = "fastembed")]
mod minilm;

pub use hashing::HashingEncoder;
#[cfg(feature = "fastembed")]
pub use minilm::MiniLmEncoder;

/// Output dimension of all-MiniLM-L6-v2, also the hashing encoder default
pub const DEFAULT_DIM: usize = 384;

/// Text to dense vector, deterministic for a fixed model
pub trait Encoder: Send + Sync {
    /// Encode a batch; the output has the same length and order as `texts`
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>>;

    /// Output dimension
    fn dim(&self) -> usize;

    /// Identifier of the model and its version
    fn model_id(&self) -> &str;

    fn encode_one(&self, text: &str) -> Result<Vector> {
        self.encode(&[text])?
            .pop()
            .ok_or_else(|| Error::Encoding("encoder returned no vector".to_string()))
    }
}
