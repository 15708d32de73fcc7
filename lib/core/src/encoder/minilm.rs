use super::{Encoder, DEFAULT_DIM};
use crate::{Error, Result, Vector};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::PathBuf;

/// all-MiniLM-L6-v2 sentence embeddings through the ONNX runtime.
///
/// The model files are downloaded into `cache_dir` on first use.
pub struct MiniLmEncoder {
    model: Mutex<TextEmbedding>,
    batch_size: Option<usize>,
}

impl MiniLmEncoder {
    pub const MODEL_ID: &'static str = "sentence-transformers/all-MiniLM-L6-v2";

    pub fn new(cache_dir: Option<PathBuf>, batch_size: Option<usize>) -> Result<Self> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Encoding(format!("failed to load {}: {e}", Self::MODEL_ID)))?;
        tracing::info!(model = Self::MODEL_ID, "sentence encoder loaded");

        Ok(Self {
            model: Mutex::new(model),
            batch_size,
        })
    }
}

impl Encoder for MiniLmEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| Error::Encoding(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(Error::Encoding(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings.into_iter().map(Vector::new).collect())
    }

    fn dim(&self) -> usize {
        DEFAULT_DIM
    }

    fn model_id(&self) -> &str {
        Self::MODEL_ID
    }
}
