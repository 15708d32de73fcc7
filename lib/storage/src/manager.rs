use crate::corpus_file::{load_corpus, read_column, DEFAULT_SKILLS_COLUMN};
use crate::index_file::{load_index, save_index, IndexHeader};
use skilldex_core::{
    CorpusStore, Distance, Encoder, Error, Result, SimilarityIndex, SkillContext,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Batch size used when encoding the corpus for an index build
pub const DEFAULT_BUILD_BATCH: usize = 256;

/// A way in which the corpus, the index and the encoder disagree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Misalignment {
    RowCount { index: usize, corpus: usize },
    CorpusDigest { index: String, corpus: String },
    ModelId { index: String, encoder: String },
}

impl fmt::Display for Misalignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Misalignment::RowCount { index, corpus } => {
                write!(f, "index has {index} rows but corpus has {corpus}")
            }
            Misalignment::CorpusDigest { index, corpus } => write!(
                f,
                "index was built from corpus {index} but corpus file is {corpus}"
            ),
            Misalignment::ModelId { index, encoder } => write!(
                f,
                "index was built with encoder {index} but queries use {encoder}"
            ),
        }
    }
}

/// Compare an index header against the corpus and encoder it will serve with
pub fn check_alignment(
    header: &IndexHeader,
    corpus: &CorpusStore,
    corpus_sha256: Option<&str>,
    encoder: &dyn Encoder,
) -> Vec<Misalignment> {
    let mut issues = Vec::new();

    if header.row_count != corpus.len() {
        issues.push(Misalignment::RowCount {
            index: header.row_count,
            corpus: corpus.len(),
        });
    }
    if let (Some(recorded), Some(actual)) = (header.corpus_sha256.as_deref(), corpus_sha256) {
        if recorded != actual {
            issues.push(Misalignment::CorpusDigest {
                index: recorded.to_string(),
                corpus: actual.to_string(),
            });
        }
    }
    if header.model_id != encoder.model_id() {
        issues.push(Misalignment::ModelId {
            index: header.model_id.clone(),
            encoder: encoder.model_id().to_string(),
        });
    }
    issues
}

/// Options for the offline index build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Column whose text is embedded; defaults to the skills column
    pub embed_column: Option<String>,
    pub distance: Distance,
    pub batch_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            embed_column: None,
            distance: Distance::Euclidean,
            batch_size: DEFAULT_BUILD_BATCH,
        }
    }
}

/// Locates the startup artifacts and turns them into a [`SkillContext`]
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    corpus_path: PathBuf,
    index_path: PathBuf,
    skills_column: String,
    strict: bool,
}

impl ArtifactManager {
    pub fn new<C: AsRef<Path>, I: AsRef<Path>>(corpus_path: C, index_path: I) -> Self {
        Self {
            corpus_path: corpus_path.as_ref().to_path_buf(),
            index_path: index_path.as_ref().to_path_buf(),
            skills_column: DEFAULT_SKILLS_COLUMN.to_string(),
            strict: false,
        }
    }

    #[must_use]
    pub fn with_skills_column(mut self, column: impl Into<String>) -> Self {
        self.skills_column = column.into();
        self
    }

    /// Treat any misalignment as fatal instead of logging it
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Load corpus and index, check them against each other and the encoder.
    ///
    /// Missing or corrupt artifacts and a dimension mismatch always fail.
    /// Other misalignments are warnings unless the manager is strict; at query
    /// time out-of-range rows are skipped either way.
    pub fn open(&self, encoder: Arc<dyn Encoder>) -> Result<SkillContext> {
        let (corpus, digest) = load_corpus(&self.corpus_path, &self.skills_column)?;
        let artifact = load_index(&self.index_path)?;

        let issues = check_alignment(
            &artifact.header,
            &corpus,
            Some(digest.as_str()),
            encoder.as_ref(),
        );
        for issue in &issues {
            tracing::warn!(
                corpus = %self.corpus_path.display(),
                index = %self.index_path.display(),
                "artifact misalignment: {issue}"
            );
        }
        if self.strict && !issues.is_empty() {
            let summary: Vec<String> = issues.iter().map(ToString::to_string).collect();
            return Err(Error::InvalidConfig(format!(
                "artifacts are misaligned: {}",
                summary.join("; ")
            )));
        }

        SkillContext::new(corpus, artifact.index, encoder)
    }

    /// Encode the corpus in row order and write the index blob.
    pub fn build_index(&self, encoder: &dyn Encoder, options: &BuildOptions) -> Result<IndexHeader> {
        if options.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be at least 1".to_string()));
        }

        let column = options
            .embed_column
            .as_deref()
            .unwrap_or(&self.skills_column);
        let (texts, digest) = read_column(&self.corpus_path, column)?;
        tracing::info!(
            rows = texts.len(),
            column,
            model = encoder.model_id(),
            "encoding corpus"
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(options.batch_size).enumerate() {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let encoded = encoder.encode(&refs)?;
            if encoded.len() != refs.len() {
                return Err(Error::Encoding(format!(
                    "batch {batch_no}: {} vectors for {} texts",
                    encoded.len(),
                    refs.len()
                )));
            }
            vectors.extend(encoded);
            tracing::debug!(batch = batch_no, encoded = vectors.len(), "batch encoded");
        }

        let index = SimilarityIndex::build_with_distance(vectors, options.distance)?;
        let header = IndexHeader::for_index(&index, encoder.model_id(), Some(digest));
        save_index(&self.index_path, &index, &header)?;
        Ok(header)
    }
}
