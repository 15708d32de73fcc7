use crate::{split_skills, CorpusStore, Encoder, Error, Result, SimilarityIndex};
use std::sync::Arc;

/// Query handler settings
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Number of nearest corpus rows whose skills are returned
    pub top_k: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self { top_k: 1 }
    }
}

/// Everything a lookup reads: corpus, index and the encoder that built it.
///
/// Constructed once at startup and never mutated, so it can be shared across
/// request threads behind an `Arc` without locking.
pub struct SkillContext {
    corpus: CorpusStore,
    index: SimilarityIndex,
    encoder: Arc<dyn Encoder>,
}

impl SkillContext {
    /// Fails when the index dimension cannot match any query vector.
    /// Row alignment between corpus and index is assumed, not checked here.
    pub fn new(
        corpus: CorpusStore,
        index: SimilarityIndex,
        encoder: Arc<dyn Encoder>,
    ) -> Result<Self> {
        if !index.is_empty() && index.dim() != encoder.dim() {
            return Err(Error::InvalidConfig(format!(
                "index dimension {} does not match encoder {} dimension {}",
                index.dim(),
                encoder.model_id(),
                encoder.dim()
            )));
        }

        Ok(Self {
            corpus,
            index,
            encoder,
        })
    }

    #[inline]
    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    #[inline]
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    #[inline]
    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }
}

/// Free text in, skill tokens out
#[derive(Clone)]
pub struct QueryHandler {
    context: Arc<SkillContext>,
    config: HandlerConfig,
}

impl QueryHandler {
    pub fn new(context: Arc<SkillContext>, config: HandlerConfig) -> Result<Self> {
        if config.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        Ok(Self { context, config })
    }

    /// Skills of the configured number of nearest rows
    pub fn handle(&self, query_text: &str) -> Result<Vec<String>> {
        self.handle_with_k(query_text, self.config.top_k)
    }

    /// Encode the query, find the `k` nearest rows and tokenize their skills.
    ///
    /// Tokens are concatenated per row, then per token. Hits that point past
    /// the end of the corpus contribute nothing.
    pub fn handle_with_k(&self, query_text: &str, k: usize) -> Result<Vec<String>> {
        if query_text.is_empty() {
            return Err(Error::InvalidInput("no text provided".to_string()));
        }
        if k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }

        let query = self.context.encoder.encode_one(query_text)?;
        let hits = self.context.index.search(&query, k)?;

        let mut skills = Vec::new();
        for hit in hits {
            match self.context.corpus.get(hit.row_index) {
                Some(row) => skills.extend(split_skills(&row.skills_text)),
                None => tracing::debug!(
                    row_index = hit.row_index,
                    corpus_rows = self.context.corpus.len(),
                    "index hit outside corpus, skipped"
                ),
            }
        }
        Ok(skills)
    }

    #[inline]
    pub fn context(&self) -> &SkillContext {
        &self.context
    }

    #[inline]
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashingEncoder, Vector};

    /// Encoder that maps a few known phrases to fixed axes
    struct AxisEncoder;

    impl Encoder for AxisEncoder {
        fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>> {
            texts
                .iter()
                .map(|text| match *text {
                    "data" => Ok(Vector::new(vec![1.0, 0.0, 0.0])),
                    "web" => Ok(Vector::new(vec![0.0, 1.0, 0.0])),
                    "ops" => Ok(Vector::new(vec![0.0, 0.0, 1.0])),
                    "fail" => Err(Error::Encoding("unsupported input".to_string())),
                    _ => Ok(Vector::new(vec![0.5, 0.5, 0.5])),
                })
                .collect()
        }

        fn dim(&self) -> usize {
            3
        }

        fn model_id(&self) -> &str {
            "axis-test"
        }
    }

    fn axis_index(rows: usize) -> SimilarityIndex {
        let axes = [
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        SimilarityIndex::build((0..rows).map(|i| Vector::new(axes[i % 3].clone())).collect())
            .unwrap()
    }

    fn handler(corpus: CorpusStore, index: SimilarityIndex, top_k: usize) -> QueryHandler {
        let context = SkillContext::new(corpus, index, Arc::new(AxisEncoder)).unwrap();
        QueryHandler::new(Arc::new(context), HandlerConfig { top_k }).unwrap()
    }

    fn corpus() -> CorpusStore {
        CorpusStore::from_texts([
            "ex Python, SQL, Machine learning",
            "JavaScript, React, HTML",
            "Docker, Kubernetes, AWS",
        ])
    }

    #[test]
    fn test_top_one_returns_row_skills() {
        let handler = handler(corpus(), axis_index(3), 1);
        assert_eq!(
            handler.handle("data").unwrap(),
            vec!["Python", "SQL", "Machine learning"]
        );
        assert_eq!(
            handler.handle("ops").unwrap(),
            vec!["Docker", "Kubernetes", "AWS"]
        );
    }

    #[test]
    fn test_top_k_concatenates_in_hit_order() {
        let handler = handler(corpus(), axis_index(3), 1);
        let skills = handler.handle_with_k("web", 2).unwrap();
        // web is nearest; data and ops tie and the lower row wins
        assert_eq!(
            skills,
            vec!["Java", "Script", "React", "HTML", "Python", "SQL", "Machine learning"]
        );
    }

    #[test]
    fn test_empty_query_is_invalid_input() {
        let handler = handler(corpus(), axis_index(3), 1);
        assert!(matches!(handler.handle(""), Err(Error::InvalidInput(_))));
        assert!(matches!(handler.handle_with_k("data", 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_hits_past_corpus_end_are_skipped() {
        // Index has 6 rows, corpus only 3: rows 3..6 have no skills.
        let handler = handler(corpus(), axis_index(6), 1);
        let skills = handler.handle_with_k("ops", 2).unwrap();
        assert_eq!(skills, vec!["Docker", "Kubernetes", "AWS"]);

        let empty = self::handler(CorpusStore::default(), axis_index(3), 1);
        assert!(empty.handle("data").unwrap().is_empty());
    }

    #[test]
    fn test_rows_without_capitalized_words_yield_nothing() {
        let corpus = CorpusStore::from_texts(["python, sql", "", "ex"]);
        let handler = handler(corpus, axis_index(3), 3);
        assert!(handler.handle("anything").unwrap().is_empty());
    }

    #[test]
    fn test_encoding_error_is_surfaced() {
        let handler = handler(corpus(), axis_index(3), 1);
        assert!(matches!(handler.handle("fail"), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_context_rejects_dimension_mismatch() {
        let index = SimilarityIndex::build(vec![Vector::new(vec![1.0, 0.0])]).unwrap();
        let result = SkillContext::new(corpus(), index, Arc::new(AxisEncoder));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let context = SkillContext::new(corpus(), axis_index(3), Arc::new(AxisEncoder)).unwrap();
        let result = QueryHandler::new(Arc::new(context), HandlerConfig { top_k: 0 });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_any_non_empty_query_succeeds_with_hashing_encoder() {
        let encoder = HashingEncoder::new(64).unwrap();
        let texts = ["Python, SQL", "Java, Spring", "Figma, UX design"];
        let vectors = encoder.encode(&texts).unwrap();
        let context = SkillContext::new(
            CorpusStore::from_texts(texts),
            SimilarityIndex::build(vectors).unwrap(),
            Arc::new(encoder),
        )
        .unwrap();
        let handler = QueryHandler::new(Arc::new(context), HandlerConfig::default()).unwrap();

        for query in [" ", "x", "Java developer", "ünïcödé", "1234"] {
            assert!(handler.handle(query).is_ok());
        }
        assert_eq!(handler.handle("Java, Spring").unwrap(), vec!["Java", "Spring"]);
    }
}
