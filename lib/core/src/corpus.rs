use serde::{Deserialize, Serialize};

/// One corpus record: the skills blob of a training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRow {
    /// 0-based position; the join key against the similarity index
    pub row_index: usize,
    pub skills_text: String,
}

/// In-memory skills table, read-only once loaded.
///
/// Row order is significant: row `i` here is row `i` of the index built over
/// it. Nothing verifies that at query time, so lookups past the end return
/// `None` rather than failing.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    rows: Vec<CorpusRow>,
}

impl CorpusStore {
    /// Build a store from skills texts, assigning row indices in iteration order
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = texts
            .into_iter()
            .enumerate()
            .map(|(row_index, text)| CorpusRow {
                row_index,
                skills_text: text.into(),
            })
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn get(&self, row_index: usize) -> Option<&CorpusRow> {
        self.rows.get(row_index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusRow> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_indices_follow_input_order() {
        let corpus = CorpusStore::from_texts(["Python, SQL", "Java", "Rust"]);
        assert_eq!(corpus.len(), 3);
        for (i, row) in corpus.iter().enumerate() {
            assert_eq!(row.row_index, i);
        }
        assert_eq!(corpus.get(1).map(|r| r.skills_text.as_str()), Some("Java"));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let corpus = CorpusStore::from_texts(["Python"]);
        assert!(corpus.get(1).is_none());
        assert!(corpus.get(usize::MAX).is_none());

        let empty = CorpusStore::default();
        assert!(empty.is_empty());
        assert!(empty.get(0).is_none());
    }
}
