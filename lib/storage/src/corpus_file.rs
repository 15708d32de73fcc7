// CSV corpus loading
use sha2::{Digest, Sha256};
use skilldex_core::{CorpusStore, Error, Result};
use std::path::Path;

/// Column holding the skills blob in the reference corpus
pub const DEFAULT_SKILLS_COLUMN: &str = "skills";

/// Load the skills column of a CSV file, preserving row order, along with the
/// hex SHA-256 of the bytes that were parsed.
///
/// The file must have a header row naming `skills_column`. A missing file is
/// an `Io` error; a malformed file or missing column is `CorruptArtifact`.
pub fn load_corpus<P: AsRef<Path>>(path: P, skills_column: &str) -> Result<(CorpusStore, String)> {
    let (texts, digest) = read_column(&path, skills_column)?;
    tracing::info!(
        path = %path.as_ref().display(),
        rows = texts.len(),
        column = skills_column,
        sha256 = %digest,
        "corpus loaded"
    );
    Ok((CorpusStore::from_texts(texts), digest))
}

/// Every value of one named column in file order, plus the file's hex SHA-256.
///
/// The file is read once; the digest covers exactly the bytes parsed. Empty
/// cells become `""`.
pub fn read_column<P: AsRef<Path>>(path: P, column: &str) -> Result<(Vec<String>, String)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let digest = format!("{:x}", Sha256::digest(&bytes));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes.as_slice());

    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    let position = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::corrupt(path, format!("missing column '{column}'")))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        values.push(record.get(position).unwrap_or_default().to_string());
    }
    Ok((values, digest))
}

fn csv_error(path: &Path, e: csv::Error) -> Error {
    if e.is_io_error() {
        if let csv::ErrorKind::Io(io) = e.into_kind() {
            return Error::Io(io);
        }
        return Error::corrupt(path, "unreadable csv");
    }
    Error::corrupt(path, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "train.csv",
            "title,skills\nData scientist,\"Python, SQL\"\nWeb dev,\"JavaScript, React\"\nOps,\n",
        );

        let (corpus, _) = load_corpus(&path, DEFAULT_SKILLS_COLUMN).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.get(0).unwrap().skills_text, "Python, SQL");
        assert_eq!(corpus.get(1).unwrap().skills_text, "JavaScript, React");
        assert_eq!(corpus.get(2).unwrap().skills_text, "");
        assert_eq!(corpus.get(2).unwrap().row_index, 2);

        let (titles, _) = read_column(&path, "title").unwrap();
        assert_eq!(titles, vec!["Data scientist", "Web dev", "Ops"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(dir.path().join("absent.csv"), "skills").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_artifact_error());
    }

    #[test]
    fn test_missing_column_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "train.csv", "title,text\nA,B\n");
        let err = load_corpus(&path, "skills").unwrap_err();
        assert!(matches!(err, Error::CorruptArtifact { .. }));
    }

    #[test]
    fn test_ragged_rows_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "train.csv", "title,skills\nA,B\nC,D,E\n");
        let err = load_corpus(&path, "skills").unwrap_err();
        assert!(matches!(err, Error::CorruptArtifact { .. }));
    }

    #[test]
    fn test_digest_covers_parsed_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let body = "skills\nPython\n";
        let a = write_csv(&dir, "a.csv", body);
        let b = write_csv(&dir, "b.csv", body);
        let c = write_csv(&dir, "c.csv", "skills\nRust\n");

        let (values, digest) = read_column(&a, "skills").unwrap();
        assert_eq!(values, vec!["Python"]);
        assert_eq!(digest, format!("{:x}", Sha256::digest(body.as_bytes())));
        assert_eq!(digest.len(), 64);

        assert_eq!(read_column(&b, "skills").unwrap().1, digest);
        assert_ne!(read_column(&c, "skills").unwrap().1, digest);
    }
}
