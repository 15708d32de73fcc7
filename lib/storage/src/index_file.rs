// Persisted similarity index blobs
//
// Layout: 8-byte magic, then a gzip stream holding two bincode values, the
// `IndexHeader` followed by the row-major `f32` vector buffer.
use atomicwrites::{AtomicFile, OverwriteBehavior};
use bincode::Options;
use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use skilldex_core::{Distance, Error, Result, SimilarityIndex};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const INDEX_MAGIC: &[u8; 8] = b"SKDXIDX1";
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Upper bound on the encoded header size
const MAX_HEADER_BYTES: u64 = 64 * 1024;
/// Length prefix of the encoded vector buffer
const SEQ_PREFIX_BYTES: u64 = 8;

/// Fixed-width little-endian integers; decoding is always given a byte limit
/// so corrupt length prefixes fail instead of allocating.
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Provenance recorded alongside the vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub format_version: u32,
    /// Encoder that produced the vectors
    pub model_id: String,
    pub dim: usize,
    pub distance: Distance,
    pub row_count: usize,
    /// SHA-256 of the corpus file the rows were read from, if known
    pub corpus_sha256: Option<String>,
    /// RFC 3339 build time
    pub built_at: String,
}

impl IndexHeader {
    pub fn for_index(
        index: &SimilarityIndex,
        model_id: impl Into<String>,
        corpus_sha256: Option<String>,
    ) -> Self {
        Self {
            format_version: INDEX_FORMAT_VERSION,
            model_id: model_id.into(),
            dim: index.dim(),
            distance: index.distance(),
            row_count: index.len(),
            corpus_sha256,
            built_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A loaded blob: the index and where it came from
#[derive(Debug, Clone)]
pub struct IndexArtifact {
    pub header: IndexHeader,
    pub index: SimilarityIndex,
}

/// Write an index blob atomically; readers never observe a partial file.
pub fn save_index<P: AsRef<Path>>(
    path: P,
    index: &SimilarityIndex,
    header: &IndexHeader,
) -> Result<()> {
    let path = path.as_ref();
    if header.dim != index.dim() || header.row_count != index.len() {
        return Err(Error::InvalidConfig(format!(
            "header describes {}x{} but index is {}x{}",
            header.row_count,
            header.dim,
            index.len(),
            index.dim()
        )));
    }

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| -> io::Result<()> {
            let mut writer = BufWriter::new(f);
            writer.write_all(INDEX_MAGIC)?;
            let mut encoder = GzEncoder::new(writer, Compression::default());
            wire_options()
                .serialize_into(&mut encoder, header)
                .map_err(io::Error::other)?;
            wire_options()
                .serialize_into(&mut encoder, index.as_raw())
                .map_err(io::Error::other)?;
            encoder.finish()?.flush()
        })
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })?;

    tracing::info!(
        path = %path.display(),
        rows = header.row_count,
        dim = header.dim,
        model = %header.model_id,
        "index saved"
    );
    Ok(())
}

/// Read and validate an index blob
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<IndexArtifact> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::corrupt(path, "file too short"),
        _ => Error::Io(e),
    })?;
    if &magic != INDEX_MAGIC {
        return Err(Error::corrupt(path, "not a skilldex index file"));
    }

    let mut stream = GzDecoder::new(reader);
    let header: IndexHeader = wire_options()
        .with_limit(MAX_HEADER_BYTES)
        .deserialize_from(&mut stream)
        .map_err(|e| Error::corrupt(path, format!("undecodable index header: {e}")))?;

    if header.format_version != INDEX_FORMAT_VERSION {
        return Err(Error::corrupt(
            path,
            format!("unsupported format version {}", header.format_version),
        ));
    }
    let vector_bytes = header
        .dim
        .checked_mul(header.row_count)
        .and_then(|floats| floats.checked_mul(std::mem::size_of::<f32>()))
        .and_then(|bytes| u64::try_from(bytes).ok())
        .and_then(|bytes| bytes.checked_add(SEQ_PREFIX_BYTES))
        .ok_or_else(|| {
            Error::corrupt(
                path,
                format!("implausible shape {} x {}", header.row_count, header.dim),
            )
        })?;

    let vectors: Vec<f32> = wire_options()
        .with_limit(vector_bytes)
        .deserialize_from(&mut stream)
        .map_err(|e| Error::corrupt(path, format!("undecodable index vectors: {e}")))?;
    if vectors.len() != header.dim * header.row_count {
        return Err(Error::corrupt(
            path,
            format!(
                "expected {} x {} floats, found {}",
                header.row_count,
                header.dim,
                vectors.len()
            ),
        ));
    }

    let index = SimilarityIndex::from_raw_parts(header.dim, header.distance, vectors)
        .map_err(|e| Error::corrupt(path, e))?;

    tracing::info!(
        path = %path.display(),
        rows = index.len(),
        dim = index.dim(),
        distance = %index.distance(),
        model = %header.model_id,
        "index loaded"
    );
    Ok(IndexArtifact { header, index })
}
