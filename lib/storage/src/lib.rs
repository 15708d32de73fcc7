pub mod corpus_file;
pub mod index_file;
pub mod manager;

pub use corpus_file::{load_corpus, read_column, DEFAULT_SKILLS_COLUMN};
pub use index_file::{
    load_index, save_index, IndexArtifact, IndexHeader, INDEX_FORMAT_VERSION, INDEX_MAGIC,
};
pub use manager::{check_alignment, ArtifactManager, BuildOptions, Misalignment, DEFAULT_BUILD_BATCH};
