//! # skilldex
//!
//! Skill retrieval by semantic similarity. A query text is embedded, the
//! nearest rows of a reference corpus are found with an exact top-k search,
//! and the skills text of those rows is split into individual skill labels.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! skilldex build-index --corpus train.csv --output skills.idx
//! skilldex serve --corpus train.csv --index skills.idx --port 5000
//! curl -X POST localhost:5000/get_skills -H 'content-type: application/json' \
//!      -d '{"text": "Data scientist with Python"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use skilldex::prelude::*;
//! use std::sync::Arc;
//!
//! let encoder: Arc<dyn Encoder> = Arc::new(HashingEncoder::default());
//! let manager = ArtifactManager::new("train.csv", "skills.idx");
//! manager.build_index(encoder.as_ref(), &BuildOptions::default()).unwrap();
//!
//! let context = manager.open(encoder).unwrap();
//! let handler = QueryHandler::new(Arc::new(context), HandlerConfig::default()).unwrap();
//! let skills = handler.handle("Backend engineer, Rust and Postgres").unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - [`skilldex-core`](https://docs.rs/skilldex-core) - corpus, encoders, index, tokenizer, query handler
//! - [`skilldex-storage`](https://docs.rs/skilldex-storage) - CSV corpus, index blobs, alignment checks
//! - [`skilldex-api`](https://docs.rs/skilldex-api) - HTTP API

// Re-export core types
pub use skilldex_core::{
    split_skills, CorpusRow, CorpusStore, Distance, Encoder, Error, HandlerConfig,
    HashingEncoder, QueryHandler, Result, SearchHit, SimilarityIndex, SkillContext, Vector,
    DEFAULT_DIM,
};
#[cfg(feature = "fastembed")]
pub use skilldex_core::MiniLmEncoder;

// Re-export storage
pub use skilldex_storage::{
    ArtifactManager, BuildOptions, IndexArtifact, IndexHeader, Misalignment,
};

// Re-export API
pub use skilldex_api::{RestApi, ServerConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        split_skills, ArtifactManager, BuildOptions, CorpusStore, Distance, Encoder, Error,
        HandlerConfig, HashingEncoder, QueryHandler, Result, RestApi, ServerConfig,
        SimilarityIndex, SkillContext, Vector,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use skilldex_core::simd::{dot_product_simd, l2_squared_simd, norm_simd};
}
