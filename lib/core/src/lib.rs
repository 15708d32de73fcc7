//! # skilldex Core
//!
//! Core library for the skilldex skill-retrieval service.
//!
//! - [`CorpusStore`] - row-ordered skills table
//! - [`Encoder`] - text to embedding, with [`HashingEncoder`] always available
//! - [`SimilarityIndex`] - exact top-k nearest-neighbor search
//! - [`split_skills`] - heuristic skills-blob tokenizer
//! - [`QueryHandler`] - encode, search, look up and tokenize in one call
//!
//! ## Example
//!
//! ```rust
//! use skilldex_core::{
//!     CorpusStore, Encoder, HandlerConfig, HashingEncoder, QueryHandler, SimilarityIndex,
//!     SkillContext,
//! };
//! use std::sync::Arc;
//!
//! let rows = ["Python, SQL, Machine learning", "JavaScript, React"];
//! let encoder = HashingEncoder::default();
//! let index = SimilarityIndex::build(encoder.encode(&rows).unwrap()).unwrap();
//!
//! let context = SkillContext::new(CorpusStore::from_texts(rows), index, Arc::new(encoder)).unwrap();
//! let handler = QueryHandler::new(Arc::new(context), HandlerConfig::default()).unwrap();
//!
//! let skills = handler.handle("Python, SQL, Machine learning").unwrap();
//! assert_eq!(skills, vec!["Python", "SQL", "Machine learning"]);
//! ```

pub mod corpus;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod index;
pub mod tokenizer;
pub mod vector;

/// Distance kernels used by the index:
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - unrolled scalar fallback
pub mod simd;

pub use corpus::{CorpusRow, CorpusStore};
#[cfg(feature = "fastembed")]
pub use encoder::MiniLmEncoder;
pub use encoder::{Encoder, HashingEncoder, DEFAULT_DIM};
pub use error::{Error, Result};
pub use handler::{HandlerConfig, QueryHandler, SkillContext};
pub use index::{Distance, SearchHit, SimilarityIndex};
pub use tokenizer::split_skills;
pub use vector::Vector;
