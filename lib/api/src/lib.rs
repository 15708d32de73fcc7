//! # skilldex API
//!
//! HTTP surface for a loaded [`skilldex_core::QueryHandler`]:
//!
//! - `POST /get_skills` - free text in, skill tokens out
//! - `GET /health` - corpus size and encoder of the running instance

pub mod rest;

pub use rest::{RestApi, ServerConfig};
