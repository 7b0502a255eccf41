//! Pinecone integration for vecstage.
//!
//! This crate provides:
//! - `PineconeControl`, the control plane client (`/indexes`) that creates
//!   serverless indexes and waits for them to become ready,
//! - `PineconeIndex`, the data plane handle for one index host
//!   (`/vectors/upsert`, `/vectors/list`, `/describe_index_stats`).
//!
//! Both implement the `vecstage-core` traits (`IndexControl`, `VectorIndex`).
//!
//! Environment variables read by the `*_from_env` builder helpers:
//! - `PINECONE_API_KEY`
//! - `PINECONE_CONTROLLER_URL` (optional)
//! - `PINECONE_NAMESPACE` (optional)

pub mod client;
mod config;
mod control;
mod error;
mod index;
pub mod mapper;
pub mod types;

pub use config::{PineconeControlBuilder, DEFAULT_CONTROLLER_URL};
pub use control::PineconeControl;
pub use error::PineconeError;
pub use index::PineconeIndex;
