//! Leaderboard document model and the single-file JSON store behind it.
//!
//! The store is deliberately dumb: it reads and writes whole documents and
//! knows nothing about ordering of concurrent callers. Serializing access is
//! the job of the task queue that owns the store.
//!
//! # Architecture
//!
//! - [`LeaderboardDocument`] / [`ScoreEntry`] - the persisted shape
//! - [`DocumentStore`] - whole-document load/save seam
//! - [`JsonFileStore`] - the on-disk implementation
//! - [`rank`] - read-time ordering for display

mod document;
mod error;
mod ranking;
mod store;

pub use document::{LeaderboardDocument, NewScore, ScoreEntry};
pub use error::StoreError;
pub use ranking::{rank, time_taken_seconds};
pub use store::{DocumentStore, JsonFileStore};

// Re-export async_trait for implementors of DocumentStore
pub use async_trait::async_trait;
