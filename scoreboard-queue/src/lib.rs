//! Serialized task queue guarding the leaderboard store.
//!
//! Every read and write of the leaderboard document goes through a single
//! worker task that owns the store. Tasks run one at a time in submission
//! order, so no request ever observes a half-written document and no two
//! submissions can race to append.
//!
//! # Architecture
//!
//! - [`TaskQueue`] - cloneable handle used to submit work and shut down
//! - [`Operation`] - the storage operations a task can perform
//! - [`TaskTicket`] - the pending result of one submitted task
//! - [`QueueError`] - every way a task can fail
//!
//! # Example
//!
//! ```rust,no_run
//! use scoreboard_queue::{Operation, TaskQueue};
//! use scoreboard_store::{JsonFileStore, NewScore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = TaskQueue::start(JsonFileStore::new("leaderboard.json"));
//!
//!     queue
//!         .add_score(NewScore::new("E1001", 90u64, "01:42"))
//!         .await
//!         .unwrap();
//!     let exists = queue.user_exists("E1001").await.unwrap();
//!     assert!(exists);
//!
//!     // Submission itself never waits on the worker
//!     let ticket = queue.submit(Operation::GetLeaderboard).unwrap();
//!     let outcome = ticket.outcome().await.unwrap();
//!     println!("{outcome:?}");
//!
//!     queue
//!         .shutdown(std::time::Duration::from_secs(3))
//!         .await
//!         .unwrap();
//! }
//! ```

mod error;
mod executor;
mod queue;
mod types;

pub use error::QueueError;
pub use queue::{TaskQueue, TaskTicket};
pub use types::{operation_tags, Operation, Outcome, QueueStats};
