//! Task queue handle and its worker loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scoreboard_store::{DocumentStore, LeaderboardDocument, NewScore, ScoreEntry};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::QueueError;
use crate::executor;
use crate::types::{Operation, Outcome, QueueStats};

type Reply = oneshot::Sender<Result<Outcome, QueueError>>;

struct Task {
    id: Uuid,
    operation: Operation,
    reply: Reply,
}

enum Message {
    Task(Task),
    /// Everything queued before this runs; everything after is refused.
    Stop,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// The pending result of a submitted task.
#[derive(Debug)]
pub struct TaskTicket {
    id: Uuid,
    receiver: oneshot::Receiver<Result<Outcome, QueueError>>,
}

impl TaskTicket {
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the worker to resolve the task.
    pub async fn outcome(self) -> Result<Outcome, QueueError> {
        self.receiver.await.unwrap_or(Err(QueueError::WorkerGone))
    }
}

/// Handle to the single worker that owns the leaderboard store.
///
/// Cloning the handle is cheap; all clones feed the same FIFO.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<Message>,
    accepting: Arc<AtomicBool>,
    counters: Arc<Counters>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("accepting", &self.is_accepting())
            .field("stats", &self.stats())
            .finish()
    }
}

impl TaskQueue {
    /// Move `store` into a freshly spawned worker and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S>(store: S) -> Self
    where
        S: DocumentStore + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let worker = tokio::spawn(run_worker(store, receiver, Arc::clone(&counters)));

        Self {
            sender,
            accepting: Arc::new(AtomicBool::new(true)),
            counters,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Queue an operation without waiting for it to run.
    pub fn submit(&self, operation: Operation) -> Result<TaskTicket, QueueError> {
        if !self.accepting.load(Ordering::Acquire) {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(QueueError::ShuttingDown);
        }

        let id = Uuid::new_v4();
        let (reply, receiver) = oneshot::channel();

        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let task = Task {
            id,
            operation,
            reply,
        };
        if self.sender.send(Message::Task(task)).is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::Relaxed);
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(QueueError::ShuttingDown);
        }

        Ok(TaskTicket { id, receiver })
    }

    /// Queue an operation and wait for its result.
    pub async fn run(&self, operation: Operation) -> Result<Outcome, QueueError> {
        self.submit(operation)?.outcome().await
    }

    /// The stored document in insertion order.
    pub async fn leaderboard(&self) -> Result<LeaderboardDocument, QueueError> {
        match self.run(Operation::GetLeaderboard).await? {
            Outcome::Leaderboard(doc) => Ok(doc),
            other => Err(unexpected(other)),
        }
    }

    pub async fn user_exists(&self, employee_id: impl Into<String>) -> Result<bool, QueueError> {
        let operation = Operation::CheckUser {
            employee_id: employee_id.into(),
        };
        match self.run(operation).await? {
            Outcome::UserExists(exists) => Ok(exists),
            other => Err(unexpected(other)),
        }
    }

    /// Append a score; fails with `DuplicateUser` if the id already has one.
    pub async fn add_score(&self, score: NewScore) -> Result<ScoreEntry, QueueError> {
        match self.run(Operation::AddScore(score)).await? {
            Outcome::ScoreAdded(entry) => Ok(entry),
            other => Err(unexpected(other)),
        }
    }

    /// False once shutdown has begun.
    #[inline]
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }

    /// Stop accepting work, let already queued tasks finish, then stop the worker.
    ///
    /// Returns `DrainTimeout` if the worker has not finished within `grace`;
    /// the worker is left running in that case and a later call waits on it
    /// again. Concurrent callers all wait for the same drain. Once the worker
    /// has stopped, further calls return immediately.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), QueueError> {
        self.accepting.store(false, Ordering::Release);

        let drain = async {
            let mut worker = self.worker.lock().await;
            let Some(handle) = worker.as_mut() else {
                return None;
            };

            tracing::info!(pending = self.stats().pending(), "draining task queue");
            // A repeated marker is harmless: the worker stops on the first one.
            let _ = self.sender.send(Message::Stop);

            let joined = handle.await;
            *worker = None;
            Some(joined)
        };

        match tokio::time::timeout(grace, drain).await {
            Ok(None) => Ok(()),
            Ok(Some(Ok(()))) => {
                let stats = self.stats();
                tracing::info!(
                    completed = stats.completed,
                    failed = stats.failed,
                    rejected = stats.rejected,
                    "task queue drained"
                );
                Ok(())
            }
            Ok(Some(Err(e))) => {
                tracing::error!(error = %e, "task queue worker terminated abnormally");
                Err(QueueError::WorkerGone)
            }
            Err(_) => {
                tracing::warn!(grace_ms = grace.as_millis() as u64, "task queue drain timed out");
                Err(QueueError::DrainTimeout(grace))
            }
        }
    }
}

fn unexpected(outcome: Outcome) -> QueueError {
    QueueError::InvalidOperation(format!("unexpected outcome: {outcome:?}"))
}

async fn run_worker<S>(
    store: S,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    counters: Arc<Counters>,
) where
    S: DocumentStore,
{
    tracing::debug!("task queue worker started");

    while let Some(message) = receiver.recv().await {
        match message {
            Message::Task(task) => process(&store, task, &counters).await,
            Message::Stop => break,
        }
    }

    // Anything that slipped in behind the stop marker gets an explicit refusal.
    receiver.close();
    while let Ok(message) = receiver.try_recv() {
        if let Message::Task(task) = message {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            let _ = task.reply.send(Err(QueueError::ShuttingDown));
        }
    }

    tracing::debug!("task queue worker stopped");
}

async fn process<S>(store: &S, task: Task, counters: &Counters)
where
    S: DocumentStore,
{
    let Task {
        id,
        operation,
        reply,
    } = task;
    let tag = operation.tag();
    tracing::trace!(task_id = %id, operation = tag, "task started");

    let result = executor::execute(store, operation).await;

    match &result {
        Ok(_) => {
            counters.completed.fetch_add(1, Ordering::Relaxed);
        }
        Err(QueueError::DuplicateUser(employee_id)) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                task_id = %id,
                operation = tag,
                %employee_id,
                "duplicate submission refused"
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(task_id = %id, operation = tag, error = %e, "task failed");
        }
    }

    if reply.send(result).is_err() {
        tracing::debug!(
            task_id = %id,
            operation = tag,
            "caller went away before the task finished"
        );
    }
}
