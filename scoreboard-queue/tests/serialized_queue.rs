use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scoreboard_queue::{Operation, Outcome, QueueError, TaskQueue};
use scoreboard_store::{
    async_trait, DocumentStore, JsonFileStore, LeaderboardDocument, NewScore, StoreError,
};
use tempfile::tempdir;

/// In-memory store that records how many task bodies overlap and in what
/// order documents were saved.
#[derive(Clone, Default)]
struct InstrumentedStore {
    doc: Arc<Mutex<LeaderboardDocument>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    delay: Duration,
}

impl InstrumentedStore {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn saved_ids(&self) -> Vec<String> {
        self.doc
            .lock()
            .unwrap()
            .scores
            .iter()
            .map(|s| s.employee_id.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for InstrumentedStore {
    async fn ensure_exists(&self) -> Result<(), StoreError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<LeaderboardDocument, StoreError> {
        tokio::time::sleep(self.delay).await;
        let doc = self.doc.lock().unwrap().clone();
        // Read-only tasks end here; writers release in save.
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(doc)
    }

    async fn save(&self, document: &LeaderboardDocument) -> Result<(), StoreError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        *self.doc.lock().unwrap() = document.clone();
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Wraps a file store and fails the next save when armed.
struct FlakyStore {
    inner: JsonFileStore,
    fail_next_save: Arc<AtomicBool>,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn ensure_exists(&self) -> Result<(), StoreError> {
        self.inner.ensure_exists().await
    }

    async fn load(&self) -> Result<LeaderboardDocument, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, document: &LeaderboardDocument) -> Result<(), StoreError> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: self.inner.path().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.save(document).await
    }
}

fn score(id: &str, pct: u64, time: &str) -> NewScore {
    NewScore::new(id, pct, time)
}

#[tokio::test]
async fn concurrent_distinct_adds_are_all_kept() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    let queue = TaskQueue::start(JsonFileStore::new(&path));

    let mut handles = Vec::new();
    for i in 0..40 {
        let q = queue.clone();
        handles.push(tokio::spawn(async move {
            q.add_score(score(&format!("E{i:03}"), 50 + i, "01:00")).await
        }));
    }
    for h in handles {
        h.await.expect("join").expect("add score");
    }

    let doc = queue.leaderboard().await.expect("leaderboard");
    assert_eq!(doc.scores.len(), 40);
    let mut ids: Vec<_> = doc.scores.iter().map(|s| s.employee_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 40);

    // The file agrees with what the queue reported.
    let on_disk: LeaderboardDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, doc);
}

#[tokio::test]
async fn duplicate_add_fails_and_leaves_file_untouched() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    let queue = TaskQueue::start(JsonFileStore::new(&path));

    queue.add_score(score("E1", 90, "00:45")).await.expect("first add");
    let before = std::fs::read(&path).unwrap();

    let err = queue
        .add_score(score("E1", 100, "00:10"))
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::DuplicateUser(ref id) if id == "E1"));

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn concurrent_duplicates_admit_exactly_one() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(2));
    let queue = TaskQueue::start(store.clone());

    let tickets: Vec<_> = (0..10)
        .map(|i| {
            queue
                .submit(Operation::AddScore(score("same", i, "00:30")))
                .expect("submit")
        })
        .collect();

    let mut added = 0;
    let mut duplicates = 0;
    for t in tickets {
        match t.outcome().await {
            Ok(Outcome::ScoreAdded(_)) => added += 1,
            Err(QueueError::DuplicateUser(_)) => duplicates += 1,
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert_eq!((added, duplicates), (1, 9));
    assert_eq!(store.saved_ids(), ["same"]);
}

#[tokio::test]
async fn task_bodies_never_overlap_and_run_in_submission_order() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(3));
    let queue = TaskQueue::start(store.clone());

    let mut tickets = Vec::new();
    for i in 0..20 {
        let op = if i % 3 == 0 {
            Operation::GetLeaderboard
        } else {
            Operation::AddScore(score(&format!("P{i:02}"), i, "00:20"))
        };
        tickets.push(queue.submit(op).expect("submit"));
    }
    for t in tickets {
        t.outcome().await.expect("task");
    }

    assert_eq!(store.max_active.load(Ordering::SeqCst), 1);
    let expected: Vec<String> = (0..20)
        .filter(|i| i % 3 != 0)
        .map(|i| format!("P{i:02}"))
        .collect();
    assert_eq!(store.saved_ids(), expected);
    assert_eq!(queue.stats().completed, 20);
    assert_eq!(queue.stats().pending(), 0);
}

#[tokio::test]
async fn check_user_on_fresh_store_then_after_add() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    let queue = TaskQueue::start(JsonFileStore::new(&path));

    assert!(!queue.user_exists("E42").await.unwrap());
    // First access created the document.
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n  \"scores\": []\n}"
    );

    queue.add_score(score("E42", 70, "02:10")).await.unwrap();
    assert!(queue.user_exists("E42").await.unwrap());
    assert!(!queue.user_exists("e42").await.unwrap());
}

#[tokio::test]
async fn get_leaderboard_keeps_insertion_order() {
    let dir = tempdir().expect("tempdir");
    let queue = TaskQueue::start(JsonFileStore::new(dir.path().join("lb.json")));

    queue.add_score(score("low", 10, "00:10")).await.unwrap();
    queue.add_score(score("high", 99, "00:10")).await.unwrap();

    let doc = queue.leaderboard().await.unwrap();
    let ids: Vec<_> = doc.scores.iter().map(|s| s.employee_id.as_str()).collect();
    assert_eq!(ids, ["low", "high"]);
    assert!(doc.scores.iter().all(|s| s.date.ends_with('Z')));
}

#[tokio::test]
async fn failed_save_does_not_stall_or_half_write() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    let fail_next_save = Arc::new(AtomicBool::new(false));
    let queue = TaskQueue::start(FlakyStore {
        inner: JsonFileStore::new(&path),
        fail_next_save: Arc::clone(&fail_next_save),
    });

    queue.add_score(score("ok-1", 50, "01:00")).await.unwrap();
    let before = std::fs::read(&path).unwrap();

    fail_next_save.store(true, Ordering::SeqCst);
    let failing = queue
        .submit(Operation::AddScore(score("lost", 60, "01:00")))
        .unwrap();
    let following = queue
        .submit(Operation::AddScore(score("ok-2", 70, "01:00")))
        .unwrap();

    assert!(matches!(
        failing.outcome().await,
        Err(QueueError::Storage(_))
    ));
    assert!(following.outcome().await.is_ok());

    let doc = queue.leaderboard().await.unwrap();
    let ids: Vec<_> = doc.scores.iter().map(|s| s.employee_id.as_str()).collect();
    assert_eq!(ids, ["ok-1", "ok-2"]);
    assert_ne!(std::fs::read(&path).unwrap(), before);
    assert_eq!(queue.stats().failed, 1);
}

#[tokio::test]
async fn corrupt_store_is_reported_and_queue_recovers() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    std::fs::write(&path, "{ not json").unwrap();
    let queue = TaskQueue::start(JsonFileStore::new(&path));

    assert!(matches!(
        queue.leaderboard().await,
        Err(QueueError::CorruptStore(_))
    ));
    assert!(matches!(
        queue.add_score(score("x", 1, "00:01")).await,
        Err(QueueError::CorruptStore(_))
    ));
    // Nothing was written over the broken file.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");

    std::fs::write(&path, r#"{"scores": []}"#).unwrap();
    assert!(!queue.user_exists("x").await.unwrap());
}

#[tokio::test]
async fn non_utf8_store_is_reported_as_corrupt() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaderboard.json");
    std::fs::write(&path, [0xff, 0xfe, 0x7b]).unwrap();
    let queue = TaskQueue::start(JsonFileStore::new(&path));

    assert!(matches!(
        queue.leaderboard().await,
        Err(QueueError::CorruptStore(_))
    ));
}

#[tokio::test]
async fn shutdown_drains_accepted_tasks_and_refuses_new_ones() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(5));
    let queue = TaskQueue::start(store.clone());

    let tickets: Vec<_> = (0..8)
        .map(|i| {
            queue
                .submit(Operation::AddScore(score(&format!("D{i}"), i, "00:09")))
                .unwrap()
        })
        .collect();

    queue
        .shutdown(Duration::from_secs(5))
        .await
        .expect("drain in time");

    for t in tickets {
        assert!(t.outcome().await.is_ok());
    }
    assert_eq!(store.saved_ids().len(), 8);

    assert!(!queue.is_accepting());
    assert!(matches!(
        queue.submit(Operation::GetLeaderboard),
        Err(QueueError::ShuttingDown)
    ));
    assert!(matches!(
        queue.user_exists("D1").await,
        Err(QueueError::ShuttingDown)
    ));
    assert_eq!(queue.stats().rejected, 2);

    // Second call is a no-op.
    queue.shutdown(Duration::from_millis(10)).await.unwrap();
}

#[tokio::test]
async fn shutdown_times_out_when_drain_is_too_slow() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(200));
    let queue = TaskQueue::start(store);

    let _tickets: Vec<_> = (0..5)
        .map(|_| queue.submit(Operation::GetLeaderboard).unwrap())
        .collect();

    let err = queue
        .shutdown(Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::DrainTimeout(_)));
}

#[tokio::test]
async fn concurrent_shutdown_waits_for_the_same_drain() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(20));
    let queue = TaskQueue::start(store.clone());

    for i in 0..5 {
        queue
            .submit(Operation::AddScore(score(&format!("S{i}"), i, "00:15")))
            .unwrap();
    }

    let first = {
        let q = queue.clone();
        tokio::spawn(async move { q.shutdown(Duration::from_secs(5)).await })
    };
    tokio::task::yield_now().await;

    queue
        .shutdown(Duration::from_secs(5))
        .await
        .expect("second shutdown");
    // Returning means the drain finished, whichever call started it.
    assert_eq!(store.saved_ids().len(), 5);
    first.await.expect("join").expect("first shutdown");
}

#[tokio::test]
async fn shutdown_can_be_retried_after_a_timeout() {
    let store = InstrumentedStore::with_delay(Duration::from_millis(100));
    let queue = TaskQueue::start(store.clone());

    for i in 0..2 {
        queue
            .submit(Operation::AddScore(score(&format!("R{i}"), i, "00:15")))
            .unwrap();
    }

    assert!(matches!(
        queue.shutdown(Duration::from_millis(10)).await,
        Err(QueueError::DrainTimeout(_))
    ));
    queue
        .shutdown(Duration::from_secs(5))
        .await
        .expect("retry drains");
    assert_eq!(store.saved_ids(), ["R0", "R1"]);
}

#[tokio::test]
async fn dropped_ticket_still_runs_to_completion() {
    let store = InstrumentedStore::default();
    let queue = TaskQueue::start(store.clone());

    drop(
        queue
            .submit(Operation::AddScore(score("orphan", 1, "00:01")))
            .unwrap(),
    );
    // FIFO: once this resolves, the orphaned task has run.
    queue.leaderboard().await.unwrap();

    assert_eq!(store.saved_ids(), ["orphan"]);
}
