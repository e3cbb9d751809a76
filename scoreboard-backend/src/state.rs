use scoreboard_queue::TaskQueue;

/// Shared application state passed to every route handler.
///
/// The queue is the only way handlers reach the leaderboard document.
#[derive(Debug, Clone)]
pub struct AppState {
    pub queue: TaskQueue,
}

impl AppState {
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }
}
