//! The one-second phase ticker.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::sessions::LessonSession;

/// A cancellable ticking task that drives a session's countdown.
///
/// The task takes the same lock the intent path takes, so every tick is
/// one atomic mutation and can never interleave with a learner action.
/// Starting a phase spawns a fresh timer; leaving a timed phase or ending
/// the session must cancel it — a session that has been torn down is
/// otherwise still reachable through the shared handle. Dropping the
/// timer aborts the task.
#[derive(Debug)]
pub struct PhaseTimer {
    handle: JoinHandle<()>,
}

impl PhaseTimer {
    /// Spawn the ticker against a shared session.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(session: Arc<Mutex<LessonSession>>) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                session.lock().await.tick();
            }
        });
        Self { handle }
    }

    /// Stop the ticker. Idempotent; a cancelled timer never ticks again.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
