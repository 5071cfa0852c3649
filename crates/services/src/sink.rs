//! Seam to the stats backend that records rewards and restore usage.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use trainer_core::model::{LessonId, OfficeTool};

/// Errors a progress sink may report.
///
/// The session workflow logs these and moves on; a rejected notification
/// never rolls back user-visible session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SinkError {
    #[error("progress sink rejected the update: {0}")]
    Rejected(String),

    #[error("progress sink is unreachable: {0}")]
    Unreachable(String),
}

/// Receives completion rewards and restore usage, and answers the one
/// query the engine makes: is a free restore currently available?
///
/// Restore rationing (one free use per calendar day per tool) is the
/// implementer's concern; the engine never re-checks after asking.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn is_restore_available(&self, tool: OfficeTool) -> Result<bool, SinkError>;

    async fn restore_used(&self, tool: OfficeTool) -> Result<(), SinkError>;

    async fn lesson_completed(&self, lesson: &LessonId, xp: u32) -> Result<(), SinkError>;
}

//
// ─── IN-MEMORY SINK ────────────────────────────────────────────────────────────
//

/// A notification recorded by [`InMemoryProgressSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    RestoreUsed(OfficeTool),
    LessonCompleted { lesson: LessonId, xp: u32 },
}

/// Records notifications in memory. Used by tests and local tooling.
///
/// Starts with the daily restore available and delivery succeeding.
#[derive(Debug)]
pub struct InMemoryProgressSink {
    restore_available: AtomicBool,
    reject_notifications: AtomicBool,
    events: Mutex<Vec<SinkEvent>>,
}

impl InMemoryProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            restore_available: AtomicBool::new(true),
            reject_notifications: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Set whether the daily restore reads as available.
    pub fn set_restore_available(&self, available: bool) {
        self.restore_available.store(available, Ordering::SeqCst);
    }

    /// Make every notification fail, to exercise best-effort delivery.
    pub fn set_reject_notifications(&self, reject: bool) {
        self.reject_notifications.store(reject, Ordering::SeqCst);
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: SinkEvent) -> Result<(), SinkError> {
        if self.reject_notifications.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected("sink configured to reject".into()));
        }
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

impl Default for InMemoryProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressSink for InMemoryProgressSink {
    async fn is_restore_available(&self, _tool: OfficeTool) -> Result<bool, SinkError> {
        if self.reject_notifications.load(Ordering::SeqCst) {
            return Err(SinkError::Unreachable("sink configured to reject".into()));
        }
        Ok(self.restore_available.load(Ordering::SeqCst))
    }

    async fn restore_used(&self, tool: OfficeTool) -> Result<(), SinkError> {
        self.record(SinkEvent::RestoreUsed(tool))
    }

    async fn lesson_completed(&self, lesson: &LessonId, xp: u32) -> Result<(), SinkError> {
        self.record(SinkEvent::LessonCompleted {
            lesson: lesson.clone(),
            xp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_id() -> LessonId {
        LessonId::new("w1").unwrap()
    }

    #[tokio::test]
    async fn records_notifications_in_order() {
        let sink = InMemoryProgressSink::new();
        sink.restore_used(OfficeTool::Word).await.unwrap();
        sink.lesson_completed(&lesson_id(), 50).await.unwrap();

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::RestoreUsed(OfficeTool::Word),
                SinkEvent::LessonCompleted {
                    lesson: lesson_id(),
                    xp: 50
                },
            ]
        );
    }

    #[tokio::test]
    async fn availability_is_configurable() {
        let sink = InMemoryProgressSink::new();
        assert!(sink.is_restore_available(OfficeTool::Excel).await.unwrap());

        sink.set_restore_available(false);
        assert!(!sink.is_restore_available(OfficeTool::Excel).await.unwrap());
    }

    #[tokio::test]
    async fn rejection_mode_fails_without_recording() {
        let sink = InMemoryProgressSink::new();
        sink.set_reject_notifications(true);

        assert!(sink.restore_used(OfficeTool::Excel).await.is_err());
        assert!(sink.lesson_completed(&lesson_id(), 50).await.is_err());
        assert!(sink.events().is_empty());
    }
}
