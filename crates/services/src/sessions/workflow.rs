use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use trainer_core::Clock;
use trainer_core::model::{Lesson, OfficeTool, SessionSettings};

use crate::error::SessionError;
use crate::sink::ProgressSink;
use crate::timer::PhaseTimer;
use super::engine::{EngineEvent, Intent, LessonSession};
use super::view::SessionView;

/// Orchestrates session startup and the seams to the progress sink.
///
/// The engine itself performs no I/O; this service wires it to the sink
/// and hands out a [`LessonRunner`] that keeps the phase ticker in step.
#[derive(Clone)]
pub struct LessonLoopService {
    clock: Clock,
    settings: SessionSettings,
    sink: Arc<dyn ProgressSink>,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(clock: Clock, settings: SessionSettings, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            clock,
            settings,
            sink,
        }
    }

    /// Ask the sink whether a free restore is currently available.
    ///
    /// Availability is a display hint, never a gate the engine enforces; a
    /// sink error therefore reads as "not available".
    pub async fn is_restore_available(&self, tool: OfficeTool) -> bool {
        match self.sink.is_restore_available(tool).await {
            Ok(available) => available,
            Err(err) => {
                warn!(%tool, error = %err, "restore availability query failed");
                false
            }
        }
    }

    /// Open a lesson and begin the concept check.
    ///
    /// Must be called from within a tokio runtime: the runner owns the
    /// phase ticker task.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotEnoughContent` if either question pool of
    /// the lesson is empty.
    pub fn open_lesson(&self, lesson: Lesson) -> Result<LessonRunner, SessionError> {
        self.open_lesson_with_rng(lesson, StdRng::from_os_rng())
    }

    /// Open a lesson with deterministic sampling, for tests and replays.
    ///
    /// # Errors
    ///
    /// Same as [`LessonLoopService::open_lesson`].
    pub fn open_lesson_with_seed(
        &self,
        lesson: Lesson,
        seed: u64,
    ) -> Result<LessonRunner, SessionError> {
        self.open_lesson_with_rng(lesson, StdRng::seed_from_u64(seed))
    }

    fn open_lesson_with_rng(
        &self,
        lesson: Lesson,
        rng: StdRng,
    ) -> Result<LessonRunner, SessionError> {
        let session = LessonSession::open(lesson, self.settings.clone(), rng, self.clock.now())?;
        debug!(session = %session.id(), lesson = %session.lesson().id(), "lesson session opened");

        let shared = Arc::new(Mutex::new(session));
        let timer = Some(PhaseTimer::spawn(Arc::clone(&shared)));
        Ok(LessonRunner {
            shared,
            timer,
            sink: Arc::clone(&self.sink),
        })
    }
}

/// Drives one open session.
///
/// Applies intents, restarts or cancels the phase ticker when the phase
/// changes or the session ends, and forwards engine events to the sink
/// without awaiting them — a rejected notification is logged, never
/// surfaced. Dropping the runner tears the ticker down with it.
pub struct LessonRunner {
    shared: Arc<Mutex<LessonSession>>,
    timer: Option<PhaseTimer>,
    sink: Arc<dyn ProgressSink>,
}

impl LessonRunner {
    /// Apply one intent and return the refreshed view for rendering.
    pub async fn apply(&mut self, intent: Intent) -> SessionView {
        let (event, view, phase_changed, timed, ended) = {
            let mut session = self.shared.lock().await;
            let before = session.phase();
            let event = session.apply(intent);
            let after = session.phase();
            (
                event,
                SessionView::capture(&session),
                before != after,
                after.is_timed(),
                session.is_ended(),
            )
        };

        if ended || !timed {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
        } else if phase_changed {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
            self.timer = Some(PhaseTimer::spawn(Arc::clone(&self.shared)));
        }

        if let Some(event) = event {
            self.dispatch(event);
        }
        view
    }

    /// Snapshot the current state without applying anything.
    pub async fn view(&self) -> SessionView {
        SessionView::capture(&*self.shared.lock().await)
    }

    /// Whether the phase ticker is currently running.
    #[must_use]
    pub fn has_active_timer(&self) -> bool {
        self.timer.is_some()
    }

    fn dispatch(&self, event: EngineEvent) {
        match event {
            EngineEvent::RestoreConsumed { tool } => {
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    if let Err(err) = sink.restore_used(tool).await {
                        warn!(%tool, error = %err, "restore notification rejected");
                    }
                });
            }
            EngineEvent::LessonCompleted { lesson, xp } => {
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    if let Err(err) = sink.lesson_completed(&lesson, xp).await {
                        warn!(%lesson, xp, error = %err, "completion notification rejected");
                    }
                });
            }
            EngineEvent::SessionEnded => {
                debug!("lesson session ended without reward");
            }
        }
    }
}
