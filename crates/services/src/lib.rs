#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod sessions;
pub mod sink;
pub mod timer;

pub use trainer_core::Clock;
pub use sessions as session;

pub use content::{ContentError, parse_lesson, parse_lessons};
pub use error::SessionError;
pub use sink::{InMemoryProgressSink, ProgressSink, SinkError, SinkEvent};
pub use timer::PhaseTimer;

pub use sessions::{
    EngineEvent, Feedback, Intent, LessonLoopService, LessonRunner, LessonSession, PhaseProgress,
    SessionView,
};
