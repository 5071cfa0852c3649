mod engine;
mod pool;
mod progress;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::{EngineEvent, Feedback, Intent, LessonSession, Submission};
pub use pool::{sample_pool, shuffle_steps};
pub use progress::PhaseProgress;
pub use view::{HeartsView, OptionView, QuestionBody, QuestionView, SessionView, TutorialView};
pub use workflow::{LessonLoopService, LessonRunner};
