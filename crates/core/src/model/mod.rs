mod ids;
mod lesson;
mod phase;
mod question;
mod settings;

pub use ids::{LessonId, ParseIdError, QuestionId, SessionId};
pub use lesson::{Lesson, LessonError, OfficeTool, Tutorial};
pub use phase::Phase;
pub use question::{Difficulty, Question, QuestionError, QuestionKind};
pub use settings::{SessionSettings, SettingsError};
