use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::LessonId;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("tutorial title cannot be empty")]
    EmptyTutorialTitle,

    #[error("tutorial pro tip cannot be empty")]
    EmptyProTip,
}

//
// ─── OFFICE TOOL ───────────────────────────────────────────────────────────────
//

/// The product a lesson teaches. Restores are rationed per tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfficeTool {
    Excel,
    Word,
    PowerPoint,
}

impl std::fmt::Display for OfficeTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OfficeTool::Excel => "Excel",
            OfficeTool::Word => "Word",
            OfficeTool::PowerPoint => "PowerPoint",
        };
        write!(f, "{label}")
    }
}

//
// ─── TUTORIAL ──────────────────────────────────────────────────────────────────
//

/// Remediation material shown at the theory checkpoint between phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tutorial {
    title: String,
    points: Vec<String>,
    pro_tip: String,
    video_url: Option<Url>,
}

impl Tutorial {
    /// Creates tutorial material.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the title or pro tip is empty.
    pub fn new(
        title: impl Into<String>,
        points: Vec<String>,
        pro_tip: impl Into<String>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTutorialTitle);
        }
        let pro_tip = pro_tip.into();
        if pro_tip.trim().is_empty() {
            return Err(LessonError::EmptyProTip);
        }
        Ok(Self {
            title,
            points,
            pro_tip,
            video_url: None,
        })
    }

    /// Attach an embeddable tutorial video.
    #[must_use]
    pub fn with_video_url(mut self, url: Url) -> Self {
        self.video_url = Some(url);
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn points(&self) -> &[String] {
        &self.points
    }

    #[must_use]
    pub fn pro_tip(&self) -> &str {
        &self.pro_tip
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// An immutable lesson bundle as supplied by the content provider.
///
/// Empty question pools are legal here — authoring happens incrementally —
/// and are rejected when a session tries to open the lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: Option<String>,
    stage_title: Option<String>,
    tool: OfficeTool,
    concept_pool: Vec<Question>,
    skill_pool: Vec<Question>,
    tutorial: Tutorial,
    xp_reward: u32,
}

impl Lesson {
    /// Creates a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is empty.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        tool: OfficeTool,
        concept_pool: Vec<Question>,
        skill_pool: Vec<Question>,
        tutorial: Tutorial,
        xp_reward: u32,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: None,
            stage_title: None,
            tool,
            concept_pool,
            skill_pool,
            tutorial,
            xp_reward,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_stage_title(mut self, stage_title: impl Into<String>) -> Self {
        self.stage_title = Some(stage_title.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn stage_title(&self) -> Option<&str> {
        self.stage_title.as_deref()
    }

    #[must_use]
    pub fn tool(&self) -> OfficeTool {
        self.tool
    }

    /// Conceptual multiple-choice pool driving the first phase.
    #[must_use]
    pub fn concept_pool(&self) -> &[Question] {
        &self.concept_pool
    }

    /// Performance-task pool driving the skills phase.
    #[must_use]
    pub fn skill_pool(&self) -> &[Question] {
        &self.skill_pool
    }

    #[must_use]
    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    /// Experience points granted on full completion. Never pro-rated.
    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
