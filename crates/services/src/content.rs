//! Ingestion of lesson packs from the content backend.
//!
//! The backend serves lessons as JSON documents; this module turns them
//! into validated domain [`Lesson`] values. Parsing is strict: a document
//! with an unsupported question kind or a broken answer key is rejected
//! with the offending id rather than silently dropped.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use trainer_core::model::{
    Difficulty, Lesson, LessonError, LessonId, OfficeTool, ParseIdError, Question, QuestionError,
    QuestionId, Tutorial,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("lesson pack is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Id(#[from] ParseIdError),

    #[error("question {id} has unsupported kind {kind:?}")]
    UnsupportedKind { id: String, kind: String },

    #[error("question {id} is missing {field}")]
    MissingField { id: String, field: &'static str },

    #[error("question {id} is invalid: {source}")]
    Question {
        id: String,
        #[source]
        source: QuestionError,
    },

    #[error("lesson {id} is invalid: {source}")]
    Lesson {
        id: String,
        #[source]
        source: LessonError,
    },
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonDoc {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stage_title: Option<String>,
    tool: OfficeTool,
    questions: Vec<QuestionDoc>,
    performance_steps: Vec<QuestionDoc>,
    xp_reward: u32,
    tutorial_content: TutorialDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDoc {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    correct_order: Option<Vec<String>>,
    explanation: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TutorialDoc {
    title: String,
    points: Vec<String>,
    pro_tip: String,
    #[serde(default)]
    video_url: Option<Url>,
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// Parse one lesson document.
///
/// # Errors
///
/// Returns `ContentError` for malformed JSON, unsupported question kinds,
/// missing answer keys, or domain validation failures.
pub fn parse_lesson(json: &str) -> Result<Lesson, ContentError> {
    let doc: LessonDoc = serde_json::from_str(json)?;
    convert_lesson(doc)
}

/// Parse a pack of lesson documents (a JSON array).
///
/// # Errors
///
/// Returns the first `ContentError` encountered; a pack is all-or-nothing.
pub fn parse_lessons(json: &str) -> Result<Vec<Lesson>, ContentError> {
    let docs: Vec<LessonDoc> = serde_json::from_str(json)?;
    docs.into_iter().map(convert_lesson).collect()
}

fn convert_lesson(doc: LessonDoc) -> Result<Lesson, ContentError> {
    let id = LessonId::new(doc.id.as_str())?;

    let concept_pool = doc
        .questions
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>, _>>()?;
    let skill_pool = doc
        .performance_steps
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>, _>>()?;

    let mut tutorial = Tutorial::new(
        doc.tutorial_content.title,
        doc.tutorial_content.points,
        doc.tutorial_content.pro_tip,
    )
    .map_err(|source| ContentError::Lesson {
        id: doc.id.clone(),
        source,
    })?;
    if let Some(url) = doc.tutorial_content.video_url {
        tutorial = tutorial.with_video_url(url);
    }

    let mut lesson = Lesson::new(
        id,
        doc.title,
        doc.tool,
        concept_pool,
        skill_pool,
        tutorial,
        doc.xp_reward,
    )
    .map_err(|source| ContentError::Lesson {
        id: doc.id.clone(),
        source,
    })?;

    if let Some(description) = doc.description {
        lesson = lesson.with_description(description);
    }
    if let Some(stage_title) = doc.stage_title {
        lesson = lesson.with_stage_title(stage_title);
    }
    Ok(lesson)
}

fn convert_question(doc: QuestionDoc) -> Result<Question, ContentError> {
    let id = QuestionId::new(doc.id.as_str())?;

    let question = match doc.kind.as_str() {
        "MULTIPLE_CHOICE" => {
            let options = doc.options.ok_or(ContentError::MissingField {
                id: doc.id.clone(),
                field: "options",
            })?;
            let correct = doc.correct_answer.ok_or(ContentError::MissingField {
                id: doc.id.clone(),
                field: "correctAnswer",
            })?;
            Question::multiple_choice(id, doc.prompt, options, correct, doc.explanation)
        }
        "DRAG_DROP" => {
            let correct_order = doc.correct_order.ok_or(ContentError::MissingField {
                id: doc.id.clone(),
                field: "correctOrder",
            })?;
            Question::step_ordering(id, doc.prompt, correct_order, doc.explanation)
        }
        other => {
            return Err(ContentError::UnsupportedKind {
                id: doc.id,
                kind: other.to_string(),
            });
        }
    }
    .map_err(|source| ContentError::Question {
        id: doc.id,
        source,
    })?;

    let question = match doc.category {
        Some(category) => question.with_category(category),
        None => question,
    };
    Ok(match doc.difficulty {
        Some(difficulty) => question.with_difficulty(difficulty),
        None => question,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
