use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question explanation cannot be empty")]
    EmptyExplanation,

    #[error("multiple-choice question needs at least two options, got {got}")]
    TooFewOptions { got: usize },

    #[error("option {0:?} appears more than once")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not among the options")]
    CorrectNotAnOption(String),

    #[error("ordering task needs at least two steps, got {got}")]
    TooFewSteps { got: usize },

    #[error("step {0:?} appears more than once")]
    DuplicateStep(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Authored difficulty tag. Display-only: never affects engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Intermediate,
    Difficult,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Difficult => "Difficult",
        };
        write!(f, "{label}")
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// What kind of answer a question expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick exactly one option; `correct` is one of `options`.
    MultipleChoice {
        options: Vec<String>,
        correct: String,
    },
    /// Arrange the step labels into `correct_order`.
    StepOrdering { correct_order: Vec<String> },
}

/// One immutable item of a lesson's question or task pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    kind: QuestionKind,
    explanation: String,
    category: Option<String>,
    difficulty: Option<Difficulty>,
}

impl Question {
    /// Creates a validated single-select multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or explanation is empty, fewer
    /// than two options are given, options repeat, or the correct answer is
    /// not among the options.
    pub fn multiple_choice(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = non_empty(prompt, QuestionError::EmptyPrompt)?;
        let explanation = non_empty(explanation, QuestionError::EmptyExplanation)?;
        let correct = correct.into();

        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { got: options.len() });
        }
        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        if !options.iter().any(|o| *o == correct) {
            return Err(QuestionError::CorrectNotAnOption(correct));
        }

        Ok(Self {
            id,
            prompt,
            kind: QuestionKind::MultipleChoice { options, correct },
            explanation,
            category: None,
            difficulty: None,
        })
    }

    /// Creates a validated step-ordering task; `correct_order` is canonical.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or explanation is empty, fewer
    /// than two steps are given, or step labels repeat.
    pub fn step_ordering(
        id: QuestionId,
        prompt: impl Into<String>,
        correct_order: Vec<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = non_empty(prompt, QuestionError::EmptyPrompt)?;
        let explanation = non_empty(explanation, QuestionError::EmptyExplanation)?;

        if correct_order.len() < 2 {
            return Err(QuestionError::TooFewSteps {
                got: correct_order.len(),
            });
        }
        let mut seen = HashSet::new();
        for step in &correct_order {
            if !seen.insert(step.as_str()) {
                return Err(QuestionError::DuplicateStep(step.clone()));
            }
        }

        Ok(Self {
            id,
            prompt,
            kind: QuestionKind::StepOrdering { correct_order },
            explanation,
            category: None,
            difficulty: None,
        })
    }

    /// Attach an authored ribbon/category tag.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach an authored difficulty tag.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn is_step_ordering(&self) -> bool {
        matches!(self.kind, QuestionKind::StepOrdering { .. })
    }
}

fn non_empty(value: impl Into<String>, err: QuestionError) -> Result<String, QuestionError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(err);
    }
    Ok(value)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
