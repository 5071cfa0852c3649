use trainer_core::model::{Difficulty, Phase, QuestionId, QuestionKind, SessionId};
use url::Url;

use super::engine::{Feedback, LessonSession, Submission};
use super::progress::PhaseProgress;

/// Remaining and maximum lives for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartsView {
    pub remaining: u32,
    pub maximum: u32,
}

/// One selectable option of a multiple-choice question.
///
/// `disabled` reflects the wrong-option memory only; locking the controls
/// while feedback is on display is the presentation layer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

/// Kind-specific portion of the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    MultipleChoice { options: Vec<OptionView> },
    StepOrdering { arrangement: Vec<String> },
}

/// The question currently presented, without its answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub body: QuestionBody,
}

/// Tutorial material shown during the theory review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialView {
    pub title: String,
    pub points: Vec<String>,
    pub pro_tip: String,
    pub video_url: Option<Url>,
    pub continue_unlocked: bool,
}

/// Snapshot of everything the presentation layer renders.
///
/// A pure read model: capturing it never mutates the session, and holding
/// an old snapshot has no effect on the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub session: SessionId,
    pub phase: Phase,
    pub hearts: HeartsView,
    /// Countdown for timed phases, `None` elsewhere.
    pub timer_secs: Option<u32>,
    pub progress: PhaseProgress,
    pub question: Option<QuestionView>,
    pub feedback: Option<Feedback>,
    pub tutorial: Option<TutorialView>,
    pub failure_reached: bool,
    pub ended: bool,
}

impl SessionView {
    /// Capture the current state of a session.
    #[must_use]
    pub fn capture(session: &LessonSession) -> Self {
        let question = session.current_question().map(|q| {
            let body = match q.kind() {
                QuestionKind::MultipleChoice { options, .. } => {
                    let selected = match session.pending() {
                        Some(Submission::Choice(choice)) => Some(choice.as_str()),
                        _ => None,
                    };
                    QuestionBody::MultipleChoice {
                        options: options
                            .iter()
                            .map(|label| OptionView {
                                label: label.clone(),
                                disabled: session.is_option_disabled(q.id(), label),
                                selected: selected == Some(label.as_str()),
                            })
                            .collect(),
                    }
                }
                QuestionKind::StepOrdering { .. } => QuestionBody::StepOrdering {
                    arrangement: session.arrangement().to_vec(),
                },
            };
            QuestionView {
                id: q.id().clone(),
                prompt: q.prompt().to_string(),
                category: q.category().map(str::to_string),
                difficulty: q.difficulty(),
                body,
            }
        });

        let tutorial = (session.phase() == Phase::TheoryReview).then(|| {
            let material = session.lesson().tutorial();
            TutorialView {
                title: material.title().to_string(),
                points: material.points().to_vec(),
                pro_tip: material.pro_tip().to_string(),
                video_url: material.video_url().cloned(),
                continue_unlocked: session.tutorial_watched(),
            }
        });

        Self {
            session: session.id(),
            phase: session.phase(),
            hearts: HeartsView {
                remaining: session.lives(),
                maximum: session.max_lives(),
            },
            timer_secs: session
                .phase()
                .is_timed()
                .then(|| session.remaining_secs()),
            progress: session.progress(),
            question,
            feedback: session.feedback().cloned(),
            tutorial,
            failure_reached: session.failure_reached(),
            ended: session.is_ended(),
        }
    }
}
