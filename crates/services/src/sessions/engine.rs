use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use std::fmt;

use trainer_core::model::{
    Lesson, LessonId, OfficeTool, Phase, Question, QuestionId, QuestionKind, SessionId,
    SessionSettings,
};

use crate::error::SessionError;
use super::pool::{sample_pool, shuffle_steps};
use super::progress::PhaseProgress;

//
// ─── INTENTS & EVENTS ──────────────────────────────────────────────────────────
//

/// Discrete inputs driving the session: learner actions plus the periodic
/// timer tick. Intents that do not apply in the current state are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectOption(String),
    ReorderSteps(Vec<String>),
    SubmitAnswer,
    ContinueToNext,
    ConfirmTutorialWatched,
    UseRestore,
    Quit,
    AcknowledgeCompletion,
    Tick,
}

/// Effects the caller must hand to collaborators. The engine itself never
/// performs I/O; it reports what happened and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RestoreConsumed { tool: OfficeTool },
    LessonCompleted { lesson: LessonId, xp: u32 },
    SessionEnded,
}

/// The learner's in-progress answer for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Choice(String),
    Ordering(Vec<String>),
}

/// Outcome of the last evaluated submission. The authored explanation is
/// carried for correct and incorrect answers alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub explanation: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One live run through a lesson.
///
/// Owns every piece of mutable session state and is driven exclusively by
/// [`Intent`]s. Created fresh each time a lesson is opened and discarded
/// when the session ends; nothing here survives the session.
pub struct LessonSession {
    id: SessionId,
    lesson: Lesson,
    settings: SessionSettings,
    rng: StdRng,
    opened_at: DateTime<Utc>,

    phase: Phase,
    active_pool: Vec<Question>,
    cursor: usize,
    lives: u32,
    missed: Vec<Question>,
    missed_ids: HashSet<QuestionId>,
    wrong_options: HashMap<QuestionId, HashSet<String>>,
    remaining_secs: u32,
    arrangement: Vec<String>,
    pending: Option<Submission>,
    feedback: Option<Feedback>,
    failure_reached: bool,
    tutorial_watched: bool,
    ended: bool,
}

impl LessonSession {
    /// Open a lesson and begin the concept check.
    ///
    /// Samples the concept pool, resets lives and the countdown, and clears
    /// the wrong-option memory. The generator is explicit so callers can
    /// seed it for deterministic sampling.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotEnoughContent` if either question pool is
    /// empty.
    pub fn open(
        lesson: Lesson,
        settings: SessionSettings,
        rng: StdRng,
        opened_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if lesson.concept_pool().is_empty() {
            return Err(SessionError::NotEnoughContent { pool: "concept" });
        }
        if lesson.skill_pool().is_empty() {
            return Err(SessionError::NotEnoughContent { pool: "skill" });
        }

        let mut session = Self {
            id: SessionId::generate(),
            lesson,
            settings,
            rng,
            opened_at,
            phase: Phase::ConceptCheck,
            active_pool: Vec::new(),
            cursor: 0,
            lives: 0,
            missed: Vec::new(),
            missed_ids: HashSet::new(),
            wrong_options: HashMap::new(),
            remaining_secs: 0,
            arrangement: Vec::new(),
            pending: None,
            feedback: None,
            failure_reached: false,
            tutorial_watched: false,
            ended: false,
        };
        session.enter_concept_check();
        Ok(session)
    }

    /// Convenience constructor for deterministic tests and replays.
    ///
    /// # Errors
    ///
    /// Same as [`LessonSession::open`].
    pub fn open_with_seed(
        lesson: Lesson,
        settings: SessionSettings,
        seed: u64,
        opened_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        Self::open(lesson, settings, StdRng::seed_from_u64(seed), opened_at)
    }

    //
    // ─── INTENT DISPATCH ───────────────────────────────────────────────────────
    //

    /// Apply one intent and report the effect, if any, for collaborators.
    pub fn apply(&mut self, intent: Intent) -> Option<EngineEvent> {
        match intent {
            Intent::SelectOption(option) => {
                self.select_option(&option);
                None
            }
            Intent::ReorderSteps(order) => {
                self.reorder_steps(order);
                None
            }
            Intent::SubmitAnswer => {
                self.submit_answer();
                None
            }
            Intent::ContinueToNext => {
                self.continue_to_next();
                None
            }
            Intent::ConfirmTutorialWatched => {
                self.confirm_tutorial_watched();
                None
            }
            Intent::UseRestore => self.use_restore().then(|| EngineEvent::RestoreConsumed {
                tool: self.lesson.tool(),
            }),
            Intent::Quit => self.quit().then_some(EngineEvent::SessionEnded),
            Intent::AcknowledgeCompletion => {
                self.acknowledge_completion()
                    .map(|xp| EngineEvent::LessonCompleted {
                        lesson: self.lesson.id().clone(),
                        xp,
                    })
            }
            Intent::Tick => {
                self.tick();
                None
            }
        }
    }

    //
    // ─── LEARNER INTENTS ───────────────────────────────────────────────────────
    //

    /// Record a pending single-choice answer.
    ///
    /// Ignored unless a multiple-choice question is current and open for
    /// answering, the option exists, and the option has not already been
    /// tried incorrectly.
    pub fn select_option(&mut self, option: &str) {
        if self.ended || self.failure_reached || self.feedback.is_some() {
            return;
        }
        let Some(question) = self.current_question() else {
            return;
        };
        let QuestionKind::MultipleChoice { options, .. } = question.kind() else {
            return;
        };
        if !options.iter().any(|o| o == option) {
            return;
        }
        if self.is_option_disabled(question.id(), option) {
            return;
        }
        self.pending = Some(Submission::Choice(option.to_string()));
    }

    /// Update the pending arrangement of an ordering task.
    ///
    /// Ignored unless an ordering question is current and open for
    /// answering, and `order` is a rearrangement of the presented steps.
    pub fn reorder_steps(&mut self, order: Vec<String>) {
        if self.ended || self.failure_reached || self.feedback.is_some() {
            return;
        }
        let Some(question) = self.current_question() else {
            return;
        };
        if !question.is_step_ordering() {
            return;
        }
        if !is_rearrangement(&order, &self.arrangement) {
            return;
        }
        self.arrangement.clone_from(&order);
        self.pending = Some(Submission::Ordering(order));
    }

    /// Evaluate the pending submission against the current question.
    ///
    /// On an incorrect answer this burns a life, remembers the question for
    /// redemption (outside redemption itself), and during the concept check
    /// also remembers the tried option so it cannot be re-selected. Reaching
    /// zero lives pauses the session until a restore or quit.
    pub fn submit_answer(&mut self) {
        if self.ended || self.failure_reached || self.feedback.is_some() {
            return;
        }
        let Some(question) = self.current_question().cloned() else {
            return;
        };
        let correct = match (question.kind(), self.pending.as_ref()) {
            (QuestionKind::MultipleChoice { correct, .. }, Some(Submission::Choice(choice))) => {
                choice == correct
            }
            (QuestionKind::StepOrdering { correct_order }, Some(Submission::Ordering(order))) => {
                order == correct_order
            }
            _ => return,
        };

        if !correct {
            self.lives = self.lives.saturating_sub(1);

            if self.phase != Phase::Redemption && !self.missed_ids.contains(question.id()) {
                self.missed_ids.insert(question.id().clone());
                self.missed.push(question.clone());
            }
            if self.phase == Phase::ConceptCheck {
                if let Some(Submission::Choice(choice)) = &self.pending {
                    self.wrong_options
                        .entry(question.id().clone())
                        .or_default()
                        .insert(choice.clone());
                }
            }
            if self.lives == 0 {
                self.failure_reached = true;
            }
        }

        self.feedback = Some(Feedback {
            correct,
            explanation: question.explanation().to_string(),
        });
    }

    /// Acknowledge displayed feedback and advance, or leave a checkpoint.
    ///
    /// In the theory review this is gated on the tutorial having been
    /// confirmed; in the redemption intro it starts redemption; in the quiz
    /// phases it requires feedback to be on display.
    pub fn continue_to_next(&mut self) {
        if self.ended || self.failure_reached {
            return;
        }
        match self.phase {
            Phase::TheoryReview => {
                if self.tutorial_watched {
                    self.enter_skill_check();
                }
            }
            Phase::RedemptionIntro => self.enter_redemption(),
            Phase::Completed => {}
            Phase::ConceptCheck | Phase::SkillCheck | Phase::Redemption => {
                self.advance_after_feedback();
            }
        }
    }

    /// Mark the tutorial media as interacted with, unlocking the continue
    /// action of the theory review.
    pub fn confirm_tutorial_watched(&mut self) {
        if self.ended || self.phase != Phase::TheoryReview {
            return;
        }
        self.tutorial_watched = true;
    }

    /// Refill lives after failure and resume the current phase in place.
    ///
    /// The caller is responsible for having confirmed a restore is actually
    /// available. The cursor and answered progress are untouched; a pending
    /// single-choice selection is discarded because it is known wrong.
    pub fn use_restore(&mut self) -> bool {
        if self.ended || !self.failure_reached {
            return false;
        }
        self.lives = self.settings.lives_for(self.phase);
        self.failure_reached = false;
        self.feedback = None;
        if matches!(self.pending, Some(Submission::Choice(_))) {
            self.pending = None;
        }
        true
    }

    /// End the session with no reward. Legal in any phase, idempotent.
    pub fn quit(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        true
    }

    /// Collect the reward after completing every phase.
    ///
    /// Returns the lesson's full experience-point value exactly once; the
    /// session is over afterwards.
    pub fn acknowledge_completion(&mut self) -> Option<u32> {
        if self.ended || self.phase != Phase::Completed {
            return None;
        }
        self.ended = true;
        Some(self.lesson.xp_reward())
    }

    /// One second of countdown. The clock pauses while feedback is on
    /// display and while the session sits in failure; zero is a floor.
    pub fn tick(&mut self) {
        if self.ended || self.failure_reached || self.feedback.is_some() {
            return;
        }
        if self.phase.is_timed() {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
    }

    //
    // ─── PHASE TRANSITIONS ─────────────────────────────────────────────────────
    //

    fn enter_concept_check(&mut self) {
        let k = usize::try_from(self.settings.pool_size()).unwrap_or(usize::MAX);
        self.active_pool = sample_pool(&mut self.rng, self.lesson.concept_pool(), k);
        self.cursor = 0;
        self.phase = Phase::ConceptCheck;
        self.lives = self.settings.lives_for(Phase::ConceptCheck);
        self.remaining_secs = self.settings.seconds_for(Phase::ConceptCheck);
        self.wrong_options.clear();
        self.prime_current();
    }

    fn enter_skill_check(&mut self) {
        let k = usize::try_from(self.settings.pool_size()).unwrap_or(usize::MAX);
        self.active_pool = sample_pool(&mut self.rng, self.lesson.skill_pool(), k);
        self.cursor = 0;
        self.phase = Phase::SkillCheck;
        self.lives = self.settings.lives_for(Phase::SkillCheck);
        self.remaining_secs = self.settings.seconds_for(Phase::SkillCheck);
        self.prime_current();
    }

    fn enter_redemption(&mut self) {
        self.cursor = 0;
        self.phase = Phase::Redemption;
        self.lives = self.settings.lives_for(Phase::Redemption);
        self.remaining_secs = self.settings.seconds_for(Phase::Redemption);
        self.prime_current();
    }

    fn advance_after_feedback(&mut self) {
        let Some(feedback) = self.feedback.take() else {
            return;
        };
        self.pending = None;

        if self.phase == Phase::Redemption {
            if feedback.correct {
                let corrected = self.missed.remove(self.cursor);
                self.missed_ids.remove(corrected.id());
                if self.missed.is_empty() {
                    self.arrangement.clear();
                    self.phase = Phase::Completed;
                    return;
                }
                // Restart the pass so the cursor never chases a shrinking list.
                self.cursor = 0;
            } else {
                self.cursor = (self.cursor + 1) % self.missed.len();
            }
            self.prime_current();
            return;
        }

        if self.cursor + 1 < self.active_pool.len() {
            self.cursor += 1;
            self.prime_current();
            return;
        }

        self.arrangement.clear();
        self.cursor = 0;
        match self.phase {
            Phase::ConceptCheck => {
                self.phase = Phase::TheoryReview;
                self.tutorial_watched = false;
            }
            Phase::SkillCheck => {
                self.phase = if self.missed.is_empty() {
                    Phase::Completed
                } else {
                    Phase::RedemptionIntro
                };
            }
            _ => {}
        }
    }

    /// Reset per-question state when a question becomes current. Ordering
    /// tasks present their steps in a fresh non-canonical arrangement, and
    /// that arrangement doubles as the ready-to-submit default answer.
    fn prime_current(&mut self) {
        self.pending = None;
        self.arrangement.clear();

        let canonical = match self.current_question().map(Question::kind) {
            Some(QuestionKind::StepOrdering { correct_order }) => Some(correct_order.clone()),
            _ => None,
        };
        if let Some(canonical) = canonical {
            let arranged = shuffle_steps(&mut self.rng, &canonical);
            self.arrangement.clone_from(&arranged);
            self.pending = Some(Submission::Ordering(arranged));
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// The failure budget of the current phase.
    #[must_use]
    pub fn max_lives(&self) -> u32 {
        self.settings.lives_for(self.phase)
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// The question the learner is looking at, if the phase presents one.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::ConceptCheck | Phase::SkillCheck => self.active_pool.get(self.cursor),
            Phase::Redemption => self.missed.get(self.cursor),
            _ => None,
        }
    }

    /// Presented step order for the current ordering task.
    #[must_use]
    pub fn arrangement(&self) -> &[String] {
        &self.arrangement
    }

    #[must_use]
    pub fn pending(&self) -> Option<&Submission> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn failure_reached(&self) -> bool {
        self.failure_reached
    }

    #[must_use]
    pub fn tutorial_watched(&self) -> bool {
        self.tutorial_watched
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Number of missed questions still waiting to be corrected.
    #[must_use]
    pub fn missed_remaining(&self) -> usize {
        self.missed.len()
    }

    /// True once `option` has been tried incorrectly for `question` during
    /// the concept check; such options stay unselectable for the session.
    #[must_use]
    pub fn is_option_disabled(&self, question: &QuestionId, option: &str) -> bool {
        self.wrong_options
            .get(question)
            .is_some_and(|tried| tried.contains(option))
    }

    /// Progress through the current phase.
    #[must_use]
    pub fn progress(&self) -> PhaseProgress {
        match self.phase {
            Phase::ConceptCheck | Phase::SkillCheck => PhaseProgress {
                total: self.active_pool.len(),
                position: self.cursor,
                remaining: self.active_pool.len().saturating_sub(self.cursor),
            },
            Phase::RedemptionIntro | Phase::Redemption => PhaseProgress {
                total: self.missed.len(),
                position: self.cursor,
                remaining: self.missed.len(),
            },
            Phase::TheoryReview | Phase::Completed => PhaseProgress::empty(),
        }
    }
}

impl fmt::Debug for LessonSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonSession")
            .field("id", &self.id)
            .field("lesson", &self.lesson.id())
            .field("phase", &self.phase)
            .field("cursor", &self.cursor)
            .field("lives", &self.lives)
            .field("missed", &self.missed.len())
            .field("remaining_secs", &self.remaining_secs)
            .field("failure_reached", &self.failure_reached)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

/// True when `candidate` contains exactly the same labels as `presented`.
fn is_rearrangement(candidate: &[String], presented: &[String]) -> bool {
    if candidate.len() != presented.len() {
        return false;
    }
    let mut a = candidate.to_vec();
    let mut b = presented.to_vec();
    a.sort();
    b.sort();
    a == b
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
