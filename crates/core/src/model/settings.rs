use thiserror::Error;

use crate::model::phase::Phase;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("pool sample size must be > 0")]
    InvalidPoolSize,

    #[error("lives for {0} must be > 0")]
    InvalidLives(Phase),

    #[error("time budget for {0} must be > 0 seconds")]
    InvalidTimeBudget(Phase),
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunable parameters of a lesson session.
///
/// Controls how many questions a phase samples, the failure budget per
/// phase, and the per-phase countdown budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pool_size: u32,
    concept_lives: u32,
    skill_lives: u32,
    redemption_lives: u32,
    concept_secs: u32,
    skill_secs: u32,
    redemption_secs: u32,
}

impl SessionSettings {
    /// Creates the standard course settings.
    ///
    /// - 15 questions sampled per quiz phase
    /// - 5 lives for the concept check (the first, hardest-to-predict gate)
    /// - 3 lives for the skill check and redemption, where guessing is
    ///   penalized harder
    /// - 3 minutes for the concept check, 5 for the practical phases
    #[must_use]
    pub fn default_course() -> Self {
        Self {
            pool_size: 15,
            concept_lives: 5,
            skill_lives: 3,
            redemption_lives: 3,
            concept_secs: 180,
            skill_secs: 300,
            redemption_secs: 300,
        }
    }

    /// Creates custom session settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any size, life count, or time budget is zero.
    pub fn new(
        pool_size: u32,
        concept_lives: u32,
        skill_lives: u32,
        redemption_lives: u32,
        concept_secs: u32,
        skill_secs: u32,
        redemption_secs: u32,
    ) -> Result<Self, SettingsError> {
        if pool_size == 0 {
            return Err(SettingsError::InvalidPoolSize);
        }
        if concept_lives == 0 {
            return Err(SettingsError::InvalidLives(Phase::ConceptCheck));
        }
        if skill_lives == 0 {
            return Err(SettingsError::InvalidLives(Phase::SkillCheck));
        }
        if redemption_lives == 0 {
            return Err(SettingsError::InvalidLives(Phase::Redemption));
        }
        if concept_secs == 0 {
            return Err(SettingsError::InvalidTimeBudget(Phase::ConceptCheck));
        }
        if skill_secs == 0 {
            return Err(SettingsError::InvalidTimeBudget(Phase::SkillCheck));
        }
        if redemption_secs == 0 {
            return Err(SettingsError::InvalidTimeBudget(Phase::Redemption));
        }

        Ok(Self {
            pool_size,
            concept_lives,
            skill_lives,
            redemption_lives,
            concept_secs,
            skill_secs,
            redemption_secs,
        })
    }

    /// Maximum number of questions sampled for one quiz phase attempt.
    #[must_use]
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// The failure budget when entering `phase`; zero for phases without one.
    #[must_use]
    pub fn lives_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::ConceptCheck => self.concept_lives,
            Phase::SkillCheck => self.skill_lives,
            Phase::Redemption => self.redemption_lives,
            Phase::TheoryReview | Phase::RedemptionIntro | Phase::Completed => 0,
        }
    }

    /// The countdown budget in seconds when entering `phase`; zero for
    /// untimed phases.
    #[must_use]
    pub fn seconds_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::ConceptCheck => self.concept_secs,
            Phase::SkillCheck => self.skill_secs,
            Phase::Redemption => self.redemption_secs,
            Phase::TheoryReview | Phase::RedemptionIntro | Phase::Completed => 0,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::default_course()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
