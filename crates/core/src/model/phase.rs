use serde::{Deserialize, Serialize};

/// Where a lesson session currently stands.
///
/// Transitions are forward-only; the single exception is Redemption, which
/// loops internally until every missed question has been corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// First gate: conceptual multiple-choice questions.
    ConceptCheck,
    /// Mandatory tutorial checkpoint between the two quiz phases.
    TheoryReview,
    /// Applied step-ordering tasks.
    SkillCheck,
    /// Interstitial before re-working missed questions.
    RedemptionIntro,
    /// Correct every question missed earlier to finish the lesson.
    Redemption,
    /// All phases passed; reward pending acknowledgement.
    Completed,
}

impl Phase {
    /// True for phases that run the one-second countdown.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            Phase::ConceptCheck | Phase::SkillCheck | Phase::Redemption
        )
    }

    /// True for phases that present a question to answer.
    #[must_use]
    pub fn is_question_phase(&self) -> bool {
        matches!(
            self,
            Phase::ConceptCheck | Phase::SkillCheck | Phase::Redemption
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::ConceptCheck => "concept check",
            Phase::TheoryReview => "theory review",
            Phase::SkillCheck => "skill check",
            Phase::RedemptionIntro => "redemption intro",
            Phase::Redemption => "redemption",
            Phase::Completed => "completed",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_quiz_phases_are_timed() {
        assert!(Phase::ConceptCheck.is_timed());
        assert!(Phase::SkillCheck.is_timed());
        assert!(Phase::Redemption.is_timed());
        assert!(!Phase::TheoryReview.is_timed());
        assert!(!Phase::RedemptionIntro.is_timed());
        assert!(!Phase::Completed.is_timed());
    }

    #[test]
    fn question_phases_match_timed_phases() {
        for phase in [
            Phase::ConceptCheck,
            Phase::TheoryReview,
            Phase::SkillCheck,
            Phase::RedemptionIntro,
            Phase::Redemption,
            Phase::Completed,
        ] {
            assert_eq!(phase.is_question_phase(), phase.is_timed());
        }
    }
}
