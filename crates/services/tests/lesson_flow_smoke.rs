use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use services::{
    Clock, InMemoryProgressSink, Intent, LessonRunner, ProgressSink, SinkEvent, parse_lesson,
    session::{LessonLoopService, QuestionBody},
};
use trainer_core::model::{Phase, SessionSettings};
use trainer_core::time::fixed_now;

const LESSON_DOC: &str = r#"{
    "id": "w1",
    "title": "Home: Styling & Text",
    "tool": "Word",
    "xpReward": 50,
    "questions": [
        {"id": "w1q1", "type": "MULTIPLE_CHOICE", "prompt": "Shortcut for Bold?",
         "options": ["Ctrl+I", "Ctrl+B", "Ctrl+S"], "correctAnswer": "Ctrl+B",
         "explanation": "Ctrl+B toggles Bold."},
        {"id": "w1q2", "type": "MULTIPLE_CHOICE", "prompt": "Shortcut for Paste?",
         "options": ["Ctrl+C", "Ctrl+V", "Ctrl+X"], "correctAnswer": "Ctrl+V",
         "explanation": "Ctrl+V is Paste."}
    ],
    "performanceSteps": [
        {"id": "w1p1", "type": "DRAG_DROP", "prompt": "Apply Bold and Italics.",
         "correctOrder": ["Highlight the text", "Press Ctrl + B", "Press Ctrl + I"],
         "correctAnswer": "ordered", "explanation": "Select first, then format."}
    ],
    "tutorialContent": {
        "title": "Home Mastery",
        "points": ["Font = Looks", "Paragraph = Flow"],
        "proTip": "Alt + H jumps to the Home ribbon!"
    }
}"#;

fn answer_key() -> HashMap<&'static str, &'static str> {
    HashMap::from([("w1q1", "Ctrl+B"), ("w1q2", "Ctrl+V")])
}

fn ordering_key() -> HashMap<&'static str, Vec<String>> {
    HashMap::from([(
        "w1p1",
        vec![
            "Highlight the text".to_string(),
            "Press Ctrl + B".to_string(),
            "Press Ctrl + I".to_string(),
        ],
    )])
}

async fn answer_current_correctly(runner: &mut LessonRunner) {
    let view = runner.view().await;
    let question = view.question.expect("a question should be current");
    match question.body {
        QuestionBody::MultipleChoice { .. } => {
            let correct = answer_key()[question.id.as_str()];
            runner.apply(Intent::SelectOption(correct.to_string())).await;
        }
        QuestionBody::StepOrdering { .. } => {
            let correct = ordering_key()[question.id.as_str()].clone();
            runner.apply(Intent::ReorderSteps(correct)).await;
        }
    }
    let view = runner.apply(Intent::SubmitAnswer).await;
    let feedback = view.feedback.expect("feedback after submitting");
    assert!(feedback.correct, "fixture answer key should be right");
    runner.apply(Intent::ContinueToNext).await;
}

async fn wait_for(sink: &InMemoryProgressSink, predicate: impl Fn(&[SinkEvent]) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if predicate(&sink.events()) {
                return;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("sink notification should arrive");
}

#[tokio::test]
async fn flawless_lesson_completes_and_reports_the_reward() {
    let sink = Arc::new(InMemoryProgressSink::new());
    let loop_svc = LessonLoopService::new(
        Clock::fixed(fixed_now()),
        SessionSettings::default_course(),
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
    );

    let lesson = parse_lesson(LESSON_DOC).unwrap();
    let mut runner = loop_svc.open_lesson_with_seed(lesson, 17).unwrap();

    let view = runner.view().await;
    assert_eq!(view.phase, Phase::ConceptCheck);
    assert_eq!(view.hearts.remaining, 5);
    assert_eq!(view.timer_secs, Some(180));
    assert!(runner.has_active_timer());

    while runner.view().await.phase == Phase::ConceptCheck {
        answer_current_correctly(&mut runner).await;
    }

    let view = runner.view().await;
    assert_eq!(view.phase, Phase::TheoryReview);
    assert!(!runner.has_active_timer());

    // The checkpoint cannot be skipped without confirming the tutorial.
    let view = runner.apply(Intent::ContinueToNext).await;
    assert_eq!(view.phase, Phase::TheoryReview);
    runner.apply(Intent::ConfirmTutorialWatched).await;
    let view = runner.apply(Intent::ContinueToNext).await;
    assert_eq!(view.phase, Phase::SkillCheck);
    assert_eq!(view.hearts.remaining, 3);
    assert_eq!(view.timer_secs, Some(300));
    assert!(runner.has_active_timer());

    while runner.view().await.phase == Phase::SkillCheck {
        answer_current_correctly(&mut runner).await;
    }

    // Nothing was missed, so redemption is skipped entirely.
    let view = runner.view().await;
    assert_eq!(view.phase, Phase::Completed);
    assert!(!view.failure_reached);
    assert!(!runner.has_active_timer());

    let view = runner.apply(Intent::AcknowledgeCompletion).await;
    assert!(view.ended);

    wait_for(&sink, |events| {
        events.iter().any(|e| {
            matches!(e, SinkEvent::LessonCompleted { lesson, xp } if lesson.as_str() == "w1" && *xp == 50)
        })
    })
    .await;
    assert!(
        !sink
            .events()
            .iter()
            .any(|e| matches!(e, SinkEvent::RestoreUsed(_))),
        "a flawless run never consumes a restore"
    );
}

#[tokio::test]
async fn rejected_completion_notification_does_not_fail_the_session() {
    let sink = Arc::new(InMemoryProgressSink::new());
    sink.set_reject_notifications(true);
    let loop_svc = LessonLoopService::new(
        Clock::fixed(fixed_now()),
        SessionSettings::default_course(),
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
    );

    let lesson = parse_lesson(LESSON_DOC).unwrap();
    let mut runner = loop_svc.open_lesson_with_seed(lesson, 17).unwrap();

    while runner.view().await.phase == Phase::ConceptCheck {
        answer_current_correctly(&mut runner).await;
    }
    runner.apply(Intent::ConfirmTutorialWatched).await;
    runner.apply(Intent::ContinueToNext).await;
    while runner.view().await.phase == Phase::SkillCheck {
        answer_current_correctly(&mut runner).await;
    }

    let view = runner.apply(Intent::AcknowledgeCompletion).await;
    // The session completed from the learner's point of view; the failed
    // notification is the sink's problem.
    assert!(view.ended);
    assert_eq!(view.phase, Phase::Completed);
    assert!(sink.events().is_empty());
}
