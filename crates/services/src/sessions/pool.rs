use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use trainer_core::model::Question;

/// Sample a fresh pool for one phase attempt.
///
/// Deduplicates by question id, randomly permutes, and keeps at most `k`
/// items. Callers re-sample on every phase (re-)entry so repeated lesson
/// attempts see varied subsets and order.
pub fn sample_pool<R: Rng + ?Sized>(rng: &mut R, source: &[Question], k: usize) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut pool: Vec<Question> = source
        .iter()
        .filter(|q| seen.insert(q.id().clone()))
        .cloned()
        .collect();
    pool.shuffle(rng);
    pool.truncate(k);
    pool
}

/// Arrange the candidate steps of an ordering task for presentation.
///
/// The arrangement is never the canonical order when there is more than
/// one step; a colliding shuffle is rotated by one position.
pub fn shuffle_steps<R: Rng + ?Sized>(rng: &mut R, canonical: &[String]) -> Vec<String> {
    let mut steps = canonical.to_vec();
    steps.shuffle(rng);
    if steps.len() > 1 && steps == canonical {
        steps.rotate_left(1);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use trainer_core::model::QuestionId;

    fn question(id: &str) -> Question {
        Question::multiple_choice(
            QuestionId::new(id).unwrap(),
            "Prompt",
            vec!["A".into(), "B".into()],
            "A",
            "Because.",
        )
        .unwrap()
    }

    fn bank(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&format!("q{i}"))).collect()
    }

    #[test]
    fn sample_caps_at_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = sample_pool(&mut rng, &bank(30), 15);
        assert_eq!(pool.len(), 15);
    }

    #[test]
    fn sample_returns_whole_source_when_small() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = sample_pool(&mut rng, &bank(4), 15);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn sample_never_duplicates() {
        let mut source = bank(10);
        source.push(question("q3"));
        source.push(question("q7"));

        let mut rng = StdRng::seed_from_u64(7);
        let pool = sample_pool(&mut rng, &source, 20);

        let ids: HashSet<_> = pool.iter().map(|q| q.id().clone()).collect();
        assert_eq!(ids.len(), pool.len());
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn sample_is_deterministic_for_a_seed() {
        let source = bank(20);
        let a = sample_pool(&mut StdRng::seed_from_u64(42), &source, 15);
        let b = sample_pool(&mut StdRng::seed_from_u64(42), &source, 15);
        assert_eq!(a, b);
    }

    #[test]
    fn sample_varies_across_seeds() {
        let source = bank(20);
        let a = sample_pool(&mut StdRng::seed_from_u64(1), &source, 15);
        let b = sample_pool(&mut StdRng::seed_from_u64(2), &source, 15);
        assert_ne!(a, b);
    }

    #[test]
    fn shuffled_steps_never_start_solved() {
        let canonical: Vec<String> = vec!["one".into(), "two".into(), "three".into()];
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let arranged = shuffle_steps(&mut rng, &canonical);
            assert_ne!(arranged, canonical, "seed {seed} presented the answer");

            let mut sorted = arranged.clone();
            sorted.sort();
            let mut expected = canonical.clone();
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn two_step_tasks_are_always_swapped() {
        let canonical: Vec<String> = vec!["first".into(), "second".into()];
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let arranged = shuffle_steps(&mut rng, &canonical);
            assert_eq!(arranged, vec!["second".to_string(), "first".to_string()]);
        }
    }
}
