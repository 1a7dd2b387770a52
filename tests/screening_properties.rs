//! Property-based tests for the screening core.
//!
//! - Derived scores stay within [0, 1] for extreme inputs
//! - Sustained low accuracy never raises difficulty
//! - A confident correct streak raises difficulty by exactly one level
//! - Feature extraction of an empty history is all zero
//! - Extreme answer values are rejected or produce finite session views

use proptest::prelude::*;

use dyscalculia_screening::error::ScreeningError;
use dyscalculia_screening::screening::{
    AgeGroup, BehavioralSignalRecorder, DifficultyState, DifficultyStateMachine,
    FeatureAggregator, FeatureVector, Outcome, PerformanceWindow, RawSignal, SignalHistory,
    MAX_DURATION_MS, MAX_REVISIONS,
};

mod common;

fn arb_age_group() -> impl Strategy<Value = AgeGroup> {
    prop_oneof![
        Just(AgeGroup::FiveToSix),
        Just(AgeGroup::SevenToEight),
        Just(AgeGroup::NineToTen),
    ]
}

fn arb_state() -> impl Strategy<Value = DifficultyState> {
    prop_oneof![
        Just(DifficultyState::Easy),
        Just(DifficultyState::Medium),
        Just(DifficultyState::Hard),
    ]
}

fn arb_signal() -> impl Strategy<Value = RawSignal> {
    (
        prop_oneof![Just(0i64), 0i64..=30_000, Just(i64::MAX)],     // latency
        prop_oneof![Just(0i32), 0i32..=20, Just(i32::MAX)],         // revisions
        prop_oneof![Just(0i64), 0i64..=60_000, Just(i64::MAX)],     // idle
        prop_oneof![Just(0i64), 0i64..=60_000, Just(i64::MAX)],     // first interaction
        any::<bool>(),
    )
        .prop_map(|(latency_ms, revisions, idle, first, is_correct)| RawSignal {
            question_id: "q".to_string(),
            latency_ms,
            revisions,
            idle_before_submit_ms: idle,
            time_to_first_interaction_ms: first,
            is_correct,
            skipped: false,
            selected_answer: "1".to_string(),
            created_at: 0,
        })
}

fn arb_extreme_duration() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        Just(MAX_DURATION_MS),
        Just(MAX_DURATION_MS + 1),
        Just(i64::MAX),
        0i64..=MAX_DURATION_MS,
    ]
}

fn arb_extreme_revisions() -> impl Strategy<Value = i32> {
    prop_oneof![
        Just(0i32),
        Just(MAX_REVISIONS),
        Just(i32::MAX),
        0i32..=MAX_REVISIONS,
    ]
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

proptest! {
    #[test]
    fn prop_derived_scores_are_bounded(
        signals in prop::collection::vec(arb_signal(), 1..12),
        age in arb_age_group(),
    ) {
        let recorder = BehavioralSignalRecorder::default();
        let mut history = SignalHistory::default();
        for signal in signals {
            let d = recorder.record(&mut history, signal, age);
            prop_assert!(in_unit(d.hesitation), "hesitation {}", d.hesitation);
            prop_assert!(in_unit(d.confidence), "confidence {}", d.confidence);
            prop_assert!(in_unit(d.decision_stability), "stability {}", d.decision_stability);
            prop_assert!(in_unit(d.cognitive_load), "load {}", d.cognitive_load);
            prop_assert!(d.speed_accuracy_imbalance.is_finite());
        }
    }

    #[test]
    fn prop_low_accuracy_never_raises(
        answers in prop::collection::vec((prop::bool::weighted(0.2), 0i64..20_000, 0i32..5, 0i64..10_000), 2..20),
    ) {
        let engine = common::create_test_engine();
        let mut previous = DifficultyState::Medium;
        for (correct, latency, revisions, first) in answers {
            let mut input = common::answer(correct, latency);
            input.revisions = revisions;
            input.time_to_first_interaction_ms = first;
            let outcome = engine.record_answer("p", input).unwrap();

            let window = engine.session_summary("p").unwrap().window;
            if window.size >= 2 && window.accuracy <= 0.4 {
                prop_assert!(outcome.difficulty_state <= previous);
            }
            previous = outcome.difficulty_state;
        }
    }

    #[test]
    fn prop_confident_streak_raises_one_level(
        start in arb_state(),
        latencies in prop::array::uniform3(0i64..30_000),
        mut hesitations in prop::array::uniform3(0i64..20_000),
    ) {
        hesitations.sort_unstable_by(|a, b| b.cmp(a));
        let mut window = PerformanceWindow::new(3);
        for (latency_ms, hesitation_ms) in latencies.into_iter().zip(hesitations) {
            window.add(Outcome { correct: true, latency_ms, revisions: 0, hesitation_ms });
        }

        let machine = DifficultyStateMachine::default();
        match machine.step(start, &window, 2, 0) {
            Some(event) => {
                prop_assert_eq!(event.from, start);
                prop_assert_eq!(Some(event.to), start.raised());
            }
            None => prop_assert_eq!(start, DifficultyState::Hard),
        }
    }

    #[test]
    fn prop_extreme_answers_keep_session_views_finite(
        answers in prop::collection::vec(
            (any::<bool>(), arb_extreme_duration(), arb_extreme_revisions(), arb_extreme_duration()),
            1..8,
        ),
    ) {
        let engine = common::create_test_engine();
        let mut accepted = 0usize;
        for (correct, latency, revisions, first) in answers {
            let mut input = common::answer(correct, latency);
            input.revisions = revisions;
            input.time_to_first_interaction_ms = first;
            let in_range = latency <= MAX_DURATION_MS
                && revisions <= MAX_REVISIONS
                && first <= MAX_DURATION_MS;

            match engine.record_answer("x", input) {
                Ok(outcome) => {
                    prop_assert!(in_range);
                    accepted += 1;
                    prop_assert!(in_unit(outcome.derived_features.hesitation));
                    prop_assert!(in_unit(outcome.derived_features.confidence));
                }
                Err(ScreeningError::Validation(_)) => prop_assert!(!in_range),
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
        }

        if accepted > 0 {
            let summary = engine.session_summary("x").unwrap();
            prop_assert_eq!(summary.answers_recorded, accepted);
            prop_assert!(summary.window.avg_latency_ms.is_finite());

            let features = engine.get_feature_vector("x").unwrap();
            prop_assert!(features.avg_latency_ms.is_finite());
            prop_assert!(features.latency_variance.is_finite());
            prop_assert!(in_unit(features.hesitation_index));
            prop_assert!(in_unit(features.confidence_index));

            let analysis = engine.behavioral_analysis("x").unwrap();
            prop_assert!(analysis.avg_latency_ms.is_finite());
            prop_assert!(in_unit(engine.finalize("x").unwrap().confidence));
        }
    }

    #[test]
    fn prop_extract_is_pure(
        signals in prop::collection::vec(arb_signal(), 0..10),
        age in arb_age_group(),
    ) {
        let a = FeatureAggregator::extract(&signals, age);
        let b = FeatureAggregator::extract(&signals, age);
        prop_assert_eq!(a, b);
        prop_assert!(a.accuracy_percent >= 0.0 && a.accuracy_percent <= 100.0);
        if !signals.is_empty() {
            prop_assert!((a.accuracy_percent + a.error_rate_percent - 100.0).abs() < 0.002);
        }
    }
}

#[test]
fn test_empty_extraction_is_zero_for_every_age() {
    for age in AgeGroup::ALL {
        let v = FeatureAggregator::extract(&[], age);
        assert_eq!(v, FeatureVector::default());
        assert!(v.classifier_inputs().iter().all(|x| *x == 0.0));
        assert_eq!(v.skipped_count + v.total_revisions + v.rapid_count + v.slow_count, 0);
        assert_eq!(v.hesitation_index, 0.0);
        assert_eq!(v.confidence_index, 0.0);
    }
}
