#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::Router;

use dyscalculia_screening::screening::{
    AgeGroup, ClassifierConfig, InMemorySessionStore, RecordAnswerInput, RiskClassifier,
    ScreeningConfig, ScreeningEngine,
};
use dyscalculia_screening::state::AppState;

pub fn test_config() -> ScreeningConfig {
    ScreeningConfig {
        classifier: ClassifierConfig {
            model_path: None,
            ..ClassifierConfig::default()
        },
        ..ScreeningConfig::default()
    }
}

/// Bootstrapped once per test binary; every engine gets its own store.
pub fn shared_classifier() -> Arc<RiskClassifier> {
    static CLASSIFIER: OnceLock<Arc<RiskClassifier>> = OnceLock::new();
    Arc::clone(CLASSIFIER.get_or_init(|| {
        Arc::new(RiskClassifier::initialize(&test_config().classifier).unwrap())
    }))
}

pub fn create_test_engine() -> Arc<ScreeningEngine> {
    Arc::new(ScreeningEngine::new(
        test_config(),
        Arc::new(InMemorySessionStore::new()),
        shared_classifier(),
    ))
}

pub fn create_test_app() -> Router {
    dyscalculia_screening::create_app_with(AppState::new(create_test_engine(), None))
}

pub fn answer(correct: bool, latency_ms: i64) -> RecordAnswerInput {
    RecordAnswerInput {
        age_group: AgeGroup::SevenToEight,
        is_correct: correct,
        latency_ms,
        revisions: 0,
        idle_before_submit_ms: 0,
        time_to_first_interaction_ms: 0,
        selected_answer: "7".to_string(),
        question_id: None,
        skipped: false,
    }
}

pub fn answer_for(question_id: &str, correct: bool, latency_ms: i64) -> RecordAnswerInput {
    RecordAnswerInput {
        question_id: Some(question_id.to_string()),
        ..answer(correct, latency_ms)
    }
}
