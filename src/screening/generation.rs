//! Contract with the external question generator.
//!
//! The engine only describes what to generate. It never calls the generator
//! and cannot verify that returned content respects the parameters.

use serde::{Deserialize, Serialize};

use crate::screening::config::DifficultyParams;
use crate::screening::store::Session;
use crate::screening::types::{AgeGroup, DifficultyState, TestType};

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub test_type: TestType,
    pub age_group: AgeGroup,
    pub count: u32,
    pub difficulty: DifficultyParams,
}

impl GenerationRequest {
    pub fn for_session(session: &Session, test_type: TestType, count: Option<u32>) -> Self {
        Self {
            test_type,
            age_group: session.age_group,
            count: clamp_count(count),
            difficulty: DifficultyParams::lookup(session.age_group, session.difficulty),
        }
    }
}

/// Current difficulty of a session as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyView {
    pub session_id: String,
    pub state: DifficultyState,
    pub level: u8,
    #[serde(flatten)]
    pub params: DifficultyParams,
    pub answers_recorded: usize,
    pub window_accuracy: f64,
}

impl DifficultyView {
    pub fn for_session(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            state: session.difficulty,
            level: session.difficulty.ordinal(),
            params: DifficultyParams::lookup(session.age_group, session.difficulty),
            answers_recorded: session.history.len(),
            window_accuracy: session.window.accuracy(),
        }
    }
}

fn clamp_count(count: Option<u32>) -> u32 {
    count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}
