use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreeningError};
use crate::screening::modeling::{PerformanceWindow, SignalHistory};
use crate::screening::types::{
    AgeGroup, DifficultyState, RawSignal, SessionSummary, TransitionEvent,
};

/// Live engine state of one screening session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub age_group: AgeGroup,
    pub difficulty: DifficultyState,
    pub window: PerformanceWindow,
    pub history: SignalHistory,
    pub transitions: Vec<TransitionEvent>,
    pub created_at: i64,
}

impl Session {
    pub fn new(session_id: impl Into<String>, age_group: AgeGroup, window_size: usize) -> Self {
        Self {
            session_id: session_id.into(),
            age_group,
            difficulty: DifficultyState::initial(),
            window: PerformanceWindow::new(window_size),
            history: SignalHistory::default(),
            transitions: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            session_id: self.session_id.clone(),
            age_group: self.age_group,
            signals: self.history.signals().to_vec(),
            difficulty_state: self.difficulty,
            transitions: self.transitions.clone(),
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            age_group: self.age_group,
            difficulty_state: self.difficulty,
            answers_recorded: self.history.len(),
            transitions: self.transitions.clone(),
            window: self.window.snapshot(),
            created_at: self.created_at,
        }
    }
}

/// Persisted layout of a session. Replaying `signals` reproduces every
/// engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub age_group: AgeGroup,
    pub signals: Vec<RawSignal>,
    pub difficulty_state: DifficultyState,
    pub transitions: Vec<TransitionEvent>,
    #[serde(default)]
    pub created_at: i64,
}

pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Inserts `session` unless the id exists; returns the stored session.
    fn create(&self, session: Session) -> Result<Session>;

    /// Replaces an existing session.
    fn update(&self, session: Session) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    fn create(&self, session: Session) -> Result<Session> {
        let mut sessions = self.sessions.write();
        let stored = sessions
            .entry(session.session_id.clone())
            .or_insert(session);
        Ok(stored.clone())
    }

    fn update(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&session.session_id) {
            Some(slot) => {
                *slot = session;
                Ok(())
            }
            None => Err(ScreeningError::not_found(session.session_id)),
        }
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
