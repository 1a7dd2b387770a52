use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, ScreeningError};
use crate::screening::config::ScreeningConfig;
use crate::screening::decision::DifficultyStateMachine;
use crate::screening::features::FeatureAggregator;
use crate::screening::generation::{DifficultyView, GenerationRequest};
use crate::screening::modeling::BehavioralSignalRecorder;
use crate::screening::risk::RiskClassifier;
use crate::screening::store::{Session, SessionRecord, SessionStore};
use crate::screening::types::*;

pub struct ScreeningEngine {
    config: ScreeningConfig,
    store: Arc<dyn SessionStore>,
    recorder: BehavioralSignalRecorder,
    machine: DifficultyStateMachine,
    classifier: Arc<RiskClassifier>,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScreeningEngine {
    pub fn new(
        config: ScreeningConfig,
        store: Arc<dyn SessionStore>,
        classifier: Arc<RiskClassifier>,
    ) -> Self {
        let recorder = BehavioralSignalRecorder::new(config.stability_window, config.trend_window);
        let machine = DifficultyStateMachine::new(config.transitions.clone());
        Self {
            config,
            store,
            recorder,
            machine,
            classifier,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<RiskClassifier> {
        &self.classifier
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Creates the session or returns the existing one unchanged.
    pub fn start_session(&self, session_id: &str, age_group: AgeGroup) -> Result<SessionSummary> {
        check_session_id(session_id)?;
        let lock = self.session_lock(session_id);
        let _guard = lock.lock();

        if let Some(existing) = self.store.get(session_id)? {
            return Ok(existing.summary());
        }
        let session = self.store.create(Session::new(
            session_id,
            age_group,
            self.config.window_size,
        ))?;
        tracing::info!(
            session_id = %session_id,
            age_group = age_group.as_str(),
            difficulty = session.difficulty.as_str(),
            "Screening session started"
        );
        Ok(session.summary())
    }

    pub fn record_answer(&self, session_id: &str, input: RecordAnswerInput) -> Result<RecordOutcome> {
        check_session_id(session_id)?;
        input.validate()?;

        let lock = self.session_lock(session_id);
        let _guard = lock.lock();

        let mut session = match self.store.get(session_id)? {
            Some(session) => session,
            None => {
                tracing::info!(
                    session_id = %session_id,
                    age_group = input.age_group.as_str(),
                    "Screening session created on first answer"
                );
                self.store.create(Session::new(
                    session_id,
                    input.age_group,
                    self.config.window_size,
                ))?
            }
        };

        if let Some(question_id) = input.question_id.as_deref() {
            if let Some(outcome) = retried_outcome(&session, question_id)? {
                tracing::debug!(session_id = %session_id, question_id, "Retried answer ignored");
                return Ok(outcome);
            }
        }

        let skipped = input.is_skipped();
        let signal = RawSignal {
            question_id: input
                .question_id
                .unwrap_or_else(|| next_question_id(&session)),
            latency_ms: input.latency_ms,
            revisions: input.revisions,
            idle_before_submit_ms: input.idle_before_submit_ms,
            time_to_first_interaction_ms: input.time_to_first_interaction_ms,
            is_correct: input.is_correct && !skipped,
            skipped,
            selected_answer: input.selected_answer,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let (derived_features, event) = self.apply_signal(&mut session, signal);
        let outcome = RecordOutcome {
            difficulty_state: session.difficulty,
            transition_reason: event.map(|e| e.reason),
            derived_features,
            answers_recorded: session.history.len(),
        };
        self.store.update(session)?;

        Ok(outcome)
    }

    pub fn finalize(&self, session_id: &str) -> Result<RiskAssessment> {
        let features = self.get_feature_vector(session_id)?;
        let assessment = self.classifier.classify(&features);
        tracing::info!(
            session_id = %session_id,
            risk_level = assessment.risk_level.as_str(),
            confidence = assessment.confidence,
            "Screening session finalized"
        );
        Ok(assessment)
    }

    pub fn get_feature_vector(&self, session_id: &str) -> Result<FeatureVector> {
        let session = self.load(session_id)?;
        Ok(FeatureAggregator::extract(
            session.history.signals(),
            session.age_group,
        ))
    }

    pub fn session_summary(&self, session_id: &str) -> Result<SessionSummary> {
        Ok(self.load(session_id)?.summary())
    }

    pub fn difficulty_params(&self, session_id: &str) -> Result<DifficultyView> {
        Ok(DifficultyView::for_session(&self.load(session_id)?))
    }

    pub fn generation_request(
        &self,
        session_id: &str,
        test_type: TestType,
        count: Option<u32>,
    ) -> Result<GenerationRequest> {
        let session = self.load(session_id)?;
        Ok(GenerationRequest::for_session(&session, test_type, count))
    }

    pub fn behavioral_analysis(&self, session_id: &str) -> Result<BehavioralAnalysis> {
        let session = self.load(session_id)?;
        Ok(self
            .recorder
            .analyze(&session.session_id, session.age_group, &session.history))
    }

    pub fn report(&self, session_id: &str) -> Result<SessionReport> {
        let session = self.load(session_id)?;
        let signals = session.history.signals();
        let features = FeatureAggregator::extract(signals, session.age_group);

        Ok(SessionReport {
            session_id: session.session_id.clone(),
            age_group: session.age_group,
            total_questions: signals.len(),
            correct_answers: signals.iter().filter(|s| s.is_correct).count(),
            difficulty: session.summary(),
            analysis: self
                .recorder
                .analyze(&session.session_id, session.age_group, &session.history),
            assessment: self.classifier.classify(&features),
            features,
        })
    }

    pub fn export_record(&self, session_id: &str) -> Result<SessionRecord> {
        Ok(self.load(session_id)?.to_record())
    }

    /// Rebuilds a session by replaying its signals, replacing any session
    /// with the same id.
    pub fn restore(&self, record: SessionRecord) -> Result<SessionSummary> {
        check_session_id(&record.session_id)?;
        for signal in &record.signals {
            check_signal(signal)?;
        }

        let lock = self.session_lock(&record.session_id);
        let _guard = lock.lock();

        let mut session = Session::new(
            record.session_id.clone(),
            record.age_group,
            self.config.window_size,
        );
        if record.created_at > 0 {
            session.created_at = record.created_at;
        }
        for signal in record.signals {
            self.apply_signal(&mut session, signal);
        }

        if session.difficulty != record.difficulty_state
            || session.transitions.len() != record.transitions.len()
        {
            tracing::warn!(
                session_id = %session.session_id,
                stored = record.difficulty_state.as_str(),
                replayed = session.difficulty.as_str(),
                stored_transitions = record.transitions.len(),
                replayed_transitions = session.transitions.len(),
                "Replayed session differs from stored record, keeping replay"
            );
        }

        let summary = session.summary();
        if self.store.get(&session.session_id)?.is_some() {
            self.store.update(session)?;
        } else {
            self.store.create(session)?;
        }
        tracing::info!(
            session_id = %summary.session_id,
            answers = summary.answers_recorded,
            "Screening session restored"
        );
        Ok(summary)
    }

    /// Appends one signal and runs the transition table. Shared by live
    /// recording and replay so both produce identical state.
    fn apply_signal(
        &self,
        session: &mut Session,
        signal: RawSignal,
    ) -> (DerivedFeatures, Option<TransitionEvent>) {
        let outcome = Outcome::from(&signal);
        let timestamp = signal.created_at;
        let derived = self
            .recorder
            .record(&mut session.history, signal, session.age_group);
        session.window.add(outcome);

        let signal_index = session.history.len() - 1;
        tracing::debug!(
            session_id = %session.session_id,
            signal_index,
            hesitation = derived.hesitation,
            confidence = derived.confidence,
            cognitive_load = derived.cognitive_load,
            rapid_guess = derived.rapid_guess,
            "Answer recorded"
        );

        let event = self
            .machine
            .step(session.difficulty, &session.window, signal_index, timestamp);
        if let Some(ref event) = event {
            tracing::info!(
                session_id = %session.session_id,
                from = event.from.as_str(),
                to = event.to.as_str(),
                rule = event.rule.as_str(),
                accuracy = event.accuracy,
                "Difficulty transition"
            );
            session.difficulty = event.to;
            session.transitions.push(event.clone());
        }

        (derived, event)
    }

    fn load(&self, session_id: &str) -> Result<Session> {
        self.store
            .get(session_id)?
            .ok_or_else(|| ScreeningError::not_found(session_id))
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock();
        Arc::clone(
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

/// Stored outcome when `question_id` repeats the most recent answer.
fn retried_outcome(session: &Session, question_id: &str) -> Result<Option<RecordOutcome>> {
    let signals = session.history.signals();
    let Some((last, derived)) = session.history.last() else {
        return Ok(None);
    };

    if last.question_id == question_id {
        let last_index = signals.len() - 1;
        let transition_reason = session
            .transitions
            .last()
            .filter(|e| e.signal_index == last_index)
            .map(|e| e.reason.clone());
        return Ok(Some(RecordOutcome {
            difficulty_state: session.difficulty,
            transition_reason,
            derived_features: *derived,
            answers_recorded: signals.len(),
        }));
    }

    if signals.iter().any(|s| s.question_id == question_id) {
        return Err(ScreeningError::DuplicateAnswer {
            session_id: session.session_id.clone(),
            question_id: question_id.to_string(),
        });
    }
    Ok(None)
}

fn check_session_id(session_id: &str) -> Result<()> {
    if session_id.trim().is_empty() {
        return Err(ScreeningError::validation("session id must not be empty"));
    }
    Ok(())
}

fn check_signal(signal: &RawSignal) -> Result<()> {
    check_measurements(
        signal.latency_ms,
        signal.revisions,
        signal.idle_before_submit_ms,
        signal.time_to_first_interaction_ms,
    )
    .map_err(|e| match e {
        ScreeningError::Validation(message) => {
            ScreeningError::validation(format!("signal {}: {message}", signal.question_id))
        }
        other => other,
    })
}

/// First `q{n}` id, counting from the history length, that no earlier
/// signal uses.
fn next_question_id(session: &Session) -> String {
    let signals = session.history.signals();
    (signals.len()..)
        .map(|n| format!("q{n}"))
        .find(|id| signals.iter().all(|s| &s.question_id != id))
        .unwrap_or_default()
}
