use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreeningError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum AgeGroup {
    #[serde(rename = "5-6")]
    FiveToSix,
    #[default]
    #[serde(rename = "7-8")]
    SevenToEight,
    #[serde(rename = "9-10")]
    NineToTen,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [Self::FiveToSix, Self::SevenToEight, Self::NineToTen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveToSix => "5-6",
            Self::SevenToEight => "7-8",
            Self::NineToTen => "9-10",
        }
    }

    /// Unknown bands fall back to the default (7-8) band.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "5-6" => Self::FiveToSix,
            "9-10" => Self::NineToTen,
            _ => Self::SevenToEight,
        }
    }
}

impl From<String> for AgeGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    #[default]
    NumberComparison,
    MentalArithmetic,
    MemoryRecall,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumberComparison => "number-comparison",
            Self::MentalArithmetic => "mental-arithmetic",
            Self::MemoryRecall => "memory-recall",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number-comparison" => Some(Self::NumberComparison),
            "mental-arithmetic" => Some(Self::MentalArithmetic),
            "memory-recall" => Some(Self::MemoryRecall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum DifficultyState {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyState {
    pub const LEVELS: [DifficultyState; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Every new session starts at the middle level.
    pub fn initial() -> Self {
        Self::LEVELS[Self::LEVELS.len() / 2]
    }

    pub fn raised(&self) -> Option<Self> {
        match self {
            Self::Easy => Some(Self::Medium),
            Self::Medium => Some(Self::Hard),
            Self::Hard => None,
        }
    }

    pub fn lowered(&self) -> Option<Self> {
        match self {
            Self::Hard => Some(Self::Medium),
            Self::Medium => Some(Self::Easy),
            Self::Easy => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ErrorPattern {
    #[default]
    InsufficientData,
    ConsecutiveErrors,
    ConsecutiveCorrect,
    Alternating,
    Mixed,
}

impl ErrorPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::ConsecutiveErrors => "consecutive_errors",
            Self::ConsecutiveCorrect => "consecutive_correct",
            Self::Alternating => "alternating",
            Self::Mixed => "mixed",
        }
    }
}

/// One entry of the rolling performance window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub correct: bool,
    pub latency_ms: i64,
    pub revisions: i32,
    pub hesitation_ms: i64,
}

impl From<&RawSignal> for Outcome {
    fn from(signal: &RawSignal) -> Self {
        Self {
            correct: signal.is_correct,
            latency_ms: signal.latency_ms,
            revisions: signal.revisions,
            hesitation_ms: signal.time_to_first_interaction_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSignal {
    pub question_id: String,
    pub latency_ms: i64,
    pub revisions: i32,
    pub idle_before_submit_ms: i64,
    pub time_to_first_interaction_ms: i64,
    pub is_correct: bool,
    #[serde(default)]
    pub skipped: bool,
    pub selected_answer: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFeatures {
    pub hesitation: f64,
    pub confidence: f64,
    pub decision_stability: f64,
    pub cognitive_load: f64,
    pub rapid_guess: bool,
    pub speed_accuracy_imbalance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRule {
    HighAccuracyStreak,
    FastConfident,
    LowAccuracy,
    ConsecutiveErrors,
    RisingHesitation,
    Indecision,
    SlowingDown,
}

impl TransitionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAccuracyStreak => "high_accuracy_streak",
            Self::FastConfident => "fast_confident",
            Self::LowAccuracy => "low_accuracy",
            Self::ConsecutiveErrors => "consecutive_errors",
            Self::RisingHesitation => "rising_hesitation",
            Self::Indecision => "indecision",
            Self::SlowingDown => "slowing_down",
        }
    }

    pub fn raises(&self) -> bool {
        matches!(self, Self::HighAccuracyStreak | Self::FastConfident)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub from: DifficultyState,
    pub to: DifficultyState,
    pub rule: TransitionRule,
    pub reason: String,
    pub accuracy: f64,
    /// Index of the signal whose recording triggered the change.
    pub signal_index: usize,
    pub timestamp: i64,
}

/// Session-level classifier input. Every field is zero for an empty history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub accuracy_percent: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub min_latency_ms: f64,
    pub error_rate_percent: f64,
    pub skipped_count: u32,
    pub total_revisions: u32,
    pub latency_variance: f64,
    pub longest_error_streak: u32,
    pub rapid_count: u32,
    pub slow_count: u32,
    pub hesitation_index: f64,
    pub confidence_index: f64,
}

impl FeatureVector {
    pub const CLASSIFIER_DIM: usize = 6;

    pub const CLASSIFIER_FEATURES: [&'static str; Self::CLASSIFIER_DIM] = [
        "accuracyPercent",
        "avgLatencyMs",
        "maxLatencyMs",
        "errorRatePercent",
        "skippedCount",
        "totalRevisions",
    ];

    pub fn classifier_inputs(&self) -> [f64; Self::CLASSIFIER_DIM] {
        [
            self.accuracy_percent,
            self.avg_latency_ms,
            self.max_latency_ms,
            self.error_rate_percent,
            self.skipped_count as f64,
            self.total_revisions as f64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub explanation: String,
    pub recommendations: Vec<String>,
}

/// One answer submission as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerInput {
    /// Only used when the answer creates the session.
    #[serde(default)]
    pub age_group: AgeGroup,
    pub is_correct: bool,
    pub latency_ms: i64,
    pub revisions: i32,
    pub idle_before_submit_ms: i64,
    pub time_to_first_interaction_ms: i64,
    pub selected_answer: String,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub skipped: bool,
}

/// Upper bound for any duration field; one day in milliseconds.
pub const MAX_DURATION_MS: i64 = 86_400_000;
/// Upper bound for revisions on a single answer.
pub const MAX_REVISIONS: i32 = 10_000;

/// Range check shared by live answers and replayed signals.
pub(crate) fn check_measurements(
    latency_ms: i64,
    revisions: i32,
    idle_before_submit_ms: i64,
    time_to_first_interaction_ms: i64,
) -> Result<()> {
    check_duration("latencyMs", latency_ms)?;
    if revisions < 0 {
        return Err(ScreeningError::validation("revisions must not be negative"));
    }
    if revisions > MAX_REVISIONS {
        return Err(ScreeningError::validation(format!(
            "revisions must not exceed {MAX_REVISIONS}"
        )));
    }
    check_duration("idleBeforeSubmitMs", idle_before_submit_ms)?;
    check_duration("timeToFirstInteractionMs", time_to_first_interaction_ms)
}

fn check_duration(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(ScreeningError::validation(format!(
            "{field} must not be negative"
        )));
    }
    if value > MAX_DURATION_MS {
        return Err(ScreeningError::validation(format!(
            "{field} must not exceed {MAX_DURATION_MS}"
        )));
    }
    Ok(())
}

impl RecordAnswerInput {
    pub fn validate(&self) -> Result<()> {
        check_measurements(
            self.latency_ms,
            self.revisions,
            self.idle_before_submit_ms,
            self.time_to_first_interaction_ms,
        )?;
        if let Some(ref id) = self.question_id {
            if id.trim().is_empty() {
                return Err(ScreeningError::validation("questionId must not be blank"));
            }
        }
        Ok(())
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped || self.selected_answer.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub difficulty_state: DifficultyState,
    pub transition_reason: Option<String>,
    pub derived_features: DerivedFeatures,
    pub answers_recorded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    pub size: usize,
    pub accuracy: f64,
    pub avg_latency_ms: f64,
    pub latency_trend: Trend,
    pub hesitation_trend: Trend,
    pub error_pattern: ErrorPattern,
    pub total_revisions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub age_group: AgeGroup,
    pub difficulty_state: DifficultyState,
    pub answers_recorded: usize,
    pub transitions: Vec<TransitionEvent>,
    pub window: WindowSnapshot,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralMetrics {
    pub avg_hesitation: f64,
    pub avg_confidence: f64,
    pub avg_decision_stability: f64,
    pub avg_cognitive_load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralAnalysis {
    pub session_id: String,
    pub age_group: AgeGroup,
    pub total_questions: usize,
    pub accuracy: f64,
    pub avg_latency_ms: f64,
    pub total_revisions: i64,
    pub rapid_guess_count: usize,
    pub metrics: BehavioralMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub age_group: AgeGroup,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub difficulty: SessionSummary,
    pub features: FeatureVector,
    pub analysis: BehavioralAnalysis,
    pub assessment: RiskAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_fallback() {
        assert_eq!(AgeGroup::parse("5-6"), AgeGroup::FiveToSix);
        assert_eq!(AgeGroup::parse(" 9-10 "), AgeGroup::NineToTen);
        assert_eq!(AgeGroup::parse("11-12"), AgeGroup::SevenToEight);
        assert_eq!(AgeGroup::parse(""), AgeGroup::default());
    }

    #[test]
    fn test_age_group_deserializes_leniently() {
        let age: AgeGroup = serde_json::from_str("\"9-10\"").unwrap();
        assert_eq!(age, AgeGroup::NineToTen);
        let age: AgeGroup = serde_json::from_str("\"adult\"").unwrap();
        assert_eq!(age, AgeGroup::SevenToEight);
        assert_eq!(serde_json::to_string(&AgeGroup::FiveToSix).unwrap(), "\"5-6\"");
    }

    #[test]
    fn test_difficulty_saturates() {
        assert_eq!(DifficultyState::initial(), DifficultyState::Medium);
        assert_eq!(DifficultyState::Hard.raised(), None);
        assert_eq!(DifficultyState::Easy.lowered(), None);
        assert_eq!(DifficultyState::Easy.raised(), Some(DifficultyState::Medium));
        assert!(DifficultyState::Easy < DifficultyState::Hard);
    }

    #[test]
    fn test_difficulty_serializes_uppercase() {
        let json = serde_json::to_string(&DifficultyState::Hard).unwrap();
        assert_eq!(json, "\"HARD\"");
    }

    #[test]
    fn test_feature_vector_default_is_zero() {
        let v = FeatureVector::default();
        assert!(v.classifier_inputs().iter().all(|x| *x == 0.0));
        assert_eq!(v.longest_error_streak, 0);
    }

    #[test]
    fn test_input_rejects_negative_values() {
        let mut input = RecordAnswerInput {
            age_group: AgeGroup::SevenToEight,
            is_correct: true,
            latency_ms: 1000,
            revisions: 0,
            idle_before_submit_ms: 0,
            time_to_first_interaction_ms: 0,
            selected_answer: "3".to_string(),
            question_id: None,
            skipped: false,
        };
        assert!(input.validate().is_ok());

        input.latency_ms = -1;
        assert!(matches!(input.validate(), Err(ScreeningError::Validation(_))));

        input.latency_ms = 10;
        input.revisions = -2;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_rejects_values_above_bounds() {
        let mut input = RecordAnswerInput {
            age_group: AgeGroup::SevenToEight,
            is_correct: true,
            latency_ms: MAX_DURATION_MS,
            revisions: MAX_REVISIONS,
            idle_before_submit_ms: MAX_DURATION_MS,
            time_to_first_interaction_ms: MAX_DURATION_MS,
            selected_answer: "3".to_string(),
            question_id: None,
            skipped: false,
        };
        assert!(input.validate().is_ok());

        input.latency_ms = i64::MAX;
        assert!(matches!(input.validate(), Err(ScreeningError::Validation(_))));

        input.latency_ms = 1000;
        input.revisions = i32::MAX;
        assert!(matches!(input.validate(), Err(ScreeningError::Validation(_))));

        input.revisions = 0;
        input.time_to_first_interaction_ms = MAX_DURATION_MS + 1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_blank_answer_is_skipped() {
        let input = RecordAnswerInput {
            age_group: AgeGroup::FiveToSix,
            is_correct: false,
            latency_ms: 1000,
            revisions: 0,
            idle_before_submit_ms: 0,
            time_to_first_interaction_ms: 0,
            selected_answer: "  ".to_string(),
            question_id: None,
            skipped: false,
        };
        assert!(input.is_skipped());
    }

    #[test]
    fn test_risk_level_index_roundtrip() {
        for level in RiskLevel::ALL {
            assert_eq!(RiskLevel::from_index(level.index()), Some(level));
        }
        assert_eq!(RiskLevel::from_index(3), None);
    }
}
