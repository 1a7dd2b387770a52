use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::screening::types::{AgeGroup, DifficultyState};

/// Age-specific response-time thresholds, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingThresholds {
    pub min_thinking_ms: f64,
    pub normal_ms: f64,
    pub slow_ms: f64,
}

impl TimingThresholds {
    pub fn for_age(age_group: AgeGroup) -> Self {
        match age_group {
            AgeGroup::FiveToSix => Self {
                min_thinking_ms: 2000.0,
                normal_ms: 8000.0,
                slow_ms: 15000.0,
            },
            AgeGroup::SevenToEight => Self {
                min_thinking_ms: 1500.0,
                normal_ms: 6000.0,
                slow_ms: 12000.0,
            },
            AgeGroup::NineToTen => Self {
                min_thinking_ms: 1000.0,
                normal_ms: 5000.0,
                slow_ms: 10000.0,
            },
        }
    }
}

impl Default for TimingThresholds {
    fn default() -> Self {
        Self::for_age(AgeGroup::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Count,
    Compare,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Compare => "compare",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualComplexity {
    Simple,
    Moderate,
    Detailed,
}

/// Content constraints the question generator must respect at a given level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyParams {
    pub number_range: (u32, u32),
    pub operations: Vec<Operation>,
    pub sequence_length: u32,
    pub visual_complexity: VisualComplexity,
}

impl DifficultyParams {
    pub fn lookup(age_group: AgeGroup, state: DifficultyState) -> Self {
        use AgeGroup::*;
        use DifficultyState::*;
        use Operation::*;

        let (range, operations, sequence_length): ((u32, u32), &[Operation], u32) =
            match (age_group, state) {
                (FiveToSix, Easy) => ((1, 5), &[Count], 2),
                (FiveToSix, Medium) => ((1, 10), &[Count, Compare, Add], 3),
                (FiveToSix, Hard) => ((1, 15), &[Add, Subtract, Compare], 4),
                (SevenToEight, Easy) => ((1, 10), &[Count, Compare], 3),
                (SevenToEight, Medium) => ((1, 20), &[Add, Subtract, Compare], 4),
                (SevenToEight, Hard) => ((1, 50), &[Add, Subtract, Multiply], 5),
                (NineToTen, Easy) => ((1, 20), &[Add, Subtract], 4),
                (NineToTen, Medium) => ((1, 50), &[Add, Subtract, Multiply], 5),
                (NineToTen, Hard) => ((1, 100), &[Add, Subtract, Multiply, Divide], 6),
            };

        let visual_complexity = match state {
            Easy => VisualComplexity::Simple,
            Medium => VisualComplexity::Moderate,
            Hard => VisualComplexity::Detailed,
        };

        Self {
            number_range: range,
            operations: operations.to_vec(),
            sequence_length,
            visual_complexity,
        }
    }
}

/// Thresholds of the difficulty transition table, in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionThresholds {
    pub min_samples: usize,
    pub raise_accuracy: f64,
    pub fast_raise_accuracy: f64,
    pub lower_accuracy: f64,
    pub hesitation_accuracy: f64,
    pub indecision_revisions: i64,
    pub indecision_accuracy: f64,
    pub slowdown_accuracy: f64,
}

impl Default for TransitionThresholds {
    fn default() -> Self {
        Self {
            min_samples: 2,
            raise_accuracy: 0.8,
            fast_raise_accuracy: 0.7,
            lower_accuracy: 0.4,
            hesitation_accuracy: 0.7,
            indecision_revisions: 3,
            indecision_accuracy: 0.6,
            slowdown_accuracy: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingOptions {
    pub seed: u64,
    pub samples_per_class: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2_lambda: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            samples_per_class: 100,
            epochs: 400,
            learning_rate: 0.5,
            l2_lambda: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub model_path: Option<PathBuf>,
    /// Train on synthetic priors when no usable model file exists.
    pub use_bootstrap_if_missing: bool,
    pub training: TrainingOptions,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: Some(PathBuf::from("./models/risk_classifier.json")),
            use_bootstrap_if_missing: true,
            training: TrainingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningConfig {
    pub window_size: usize,
    /// Number of recent signals used for decision stability.
    pub stability_window: usize,
    /// Number of recent signals used for trend and speed/accuracy scores.
    pub trend_window: usize,
    pub transitions: TransitionThresholds,
    pub classifier: ClassifierConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            stability_window: 5,
            trend_window: 3,
            transitions: TransitionThresholds::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ScreeningConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SCREENING_WINDOW_SIZE") {
            if let Ok(size) = val.trim().parse::<usize>() {
                if size >= 2 {
                    config.window_size = size;
                }
            }
        }
        if let Ok(val) = std::env::var("RISK_MODEL_PATH") {
            let trimmed = val.trim();
            config.classifier.model_path = if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            };
        }
        if let Ok(val) = std::env::var("RISK_MODEL_BOOTSTRAP") {
            config.classifier.use_bootstrap_if_missing = val.trim().parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RISK_MODEL_SEED") {
            config.classifier.training.seed = val.trim().parse().unwrap_or(42);
        }

        config
    }
}
