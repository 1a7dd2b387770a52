use serde::{Deserialize, Serialize};

use crate::screening::config::TimingThresholds;
use crate::screening::modeling::round3;
use crate::screening::types::{
    AgeGroup, BehavioralAnalysis, BehavioralMetrics, DerivedFeatures, RawSignal,
};

const IDLE_HESITATION_FLOOR_MS: f64 = 2000.0;
const IDLE_REFERENCE_MS: f64 = 10_000.0;
const FIRST_INTERACTION_REFERENCE_MS: f64 = 8000.0;
const HESITATION_REVISION_REFERENCE: f64 = 5.0;
const CONFIDENCE_REVISION_PENALTY: f64 = 0.25;
const CORRECT_CONFIDENCE_BONUS: f64 = 0.8;
const STABILITY_REVISION_REFERENCE: f64 = 3.0;
const LOAD_REVISION_REFERENCE: f64 = 4.0;
const RISING_LATENCY_LOAD: f64 = 0.7;

/// Append-only raw signal history with the derived features of each signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalHistory {
    signals: Vec<RawSignal>,
    derived: Vec<DerivedFeatures>,
}

impl SignalHistory {
    pub fn signals(&self) -> &[RawSignal] {
        &self.signals
    }

    pub fn derived(&self) -> &[DerivedFeatures] {
        &self.derived
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn last(&self) -> Option<(&RawSignal, &DerivedFeatures)> {
        self.signals.last().zip(self.derived.last())
    }
}

#[derive(Debug, Clone)]
pub struct BehavioralSignalRecorder {
    stability_window: usize,
    trend_window: usize,
}

impl BehavioralSignalRecorder {
    pub fn new(stability_window: usize, trend_window: usize) -> Self {
        Self {
            stability_window: stability_window.max(1),
            trend_window: trend_window.max(2),
        }
    }

    /// Appends `signal` and returns its derived features.
    pub fn record(
        &self,
        history: &mut SignalHistory,
        signal: RawSignal,
        age_group: AgeGroup,
    ) -> DerivedFeatures {
        history.signals.push(signal);
        let features = self.derive(&history.signals, TimingThresholds::for_age(age_group));
        history.derived.push(features);
        features
    }

    /// Features for the last signal of `signals`, given the signals before it.
    pub fn derive(&self, signals: &[RawSignal], thresholds: TimingThresholds) -> DerivedFeatures {
        let Some(current) = signals.last() else {
            return DerivedFeatures::default();
        };

        DerivedFeatures {
            hesitation: round3(hesitation_score(current, &thresholds)),
            confidence: round3(confidence_score(current, &thresholds)),
            decision_stability: round3(self.decision_stability(signals)),
            cognitive_load: round3(self.cognitive_load(signals, &thresholds)),
            rapid_guess: (current.latency_ms as f64) < thresholds.min_thinking_ms,
            speed_accuracy_imbalance: round3(self.speed_accuracy_imbalance(signals, &thresholds)),
        }
    }

    pub fn analyze(
        &self,
        session_id: &str,
        age_group: AgeGroup,
        history: &SignalHistory,
    ) -> BehavioralAnalysis {
        let signals = history.signals();
        let derived = history.derived();
        let total = signals.len();

        let (accuracy, avg_latency_ms) = if total == 0 {
            (0.0, 0.0)
        } else {
            let correct = signals.iter().filter(|s| s.is_correct).count();
            let latency: f64 = signals.iter().map(|s| s.latency_ms as f64).sum();
            (
                round3(correct as f64 / total as f64),
                (latency / total as f64).round(),
            )
        };

        let metrics = if derived.is_empty() {
            BehavioralMetrics::default()
        } else {
            let n = derived.len() as f64;
            let mean = |f: fn(&DerivedFeatures) -> f64| round3(derived.iter().map(f).sum::<f64>() / n);
            BehavioralMetrics {
                avg_hesitation: mean(|d| d.hesitation),
                avg_confidence: mean(|d| d.confidence),
                avg_decision_stability: mean(|d| d.decision_stability),
                avg_cognitive_load: mean(|d| d.cognitive_load),
            }
        };

        BehavioralAnalysis {
            session_id: session_id.to_string(),
            age_group,
            total_questions: total,
            accuracy,
            avg_latency_ms,
            total_revisions: signals
                .iter()
                .fold(0i64, |acc, s| acc.saturating_add(s.revisions as i64)),
            rapid_guess_count: derived.iter().filter(|d| d.rapid_guess).count(),
            metrics,
        }
    }

    fn decision_stability(&self, signals: &[RawSignal]) -> f64 {
        let recent = tail(signals, self.stability_window);
        if recent.is_empty() {
            return 1.0;
        }
        let revisions: f64 = recent.iter().map(|s| s.revisions as f64).sum();
        let avg = revisions / recent.len() as f64;
        (1.0 - avg / STABILITY_REVISION_REFERENCE).clamp(0.0, 1.0)
    }

    fn cognitive_load(&self, signals: &[RawSignal], thresholds: &TimingThresholds) -> f64 {
        let Some(current) = signals.last() else {
            return 0.0;
        };
        let latency = current.latency_ms as f64;
        let mut factors = Vec::with_capacity(3);

        if latency > thresholds.normal_ms {
            factors.push((latency / thresholds.slow_ms).min(1.0));
        }
        factors.push((current.revisions as f64 / LOAD_REVISION_REFERENCE).min(1.0));

        if signals.len() >= self.trend_window {
            let recent = tail(signals, self.trend_window);
            let rising = recent.windows(2).all(|w| w[0].latency_ms < w[1].latency_ms);
            if rising {
                factors.push(RISING_LATENCY_LOAD);
            }
        }

        mean_clamped(&factors)
    }

    fn speed_accuracy_imbalance(&self, signals: &[RawSignal], thresholds: &TimingThresholds) -> f64 {
        if signals.len() < self.trend_window {
            return 0.0;
        }
        let recent = tail(signals, self.trend_window);
        let n = recent.len() as f64;
        let accuracy = recent.iter().filter(|s| s.is_correct).count() as f64 / n;
        let avg_latency = recent.iter().map(|s| s.latency_ms as f64).sum::<f64>() / n;
        accuracy - (1.0 - avg_latency / thresholds.slow_ms)
    }
}

impl Default for BehavioralSignalRecorder {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

fn hesitation_score(signal: &RawSignal, thresholds: &TimingThresholds) -> f64 {
    let idle = signal.idle_before_submit_ms as f64;
    let first_interaction = signal.time_to_first_interaction_ms as f64;
    let mut factors = Vec::with_capacity(3);

    if idle > IDLE_HESITATION_FLOOR_MS {
        factors.push((idle / IDLE_REFERENCE_MS).min(1.0));
    }
    if first_interaction > thresholds.min_thinking_ms {
        factors.push((first_interaction / FIRST_INTERACTION_REFERENCE_MS).min(1.0));
    }
    if signal.revisions > 0 {
        factors.push((signal.revisions as f64 / HESITATION_REVISION_REFERENCE).min(1.0));
    }

    mean_clamped(&factors)
}

fn confidence_score(signal: &RawSignal, thresholds: &TimingThresholds) -> f64 {
    let latency = signal.latency_ms as f64;
    let mut factors = Vec::with_capacity(3);

    factors.push(if latency < thresholds.normal_ms {
        1.0 - latency / thresholds.normal_ms
    } else {
        0.0
    });
    factors.push((1.0 - signal.revisions as f64 * CONFIDENCE_REVISION_PENALTY).max(0.0));
    if signal.is_correct {
        factors.push(CORRECT_CONFIDENCE_BONUS);
    }

    mean_clamped(&factors)
}

fn mean_clamped(factors: &[f64]) -> f64 {
    if factors.is_empty() {
        return 0.0;
    }
    (factors.iter().sum::<f64>() / factors.len() as f64).clamp(0.0, 1.0)
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
