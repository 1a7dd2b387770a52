//! Session-level feature extraction.
//!
//! The resulting [`FeatureVector`] is the only input of the risk classifier.
//! It is computed from the raw signal history alone, never from difficulty
//! transitions.

use crate::screening::config::TimingThresholds;
use crate::screening::modeling::round3;
use crate::screening::types::{AgeGroup, FeatureVector, RawSignal};

const CONFIDENCE_ACCURACY_WEIGHT: f64 = 0.4;
const CONFIDENCE_REVISION_WEIGHT: f64 = 0.3;
const CONFIDENCE_LATENCY_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAggregator;

impl FeatureAggregator {
    pub fn extract(signals: &[RawSignal], age_group: AgeGroup) -> FeatureVector {
        if signals.is_empty() {
            return FeatureVector::default();
        }

        let thresholds = TimingThresholds::for_age(age_group);
        let n = signals.len() as f64;
        let latencies: Vec<f64> = signals.iter().map(|s| s.latency_ms as f64).collect();

        let correct = signals.iter().filter(|s| s.is_correct).count() as f64;
        let accuracy = correct / n;
        let avg_latency = latencies.iter().sum::<f64>() / n;
        let max_latency = latencies.iter().copied().fold(f64::MIN, f64::max);
        let min_latency = latencies.iter().copied().fold(f64::MAX, f64::min);
        let total_revisions = signals
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.revisions.max(0) as u32));

        FeatureVector {
            accuracy_percent: round3(accuracy * 100.0),
            avg_latency_ms: round3(avg_latency),
            max_latency_ms: max_latency,
            min_latency_ms: min_latency,
            error_rate_percent: round3((1.0 - accuracy) * 100.0),
            skipped_count: signals.iter().filter(|s| s.skipped).count() as u32,
            total_revisions,
            latency_variance: round3(variance(&latencies, avg_latency)),
            longest_error_streak: longest_error_streak(signals),
            rapid_count: latencies
                .iter()
                .filter(|&&l| l < thresholds.min_thinking_ms)
                .count() as u32,
            slow_count: latencies.iter().filter(|&&l| l > thresholds.slow_ms).count() as u32,
            hesitation_index: round3(hesitation_index(avg_latency, total_revisions, n, &thresholds)),
            confidence_index: round3(confidence_index(
                accuracy,
                avg_latency,
                total_revisions,
                n,
                &thresholds,
            )),
        }
    }
}

/// Population variance; zero below two samples.
fn variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn longest_error_streak(signals: &[RawSignal]) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for signal in signals {
        if signal.is_correct {
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}

fn hesitation_index(avg_latency: f64, revisions: u32, n: f64, thresholds: &TimingThresholds) -> f64 {
    if avg_latency <= 0.0 {
        return 0.0;
    }
    let latency_term = (avg_latency / thresholds.slow_ms).min(1.0);
    let revision_term = (revisions as f64 / (2.0 * n)).min(1.0);
    (latency_term + revision_term) / 2.0
}

fn confidence_index(
    accuracy: f64,
    avg_latency: f64,
    revisions: u32,
    n: f64,
    thresholds: &TimingThresholds,
) -> f64 {
    let revision_term = 1.0 - (revisions as f64 / n).min(1.0);
    let latency_term = 1.0 - (avg_latency / thresholds.normal_ms).min(1.0);
    CONFIDENCE_ACCURACY_WEIGHT * accuracy
        + CONFIDENCE_REVISION_WEIGHT * revision_term
        + CONFIDENCE_LATENCY_WEIGHT * latency_term
}
