use crate::screening::config::TransitionThresholds;
use crate::screening::modeling::PerformanceWindow;
use crate::screening::types::{DifficultyState, ErrorPattern, TransitionEvent, TransitionRule, Trend};

/// Rule table over the rolling window; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct DifficultyStateMachine {
    thresholds: TransitionThresholds,
}

impl DifficultyStateMachine {
    pub fn new(thresholds: TransitionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TransitionThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, window: &PerformanceWindow) -> Option<TransitionRule> {
        let t = &self.thresholds;
        if window.len() < t.min_samples {
            return None;
        }

        let accuracy = window.accuracy();
        let pattern = window.error_pattern();
        let latency_trend = window.latency_trend();
        let hesitation_trend = window.hesitation_trend();
        let revisions = window.total_revisions();

        if accuracy >= t.raise_accuracy
            && pattern == ErrorPattern::ConsecutiveCorrect
            && hesitation_trend != Trend::Increasing
        {
            return Some(TransitionRule::HighAccuracyStreak);
        }
        if accuracy >= t.fast_raise_accuracy && latency_trend == Trend::Decreasing && revisions == 0 {
            return Some(TransitionRule::FastConfident);
        }
        if accuracy <= t.lower_accuracy {
            return Some(TransitionRule::LowAccuracy);
        }
        if pattern == ErrorPattern::ConsecutiveErrors {
            return Some(TransitionRule::ConsecutiveErrors);
        }
        if hesitation_trend == Trend::Increasing && accuracy < t.hesitation_accuracy {
            return Some(TransitionRule::RisingHesitation);
        }
        if revisions >= t.indecision_revisions && accuracy < t.indecision_accuracy {
            return Some(TransitionRule::Indecision);
        }
        if latency_trend == Trend::Increasing && accuracy < t.slowdown_accuracy {
            return Some(TransitionRule::SlowingDown);
        }

        None
    }

    /// Applies the matched rule to `current`. Saturated moves produce no event.
    pub fn step(
        &self,
        current: DifficultyState,
        window: &PerformanceWindow,
        signal_index: usize,
        timestamp: i64,
    ) -> Option<TransitionEvent> {
        let rule = self.evaluate(window)?;
        let target = if rule.raises() {
            current.raised()
        } else {
            current.lowered()
        }?;

        let accuracy = window.accuracy();
        Some(TransitionEvent {
            from: current,
            to: target,
            rule,
            reason: reason(rule, window),
            accuracy,
            signal_index,
            timestamp,
        })
    }
}

fn reason(rule: TransitionRule, window: &PerformanceWindow) -> String {
    let pct = window.accuracy() * 100.0;
    match rule {
        TransitionRule::HighAccuracyStreak => {
            format!("High accuracy ({pct:.0}%), confident responses")
        }
        TransitionRule::FastConfident => {
            format!("Fast confident responses ({pct:.0}% accuracy), increasing challenge")
        }
        TransitionRule::LowAccuracy => format!("Low accuracy ({pct:.0}%), simplifying questions"),
        TransitionRule::ConsecutiveErrors => {
            format!("Consecutive errors ({pct:.0}% accuracy), switching to easier questions")
        }
        TransitionRule::RisingHesitation => {
            format!("Increasing hesitation ({pct:.0}% accuracy), reducing cognitive load")
        }
        TransitionRule::Indecision => format!(
            "High indecision ({} revisions, {pct:.0}% accuracy), simplifying",
            window.total_revisions()
        ),
        TransitionRule::SlowingDown => {
            format!("Response times increasing ({pct:.0}% accuracy), reducing difficulty")
        }
    }
}
