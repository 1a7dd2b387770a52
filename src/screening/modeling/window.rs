use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::screening::types::{ErrorPattern, Outcome, Trend, WindowSnapshot};

pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Rolling buffer of the most recent answer outcomes of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceWindow {
    capacity: usize,
    outcomes: VecDeque<Outcome>,
}

impl PerformanceWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, outcome: Outcome) {
        self.outcomes.push_back(outcome);
        while self.outcomes.len() > self.capacity {
            self.outcomes.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    pub fn accuracy(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let correct = self.outcomes.iter().filter(|o| o.correct).count();
        correct as f64 / self.outcomes.len() as f64
    }

    pub fn avg_latency(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let total: f64 = self.outcomes.iter().map(|o| o.latency_ms as f64).sum();
        total / self.outcomes.len() as f64
    }

    pub fn latency_trend(&self) -> Trend {
        pairwise_trend(self.outcomes.iter().map(|o| o.latency_ms))
    }

    pub fn hesitation_trend(&self) -> Trend {
        pairwise_trend(self.outcomes.iter().map(|o| o.hesitation_ms))
    }

    pub fn error_pattern(&self) -> ErrorPattern {
        if self.outcomes.len() < 3 {
            return ErrorPattern::InsufficientData;
        }

        if self.outcomes.iter().all(|o| !o.correct) {
            return ErrorPattern::ConsecutiveErrors;
        }
        if self.outcomes.iter().all(|o| o.correct) {
            return ErrorPattern::ConsecutiveCorrect;
        }

        let alternating = self
            .outcomes
            .iter()
            .zip(self.outcomes.iter().skip(1))
            .all(|(a, b)| a.correct != b.correct);
        if alternating {
            ErrorPattern::Alternating
        } else {
            ErrorPattern::Mixed
        }
    }

    pub fn total_revisions(&self) -> i64 {
        self.outcomes
            .iter()
            .fold(0i64, |acc, o| acc.saturating_add(o.revisions as i64))
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            size: self.len(),
            accuracy: self.accuracy(),
            avg_latency_ms: self.avg_latency(),
            latency_trend: self.latency_trend(),
            hesitation_trend: self.hesitation_trend(),
            error_pattern: self.error_pattern(),
            total_revisions: self.total_revisions(),
        }
    }
}

impl Default for PerformanceWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Majority of strict pairwise increases vs decreases; ties are stable.
fn pairwise_trend(values: impl Iterator<Item = i64>) -> Trend {
    let values: Vec<i64> = values.collect();
    if values.len() < 2 {
        return Trend::Stable;
    }

    let mut increases = 0usize;
    let mut decreases = 0usize;
    for pair in values.windows(2) {
        if pair[1] > pair[0] {
            increases += 1;
        } else if pair[1] < pair[0] {
            decreases += 1;
        }
    }

    if increases > decreases {
        Trend::Increasing
    } else if decreases > increases {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(correct: bool, latency_ms: i64) -> Outcome {
        Outcome {
            correct,
            latency_ms,
            revisions: 0,
            hesitation_ms: 0,
        }
    }

    #[test]
    fn test_empty_window() {
        let window = PerformanceWindow::default();
        assert_eq!(window.accuracy(), 0.0);
        assert_eq!(window.avg_latency(), 0.0);
        assert_eq!(window.latency_trend(), Trend::Stable);
        assert_eq!(window.error_pattern(), ErrorPattern::InsufficientData);
        assert_eq!(window.total_revisions(), 0);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let mut window = PerformanceWindow::new(3);
        for _ in 0..3 {
            window.add(Outcome {
                correct: true,
                latency_ms: i64::MAX,
                revisions: i32::MAX,
                hesitation_ms: i64::MAX,
            });
        }
        assert!(window.avg_latency().is_finite());
        assert!(window.avg_latency() > 0.0);
        assert_eq!(window.total_revisions(), 3 * i32::MAX as i64);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut window = PerformanceWindow::new(3);
        window.add(outcome(false, 100));
        for _ in 0..3 {
            window.add(outcome(true, 200));
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.accuracy(), 1.0);
        assert_eq!(window.avg_latency(), 200.0);
    }

    #[test]
    fn test_latency_trend_majority() {
        let mut window = PerformanceWindow::new(3);
        window.add(outcome(true, 1000));
        window.add(outcome(true, 2000));
        window.add(outcome(true, 3000));
        assert_eq!(window.latency_trend(), Trend::Increasing);

        let mut window = PerformanceWindow::new(3);
        window.add(outcome(true, 3000));
        window.add(outcome(true, 2000));
        window.add(outcome(true, 2500));
        assert_eq!(window.latency_trend(), Trend::Stable);

        let mut window = PerformanceWindow::new(3);
        window.add(outcome(true, 3000));
        window.add(outcome(true, 2000));
        window.add(outcome(true, 2000));
        assert_eq!(window.latency_trend(), Trend::Decreasing);
    }

    #[test]
    fn test_equal_latencies_are_stable() {
        let mut window = PerformanceWindow::new(3);
        for _ in 0..3 {
            window.add(outcome(true, 2000));
        }
        assert_eq!(window.latency_trend(), Trend::Stable);
        assert_eq!(window.hesitation_trend(), Trend::Stable);
    }

    #[test]
    fn test_error_patterns() {
        let mut window = PerformanceWindow::new(3);
        window.add(outcome(true, 1));
        window.add(outcome(false, 1));
        assert_eq!(window.error_pattern(), ErrorPattern::InsufficientData);
        window.add(outcome(true, 1));
        assert_eq!(window.error_pattern(), ErrorPattern::Alternating);
        window.add(outcome(true, 1));
        assert_eq!(window.error_pattern(), ErrorPattern::Mixed);

        let mut window = PerformanceWindow::new(3);
        for _ in 0..3 {
            window.add(outcome(false, 1));
        }
        assert_eq!(window.error_pattern(), ErrorPattern::ConsecutiveErrors);
    }

    #[test]
    fn test_hesitation_trend_uses_hesitation_values() {
        let mut window = PerformanceWindow::new(3);
        for h in [100, 500, 900] {
            window.add(Outcome {
                correct: true,
                latency_ms: 1000,
                revisions: 1,
                hesitation_ms: h,
            });
        }
        assert_eq!(window.hesitation_trend(), Trend::Increasing);
        assert_eq!(window.latency_trend(), Trend::Stable);
        assert_eq!(window.total_revisions(), 3);
    }
}
