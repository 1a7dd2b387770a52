use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreeningError};
use crate::screening::config::TrainingOptions;
use crate::screening::types::{FeatureVector, RiskLevel};

pub const MODEL_VERSION: u32 = 1;
const DIM: usize = FeatureVector::CLASSIFIER_DIM;
const CLASSES: usize = 3;
const MIN_STD: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// Trained on synthetic cluster priors only.
    Bootstrap,
    Trained,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Trained => "trained",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub inputs: [f64; DIM],
    pub label: RiskLevel,
}

impl LabeledSample {
    pub fn new(features: &FeatureVector, label: RiskLevel) -> Self {
        Self {
            inputs: features.classifier_inputs(),
            label,
        }
    }
}

/// Multinomial logistic regression over standardized classifier inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskModel {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub means: [f64; DIM],
    pub stds: [f64; DIM],
    pub weights: [[f64; DIM]; CLASSES],
    pub biases: [f64; CLASSES],
    pub source: ModelSource,
    pub sample_count: usize,
    pub trained_at: i64,
}

impl RiskModel {
    pub fn train(samples: &[LabeledSample], options: &TrainingOptions) -> Result<Self> {
        if samples.is_empty() {
            return Err(ScreeningError::Training("no training samples".to_string()));
        }
        for level in RiskLevel::ALL {
            if !samples.iter().any(|s| s.label == level) {
                return Err(ScreeningError::Training(format!(
                    "no samples labeled {}",
                    level.as_str()
                )));
            }
        }
        if samples.iter().any(|s| s.inputs.iter().any(|x| !x.is_finite())) {
            return Err(ScreeningError::Training(
                "training inputs must be finite".to_string(),
            ));
        }

        let (means, stds) = standardization(samples);
        let scaled: Vec<([f64; DIM], usize)> = samples
            .iter()
            .map(|s| (scale(&s.inputs, &means, &stds), s.label.index()))
            .collect();

        let n = scaled.len() as f64;
        let mut weights = [[0.0; DIM]; CLASSES];
        let mut biases = [0.0; CLASSES];

        for _ in 0..options.epochs {
            let mut grad_w = [[0.0; DIM]; CLASSES];
            let mut grad_b = [0.0; CLASSES];

            for (x, label) in &scaled {
                let probs = softmax(&logits(&weights, &biases, x));
                for k in 0..CLASSES {
                    let target = if k == *label { 1.0 } else { 0.0 };
                    let error = probs[k] - target;
                    for (g, xi) in grad_w[k].iter_mut().zip(x.iter()) {
                        *g += error * xi;
                    }
                    grad_b[k] += error;
                }
            }

            for k in 0..CLASSES {
                for (w, g) in weights[k].iter_mut().zip(grad_w[k].iter()) {
                    *w -= options.learning_rate * (g / n + options.l2_lambda * *w);
                }
                biases[k] -= options.learning_rate * grad_b[k] / n;
            }
        }

        Ok(Self {
            version: MODEL_VERSION,
            feature_names: FeatureVector::CLASSIFIER_FEATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            means,
            stds,
            weights,
            biases,
            source: ModelSource::Trained,
            sample_count: samples.len(),
            trained_at: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Class probabilities in `RiskLevel::ALL` order.
    pub fn predict_proba(&self, inputs: &[f64; DIM]) -> [f64; CLASSES] {
        let x = scale(inputs, &self.means, &self.stds);
        softmax(&logits(&self.weights, &self.biases, &x))
    }

    pub fn predict(&self, inputs: &[f64; DIM]) -> (RiskLevel, f64) {
        let probs = self.predict_proba(inputs);
        let (index, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        (RiskLevel::from_index(index).unwrap_or(RiskLevel::Medium), confidence)
    }

    /// Checks a loaded model against the current input schema.
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(ScreeningError::ClassifierUnavailable(format!(
                "unsupported model version {}",
                self.version
            )));
        }
        let expected = FeatureVector::CLASSIFIER_FEATURES;
        if self.feature_names.len() != expected.len()
            || self.feature_names.iter().zip(expected.iter()).any(|(a, b)| a != b)
        {
            return Err(ScreeningError::ClassifierUnavailable(
                "model feature schema does not match".to_string(),
            ));
        }
        let finite = self.means.iter().chain(self.stds.iter()).chain(self.biases.iter())
            .chain(self.weights.iter().flatten())
            .all(|v| v.is_finite());
        if !finite || self.stds.iter().any(|s| *s <= 0.0) {
            return Err(ScreeningError::ClassifierUnavailable(
                "model parameters are not finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn standardization(samples: &[LabeledSample]) -> ([f64; DIM], [f64; DIM]) {
    let n = samples.len() as f64;
    let mut means = [0.0; DIM];
    let mut stds = [0.0; DIM];

    for s in samples {
        for (m, x) in means.iter_mut().zip(s.inputs.iter()) {
            *m += x / n;
        }
    }
    for s in samples {
        for i in 0..DIM {
            stds[i] += (s.inputs[i] - means[i]).powi(2) / n;
        }
    }
    for s in stds.iter_mut() {
        *s = s.sqrt();
        if *s < MIN_STD {
            *s = 1.0;
        }
    }
    (means, stds)
}

fn scale(inputs: &[f64; DIM], means: &[f64; DIM], stds: &[f64; DIM]) -> [f64; DIM] {
    let mut out = [0.0; DIM];
    for i in 0..DIM {
        out[i] = (inputs[i] - means[i]) / stds[i];
    }
    out
}

fn logits(weights: &[[f64; DIM]; CLASSES], biases: &[f64; CLASSES], x: &[f64; DIM]) -> [f64; CLASSES] {
    let mut z = [0.0; CLASSES];
    for k in 0..CLASSES {
        z[k] = weights[k].iter().zip(x.iter()).map(|(w, xi)| w * xi).sum::<f64>() + biases[k];
    }
    z
}

fn softmax(z: &[f64; CLASSES]) -> [f64; CLASSES] {
    let max = z.iter().copied().fold(f64::MIN, f64::max);
    let mut out = [0.0; CLASSES];
    let mut sum = 0.0;
    for k in 0..CLASSES {
        out[k] = (z[k] - max).exp();
        sum += out[k];
    }
    for p in out.iter_mut() {
        *p /= sum;
    }
    out
}
