use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::bootstrap::bootstrap_model;
use super::model::{LabeledSample, ModelSource, RiskModel};
use super::persistence::{load_risk_model, save_risk_model};
use super::report;
use crate::error::{Result, ScreeningError};
use crate::screening::config::{ClassifierConfig, TrainingOptions};
use crate::screening::types::{FeatureVector, RiskAssessment};

pub struct RiskClassifier {
    model: RwLock<RiskModel>,
    model_path: Option<PathBuf>,
    training: TrainingOptions,
}

impl RiskClassifier {
    /// Loads the configured model, falling back to synthetic bootstrap
    /// training when allowed. Meant to run once at start-up.
    pub fn initialize(config: &ClassifierConfig) -> Result<Self> {
        let path = config.model_path.as_deref();

        if let Some(path) = path {
            match load_risk_model(path) {
                Ok(Some(model)) => {
                    tracing::info!(
                        path = %path.display(),
                        source = model.source.as_str(),
                        samples = model.sample_count,
                        "Risk model loaded"
                    );
                    return Ok(Self::from_model(model, config));
                }
                Ok(None) => {
                    tracing::info!(path = %path.display(), "No risk model file found");
                }
                Err(e) if config.use_bootstrap_if_missing => {
                    tracing::warn!(path = %path.display(), error = %e, "Risk model unusable, bootstrapping");
                }
                Err(e) => {
                    return Err(ScreeningError::ClassifierUnavailable(format!(
                        "{}: {e}",
                        path.display()
                    )));
                }
            }
        }

        if !config.use_bootstrap_if_missing {
            return Err(ScreeningError::ClassifierUnavailable(
                "no trained model and bootstrap training is disabled".to_string(),
            ));
        }

        let model = bootstrap_model(&config.training)?;
        if let Some(path) = path {
            persist(path, &model);
        }
        Ok(Self::from_model(model, config))
    }

    pub fn from_model(model: RiskModel, config: &ClassifierConfig) -> Self {
        Self {
            model: RwLock::new(model),
            model_path: config.model_path.clone(),
            training: config.training.clone(),
        }
    }

    pub fn classify(&self, features: &FeatureVector) -> RiskAssessment {
        let (risk_level, confidence) = self.model.read().predict(&features.classifier_inputs());
        RiskAssessment {
            risk_level,
            confidence,
            explanation: report::explanation(risk_level, features.accuracy_percent),
            recommendations: report::recommendations(risk_level),
        }
    }

    /// Trains on labeled sessions and swaps the model in place.
    pub fn retrain(&self, samples: &[LabeledSample]) -> Result<()> {
        let model = RiskModel::train(samples, &self.training)?;
        if let Some(path) = self.model_path.as_deref() {
            save_risk_model(path, &model)?;
        }
        tracing::info!(samples = samples.len(), "Risk model retrained");
        *self.model.write() = model;
        Ok(())
    }

    pub fn source(&self) -> ModelSource {
        self.model.read().source
    }

    pub fn model(&self) -> RiskModel {
        self.model.read().clone()
    }
}

fn persist(path: &Path, model: &RiskModel) {
    if let Err(e) = save_risk_model(path, model) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to persist bootstrapped risk model");
    }
}
