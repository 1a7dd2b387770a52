//! Synthetic training priors used when no trained model is available.
//!
//! Three Gaussian clusters describe typical low, medium and high risk
//! sessions. Values are clipped to their valid ranges after sampling.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::model::{LabeledSample, ModelSource, RiskModel};
use crate::error::{Result, ScreeningError};
use crate::screening::config::TrainingOptions;
use crate::screening::types::{FeatureVector, RiskLevel};

const DIM: usize = FeatureVector::CLASSIFIER_DIM;

struct Cluster {
    level: RiskLevel,
    loc: [f64; DIM],
    scale: [f64; DIM],
}

// accuracy %, avg latency, max latency, error rate %, skipped, revisions
const CLUSTERS: [Cluster; 3] = [
    Cluster {
        level: RiskLevel::Low,
        loc: [85.0, 3000.0, 6000.0, 15.0, 0.0, 1.0],
        scale: [10.0, 500.0, 1000.0, 10.0, 0.5, 1.0],
    },
    Cluster {
        level: RiskLevel::Medium,
        loc: [55.0, 5000.0, 10000.0, 45.0, 1.0, 3.0],
        scale: [15.0, 1000.0, 2000.0, 15.0, 1.0, 2.0],
    },
    Cluster {
        level: RiskLevel::High,
        loc: [25.0, 8000.0, 15000.0, 75.0, 3.0, 5.0],
        scale: [15.0, 2000.0, 3000.0, 15.0, 2.0, 2.0],
    },
];

const PERCENT_FEATURES: [usize; 2] = [0, 3];

pub fn synthetic_samples(options: &TrainingOptions) -> Result<Vec<LabeledSample>> {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut samples = Vec::with_capacity(options.samples_per_class * CLUSTERS.len());

    for cluster in &CLUSTERS {
        let dists = cluster
            .loc
            .iter()
            .zip(cluster.scale.iter())
            .map(|(&mean, &std)| Normal::new(mean, std))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScreeningError::Training(format!("invalid cluster prior: {e}")))?;

        for _ in 0..options.samples_per_class {
            let mut inputs = [0.0; DIM];
            for (i, dist) in dists.iter().enumerate() {
                let mut value = dist.sample(&mut rng).max(0.0);
                if PERCENT_FEATURES.contains(&i) {
                    value = value.min(100.0);
                }
                inputs[i] = value;
            }
            samples.push(LabeledSample {
                inputs,
                label: cluster.level,
            });
        }
    }

    Ok(samples)
}

/// Trains a model on the synthetic clusters alone.
pub fn bootstrap_model(options: &TrainingOptions) -> Result<RiskModel> {
    let samples = synthetic_samples(options)?;
    let mut model = RiskModel::train(&samples, options)?;
    model.source = ModelSource::Bootstrap;
    tracing::info!(
        seed = options.seed,
        samples = samples.len(),
        "Risk model bootstrapped from synthetic priors"
    );
    Ok(model)
}
