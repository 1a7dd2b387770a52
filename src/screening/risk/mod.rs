pub mod bootstrap;
pub mod classifier;
pub mod model;
pub mod persistence;
pub mod report;

pub use classifier::RiskClassifier;
pub use model::{LabeledSample, ModelSource, RiskModel};
