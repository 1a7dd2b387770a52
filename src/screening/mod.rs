//! Adaptive assessment and risk scoring for early dyscalculia screening.

pub mod config;
pub mod decision;
pub mod engine;
pub mod features;
pub mod generation;
pub mod modeling;
pub mod risk;
pub mod store;
pub mod types;

pub use config::{ClassifierConfig, DifficultyParams, ScreeningConfig, TimingThresholds};
pub use decision::DifficultyStateMachine;
pub use engine::ScreeningEngine;
pub use features::FeatureAggregator;
pub use generation::{DifficultyView, GenerationRequest};
pub use modeling::{BehavioralSignalRecorder, PerformanceWindow, SignalHistory};
pub use risk::{LabeledSample, ModelSource, RiskClassifier, RiskModel};
pub use store::{InMemorySessionStore, Session, SessionRecord, SessionStore};
pub use types::*;
