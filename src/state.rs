use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::cache::RedisCache;
use crate::error::Result;
use crate::screening::{InMemorySessionStore, RiskClassifier, ScreeningConfig, ScreeningEngine};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    engine: Arc<ScreeningEngine>,
    cache: Option<Arc<RedisCache>>,
}

impl AppState {
    pub fn new(engine: Arc<ScreeningEngine>, cache: Option<Arc<RedisCache>>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            engine,
            cache,
        }
    }

    /// Builds the engine with an in-memory store. Classifier initialization
    /// happens here, once, before any request is served.
    pub fn create_engine(config: ScreeningConfig) -> Result<Arc<ScreeningEngine>> {
        let classifier = Arc::new(RiskClassifier::initialize(&config.classifier)?);
        Ok(Arc::new(ScreeningEngine::new(
            config,
            Arc::new(InMemorySessionStore::new()),
            classifier,
        )))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn engine(&self) -> Arc<ScreeningEngine> {
        Arc::clone(&self.engine)
    }

    pub fn cache(&self) -> Option<Arc<RedisCache>> {
        self.cache.clone()
    }
}
