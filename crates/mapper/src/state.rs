//! Transient state used by the mapper.
//!
//! This is initialized on startup.

use thiserror::Error;
use tracing::{info_span, Instrument};

use query_engine_execution::metrics;
use query_engine_translation::translation::cache::ShapeCache;

/// State shared by every event mapped by this process.
#[derive(Debug, Clone)]
pub struct State {
    pub metrics: metrics::Metrics,
    pub shapes: ShapeCache,
}

/// Register the mapper's metrics and create an empty shape cache.
pub async fn create_state(
    metrics_registry: &mut prometheus::Registry,
) -> Result<State, InitializationError> {
    let metrics = async {
        let metrics_inner = metrics::Metrics::initialize(metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        Ok(metrics_inner)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    Ok(State {
        metrics,
        shapes: ShapeCache::new(),
    })
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
}
