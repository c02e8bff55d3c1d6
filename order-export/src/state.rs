//! Application state for order-export

use std::sync::Arc;

use crate::config::Config;
use crate::export::ExportPipeline;
use crate::orders::{HttpOrderSource, OrderSource};
use crate::storage::{ObjectStore, S3ObjectStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
///
/// Built once at start-up; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExportPipeline>,
}

impl AppState {
    /// Wire the pipeline to the given source and store
    pub fn with_components(
        config: &Config,
        source: Arc<dyn OrderSource>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self::from_pipeline(ExportPipeline::new(
            source,
            store,
            config.export.clone(),
            config.orders.page_limit,
        ))
    }

    /// Serve an already configured pipeline
    pub fn from_pipeline(pipeline: ExportPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Create the production state: HTTP order API and S3
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let source = HttpOrderSource::new(&config.orders)?;
        tracing::info!(url = %source.orders_url(), "Order source ready");

        let store = S3ObjectStore::from_config(&config.store).await;
        tracing::info!(region = %config.store.region, "S3 client ready");

        Ok(Self::with_components(
            config,
            Arc::new(source),
            Arc::new(store),
        ))
    }
}
