//! Export run: fetch → filter → serialize → upload
//!
//! Steps run strictly in sequence and the first failure ends the run. Nothing is
//! written to the store unless every earlier step succeeded.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use super::records::{extract_records, to_csv};
use super::window::{DateWindow, FilterStrategy};
use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::orders::{Order, OrderSource};
use crate::storage::{ObjectStore, UploadTarget};

/// Progress of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Fetching,
    Filtering,
    Serializing,
    Uploading,
    Done,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Serializing => "serializing",
            Self::Uploading => "uploading",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub date: NaiveDate,
    pub bucket: String,
    pub key: String,
    /// Matching orders upstream, as reported by the source
    pub upstream_total: u64,
    /// Rows written to the CSV
    pub exported: usize,
}

/// Source of the current instant for [`ExportPipeline::run`]
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Serialized file ready for upload
struct PreparedExport {
    target: UploadTarget,
    body: String,
    rows: usize,
}

/// Daily order export
pub struct ExportPipeline {
    source: Arc<dyn OrderSource>,
    store: Arc<dyn ObjectStore>,
    settings: ExportConfig,
    page_limit: Option<u32>,
    clock: Clock,
}

impl ExportPipeline {
    pub fn new(
        source: Arc<dyn OrderSource>,
        store: Arc<dyn ObjectStore>,
        settings: ExportConfig,
        page_limit: Option<u32>,
    ) -> Self {
        Self {
            source,
            store,
            settings,
            page_limit,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used to pick the reporting day
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn strategy(&self) -> FilterStrategy {
        self.settings.strategy
    }

    /// Export today's orders
    pub async fn run(&self) -> ExportResult<ExportReport> {
        self.run_at((self.clock)()).await
    }

    /// Export the orders of the reporting day containing `now`
    pub async fn run_at(&self, now: DateTime<Utc>) -> ExportResult<ExportReport> {
        let strategy = self.settings.strategy;
        let window = strategy.window(now);
        debug!(stage = %ExportStage::Idle, %strategy, date = %window.date, "Starting order export");

        let (upstream_total, orders) = self.fetch(&window).await?;
        let selected = self.filter(&window, orders);
        let PreparedExport { target, body, rows } = self.serialize(&window, &selected)?;
        self.upload(&target, body.into_bytes()).await?;

        debug!(stage = %ExportStage::Done, key = %target.key, "Order export finished");
        Ok(ExportReport {
            date: window.date,
            bucket: target.bucket,
            key: target.key,
            upstream_total,
            exported: rows,
        })
    }

    async fn fetch(&self, window: &DateWindow) -> ExportResult<(u64, Vec<Order>)> {
        debug!(stage = %ExportStage::Fetching, "Querying order source");
        let query = self.settings.strategy.query(window, self.page_limit);
        let page = self.source.fetch_orders(&query).await?;

        info!("There are {} orders!", page.total);
        Ok((page.total, page.results))
    }

    fn filter(&self, window: &DateWindow, orders: Vec<Order>) -> Vec<Order> {
        let strategy = self.settings.strategy;
        if strategy.filters_locally() {
            debug!(stage = %ExportStage::Filtering, fetched = orders.len(), "Selecting reporting day");
        }

        let selected = strategy.select(window, orders);
        info!(
            "Count of orders for the current day: {}",
            selected.len()
        );
        selected
    }

    fn serialize(&self, window: &DateWindow, orders: &[Order]) -> ExportResult<PreparedExport> {
        debug!(stage = %ExportStage::Serializing, rows = orders.len(), "Building CSV");
        let records = extract_records(orders);
        let body = to_csv(&records)?;
        let target = UploadTarget::daily_csv(
            &self.settings.bucket,
            &self.settings.prefix,
            window.date,
            &self.settings.file_suffix,
        );

        Ok(PreparedExport {
            target,
            body,
            rows: records.len(),
        })
    }

    async fn upload(&self, target: &UploadTarget, body: Vec<u8>) -> ExportResult<()> {
        debug!(stage = %ExportStage::Uploading, key = %target.key, bytes = body.len(), "Uploading CSV");
        self.store.put_object(target, body).await?;

        info!(
            bucket = %target.bucket,
            key = %target.key,
            "Order IDs have been uploaded"
        );
        Ok(())
    }
}
